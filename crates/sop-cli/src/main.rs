mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    issue::IssueSubcommand, meeting::MeetingSubcommand, object::ObjectSubcommand,
    pin::PinSubcommand, recur::RecurSubcommand, token::TokenSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sop",
    about = "S&OP migration tracker — objects, issues, meetings, and schedules",
    version,
    propagate_version = true
)]
struct Cli {
    /// Tracker root (default: auto-detect from .sop/ or .git/)
    #[arg(long, global = true, env = "SOP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the tracker in the current project
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        project: Option<String>,
    },

    /// Manage migration objects
    Object {
        #[command(subcommand)]
        subcommand: ObjectSubcommand,
    },

    /// Manage issues
    Issue {
        #[command(subcommand)]
        subcommand: IssueSubcommand,
    },

    /// Manage meetings and minutes
    Meeting {
        #[command(subcommand)]
        subcommand: MeetingSubcommand,
    },

    /// Manage recurring meeting schedules
    Recur {
        #[command(subcommand)]
        subcommand: RecurSubcommand,
    },

    /// Export the status-report workbook
    Report {
        /// Output path (default: sop-status.xlsx)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage API tokens for the /v1 facade
    Token {
        #[command(subcommand)]
        subcommand: TokenSubcommand,
    },

    /// Manage per-user pinned objects
    Pin {
        #[command(subcommand)]
        subcommand: PinSubcommand,
    },

    /// Start the API server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { project } => cmd::init::run(&root, project.as_deref()),
        Commands::Object { subcommand } => cmd::object::run(&root, subcommand, cli.json),
        Commands::Issue { subcommand } => cmd::issue::run(&root, subcommand, cli.json),
        Commands::Meeting { subcommand } => cmd::meeting::run(&root, subcommand, cli.json),
        Commands::Recur { subcommand } => cmd::recur::run(&root, subcommand, cli.json),
        Commands::Report { out } => cmd::report::run(&root, out),
        Commands::Token { subcommand } => cmd::token::run(&root, subcommand, cli.json),
        Commands::Pin { subcommand } => cmd::pin::run(&root, subcommand, cli.json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
