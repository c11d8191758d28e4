use crate::output::print_json;
use clap::Subcommand;
use sop_core::pins::Pins;
use std::path::Path;

#[derive(Subcommand)]
pub enum PinSubcommand {
    /// Pin an object for a user
    Add {
        user: String,
        slug: String,
    },
    /// Unpin an object
    Remove {
        user: String,
        slug: String,
    },
    /// List a user's pinned objects
    List { user: String },
}

pub fn run(root: &Path, subcmd: PinSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PinSubcommand::Add { user, slug } => {
            let mut pins = Pins::load(root)?;
            pins.pin(&user, &slug);
            pins.save(root)?;
            println!("Pinned {slug} for {user}");
            Ok(())
        }
        PinSubcommand::Remove { user, slug } => {
            let mut pins = Pins::load(root)?;
            pins.unpin(&user, &slug);
            pins.save(root)?;
            println!("Unpinned {slug} for {user}");
            Ok(())
        }
        PinSubcommand::List { user } => {
            let pins = Pins::load(root)?;
            let list = pins.for_user(&user);
            if json {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No pins for {user}.");
            } else {
                for slug in list {
                    println!("{slug}");
                }
            }
            Ok(())
        }
    }
}
