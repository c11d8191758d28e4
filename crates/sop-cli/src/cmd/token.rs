use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use sop_core::token::TokenRegistry;
use sop_core::types::TokenScope;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum TokenSubcommand {
    /// Mint an API token (the plaintext is shown once)
    Create {
        name: String,
        #[arg(long)]
        owner: String,
        /// Scopes (repeatable): issues:read, issues:write
        #[arg(long)]
        scope: Vec<String>,
    },
    /// List tokens (prefixes only)
    List,
    /// Revoke a token
    Revoke { id: String },
}

pub fn run(root: &Path, subcmd: TokenSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TokenSubcommand::Create { name, owner, scope } => create(root, &name, &owner, scope, json),
        TokenSubcommand::List => list(root, json),
        TokenSubcommand::Revoke { id } => revoke(root, &id),
    }
}

fn create(
    root: &Path,
    name: &str,
    owner: &str,
    scopes: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let scopes: Vec<TokenScope> = scopes
        .iter()
        .map(|s| TokenScope::from_str(s))
        .collect::<Result<_, _>>()?;
    if scopes.is_empty() {
        anyhow::bail!("at least one --scope is required (issues:read, issues:write)");
    }

    let mut registry = TokenRegistry::load(root)?;
    let (token, plaintext) = registry
        .create(root, name, owner, scopes)
        .context("failed to mint token")?;

    if json {
        print_json(&serde_json::json!({
            "id": token.id,
            "name": token.name,
            "owner": token.owner,
            "prefix": token.prefix,
            "token": plaintext,
        }))?;
    } else {
        println!("Token created for {owner}: {plaintext}");
        println!("Store it now; it is not recoverable.");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let registry = TokenRegistry::load(root)?;

    if json {
        let list: Vec<_> = registry
            .tokens
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "owner": t.owner,
                    "prefix": t.prefix,
                    "scopes": t.scopes,
                    "revoked": t.revoked,
                })
            })
            .collect();
        print_json(&list)?;
        return Ok(());
    }

    if registry.tokens.is_empty() {
        println!("No tokens.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = registry
        .tokens
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.name.clone(),
                t.owner.clone(),
                format!("{}…", t.prefix),
                t.scopes
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
                if t.revoked { "revoked" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "OWNER", "TOKEN", "SCOPES", "STATUS"], rows);
    Ok(())
}

fn revoke(root: &Path, id: &str) -> anyhow::Result<()> {
    let mut registry = TokenRegistry::load(root)?;
    registry
        .revoke(root, id)
        .with_context(|| format!("token '{id}' not found"))?;
    println!("Revoked token {id}");
    Ok(())
}
