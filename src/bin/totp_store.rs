// src/bin/totp_store.rs
//! totp-store: manage the token store from a terminal
//!
//! list [--tsv] | add <name> [--algo A] [--digits N] [--duration S] [--hotp] [--base64]
//! delete <#> | move <#from> <#to> | export <path>
//! Indexes are 1-based, as printed by `list`.

use std::io::Write;

use anyhow::{bail, Context, Result};
use rpassword::read_password;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use totp_token_store::config::Config;
use totp_token_store::{
    export_to_json, list_tokens, ConfigStore, CryptoProvider, CryptoSettings, MutationResult,
    OutputStyle, SecretEncoding, TokenDigits, TokenIterator, TokenType,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!("usage: totp-store <list|add|delete|move|export> [args]");
    };

    let config = totp_token_store::load_config().context("Failed to load configuration")?;
    let keyring = config.keyring().context("Failed to prepare key slots")?;
    let mut iter = open_iterator(&config, &keyring)?;

    match command.as_str() {
        "list" => {
            let style = if rest.iter().any(|a| a == "--tsv") {
                OutputStyle::Tsv
            } else {
                OutputStyle::Table
            };
            list_tokens(&mut iter, style, &mut std::io::stdout().lock())?;
        }
        "add" => add(&mut iter, rest)?,
        "delete" => delete(&mut iter, rest)?,
        "move" => {
            let from = parse_position(rest.first(), "from")?;
            let to = parse_position(rest.get(1), "to")?;
            if !iter.go_to(from) {
                bail!("no token #{}", from + 1);
            }
            iter.move_current_token_info(to)
                .context("Failed to move token")?;
            info!("moved #{} → #{}", from + 1, to + 1);
        }
        "export" => {
            let path = rest.first().context("usage: export <path>")?;
            let tokens = export_to_json(&mut iter, path, config.features.allow_plaintext_export)
                .context("Export failed")?;
            println!("Exported {} token(s) → {path}", tokens.len());
            println!("SECURITY: This file holds every secret in plaintext. Protect it now!");
        }
        other => bail!("unknown command '{other}'"),
    }

    iter.free();
    Ok(())
}

fn open_iterator<'p>(config: &Config, provider: &'p dyn CryptoProvider) -> Result<TokenIterator<'p>> {
    let path = &config.paths.token_file;
    let store = if path.exists() {
        ConfigStore::open_existing(path)
            .with_context(|| format!("Failed to open token store {}", path.display()))?
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let settings = CryptoSettings::generate(config.crypto.key_slot)?;
        info!(path = %path.display(), "creating new token store");
        ConfigStore::create_new(path, provider, &settings)?
    };

    let settings = store
        .header()
        .crypto_settings()
        .context("Token store header lacks crypto settings")?;
    TokenIterator::new(store, provider, settings).context("Failed to unlock token store")
}

fn add(iter: &mut TokenIterator<'_>, rest: &[String]) -> Result<()> {
    let name = rest.first().context("usage: add <name> [options]")?;
    let encoding = if rest.iter().any(|a| a == "--base64") {
        SecretEncoding::Base64
    } else {
        SecretEncoding::Base32
    };

    print!("Enter token secret (empty to cancel): ");
    std::io::stdout().flush()?;
    let secret = read_password()?;

    let verdict = iter.add_new_token(|draft| {
        if secret.trim().is_empty() {
            return MutationResult::Cancelled;
        }
        if draft.set_name(name).is_err() {
            return MutationResult::InvalidArguments;
        }
        if apply_options(draft, &rest[1..]).is_err() {
            return MutationResult::InvalidArguments;
        }
        match draft.set_secret(&secret, encoding) {
            Ok(()) => MutationResult::Success,
            Err(_) => MutationResult::InvalidSecret,
        }
    })?;

    match verdict {
        MutationResult::Success => println!("Token \"{name}\" added as #{}", iter.total_count()),
        MutationResult::Cancelled => println!("Cancelled"),
        MutationResult::InvalidArguments => bail!("invalid token options"),
        MutationResult::InvalidSecret => bail!("secret is not valid {encoding:?}"),
    }
    Ok(())
}

fn apply_options(record: &mut totp_token_store::TokenRecord, options: &[String]) -> Result<()> {
    let mut options = options.iter();
    while let Some(option) = options.next() {
        match option.as_str() {
            "--algo" => record.algo = options.next().context("--algo needs a value")?.parse()?,
            "--digits" => {
                record.digits = options.next().context("--digits needs a value")?.parse::<TokenDigits>()?
            }
            "--duration" => {
                let duration: u32 = options.next().context("--duration needs a value")?.parse()?;
                record.kind = totp_token_store::TokenKind::Totp { duration };
            }
            "--hotp" => record.set_type(TokenType::Hotp),
            "--base64" => {}
            other => bail!("unknown option '{other}'"),
        }
    }
    Ok(())
}

fn delete(iter: &mut TokenIterator<'_>, rest: &[String]) -> Result<()> {
    let index = parse_position(rest.first(), "index")?;
    if index >= iter.total_count() {
        bail!("no token #{}", index + 1);
    }
    let mut label = String::new();
    let removed = iter
        .remove_token_at(index, |record| {
            label = match record {
                Some(record) => format!("\"{}\"", record.name),
                None => format!("unreadable token #{}", index + 1),
            };
            confirm(&format!("Delete {label}? [y/N] "))
        })
        .context("Failed to delete token")?;

    if removed {
        println!("Token {label} deleted");
    } else {
        println!("  → kept");
    }
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let mut input = String::new();
    let answered = std::io::stdout()
        .flush()
        .and_then(|()| std::io::stdin().read_line(&mut input));
    if let Err(err) = answered {
        warn!(%err, "could not read confirmation");
        return false;
    }
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn parse_position(arg: Option<&String>, what: &str) -> Result<usize> {
    let position: usize = arg
        .with_context(|| format!("missing {what}"))?
        .parse()
        .with_context(|| format!("{what} must be a number"))?;
    if position == 0 {
        bail!("{what} starts at 1");
    }
    Ok(position - 1)
}
