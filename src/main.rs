//! estatedesk - an offline-first real-estate CRM core.
//!
//! Lead tracking, follow-up scheduling and project listings persisted as
//! local JSON collections, plus a versioned offline cache of static assets.
//! The CLI here is a thin driver; all semantics live in the store and cache
//! modules.

mod cache;
mod config;
mod export;
mod models;
mod store;
mod utils;

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cache::AssetCache;
use config::Config;
use store::{FileStorage, Store};
use utils::{dial_link, format_date, share_link, truncate};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() {
    eprintln!("usage: estatedesk <command>");
    eprintln!();
    eprintln!("  leads [filter]               list leads, newest first");
    eprintln!("  add-lead <name> <phone> [location]");
    eprintln!("  due [YYYY-MM-DD]             follow-ups due (default: today)");
    eprintln!("  followup <id> <note> <when>  log a follow-up against a lead");
    eprintln!("  delete-lead <id>             delete a lead (asks first)");
    eprintln!("  projects                     list project inventory");
    eprintln!("  profile [<field> <value>]    show or update the business profile");
    eprintln!("  links <id>                   print call/WhatsApp links for a lead");
    eprintln!("  export-csv <file>            write leads as CSV");
    eprintln!("  backup <file>                write a full JSON backup");
    eprintln!("  restore <file>               restore a JSON backup");
    eprintln!("  cache install|activate       manage the offline asset cache");
    eprintln!("  cache fetch <name>           serve one asset (cache-first)");
    eprintln!("  config [<key> <value>]       show or set asset-base / cache-generation");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::load().context("Failed to load config")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        usage();
        return Ok(());
    };

    // Cache and config commands do not need the data store
    if command == "cache" {
        return run_cache(&config, &args[1..]).await;
    }
    if command == "config" {
        return run_config(config, &args[1..]);
    }

    let data_dir = config.data_dir()?;
    let storage = FileStorage::new(data_dir).context("Failed to open data directory")?;
    let mut store = Store::open(storage);
    info!(
        leads = store.leads().len(),
        projects = store.projects().len(),
        "store loaded"
    );

    match (command, &args[1..]) {
        ("leads", rest) => {
            let filter = rest.first().map(String::as_str).unwrap_or("");
            for lead in store.list_leads(filter) {
                println!(
                    "{:>15}  {:<20} {:<14} {:<12} {}",
                    lead.id,
                    truncate(&lead.name, 20),
                    lead.phone,
                    lead.next_follow.as_deref().unwrap_or("-"),
                    lead.location.as_deref().unwrap_or("")
                );
            }
        }
        ("add-lead", [name, phone, rest @ ..]) => {
            let lead = models::Lead {
                name: name.clone(),
                phone: phone.clone(),
                location: rest.first().cloned(),
                ..Default::default()
            };
            let id = store.upsert_lead(lead)?;
            println!("Added lead {}", id);
        }
        ("due", rest) => {
            let today = Utc::now().format("%Y-%m-%d").to_string();
            let as_of = rest.first().map(String::as_str).unwrap_or(&today);
            for lead in store.followups_due(as_of) {
                println!(
                    "{:<12} {:<20} {}",
                    lead.next_follow.as_deref().unwrap_or(""),
                    truncate(&lead.name, 20),
                    lead.phone
                );
            }
        }
        ("followup", [id, note, when]) => {
            let id: i64 = id.parse().context("lead id must be a number")?;
            store.append_followup(id, note, when)?;
            println!("Follow-up logged; next action {}", when);
        }
        ("delete-lead", [id]) => {
            let id: i64 = id.parse().context("lead id must be a number")?;
            if confirm("Delete this lead?")? {
                if store.delete_lead(id)? {
                    println!("Deleted.");
                } else {
                    println!("No lead with id {}", id);
                }
            }
        }
        ("projects", _) => {
            for project in store.projects() {
                println!(
                    "{:>15}  {:<24} {:<18} {}",
                    project.id,
                    truncate(&project.name, 24),
                    truncate(&project.location, 18),
                    project.configuration.as_deref().unwrap_or("")
                );
            }
        }
        ("profile", []) => {
            let p = store.profile();
            println!("business: {}", p.business_name);
            println!("owner:    {} ({})", p.owner_name, p.owner_phone);
            println!("theme:    {} / {}", p.mode, p.accent);
        }
        ("profile", [key, value]) => {
            let mut patch = models::ProfilePatch::default();
            match key.as_str() {
                "business" => patch.business_name = Some(value.clone()),
                "owner" => patch.owner_name = Some(value.clone()),
                "phone" => patch.owner_phone = Some(value.clone()),
                "accent" => patch.accent = Some(value.clone()),
                "mode" => patch.mode = Some(value.clone()),
                _ => anyhow::bail!("unknown profile field: {}", key),
            }
            store.save_profile(patch)?;
            println!("Saved.");
        }
        ("links", [id]) => {
            let id: i64 = id.parse().context("lead id must be a number")?;
            let lead = store
                .list_leads("")
                .find(|l| l.id == id)
                .with_context(|| format!("no lead with id {}", id))?;
            let message = format!(
                "Hello {}, following up on your {} enquiry.",
                lead.name,
                lead.requirement.as_deref().unwrap_or("property")
            );
            println!("call:     {}", dial_link(&lead.phone));
            println!("whatsapp: {}", share_link(&lead.phone, Some(&message)));
            println!("created:  {}", format_date(&lead.created_at));
        }
        ("export-csv", [file]) => {
            let csv = export::leads_to_csv(store.leads());
            std::fs::write(file, csv).with_context(|| format!("Failed to write {}", file))?;
            println!("Exported {} leads to {}", store.leads().len(), file);
        }
        ("backup", [file]) => {
            let doc = export::export_backup(&store)?;
            std::fs::write(file, doc).with_context(|| format!("Failed to write {}", file))?;
            println!("Backup written to {}", file);
        }
        ("restore", [file]) => {
            let doc =
                std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
            export::import_backup(&mut store, &doc)?;
            println!(
                "Restored {} leads, {} projects",
                store.leads().len(),
                store.projects().len()
            );
        }
        _ => usage(),
    }

    Ok(())
}

async fn run_cache(config: &Config, args: &[String]) -> Result<()> {
    let cache = AssetCache::new(
        config.cache_dir()?,
        config.generation(),
        config.asset_manifest()?,
    );
    match args.first().map(String::as_str) {
        Some("install") => {
            let reseed = cache.installed();
            cache.install().await?;
            println!(
                "{} cache generation {}",
                if reseed { "Reseeded" } else { "Installed" },
                cache.generation()
            );
        }
        Some("activate") => {
            let removed = cache.activate()?;
            println!(
                "Active generation {}; removed {:?}",
                cache.generation(),
                removed
            );
        }
        Some("fetch") => {
            let name = args.get(1).context("usage: cache fetch <name>")?;
            let bytes = cache.fetch(name).await?;
            io::stdout().write_all(&bytes)?;
        }
        _ => usage(),
    }
    Ok(())
}

fn run_config(mut config: Config, args: &[String]) -> Result<()> {
    match args {
        [] => {
            println!(
                "asset_base:       {}",
                config.asset_base.as_deref().unwrap_or("-")
            );
            println!("cache_generation: {}", config.generation());
        }
        [key, value] => {
            match key.as_str() {
                "asset-base" => config.asset_base = Some(value.clone()),
                "cache-generation" => config.cache_generation = Some(value.clone()),
                _ => anyhow::bail!("unknown config key: {}", key),
            }
            config.save()?;
            println!("Saved.");
        }
        _ => usage(),
    }
    Ok(())
}

/// Blocking y/N prompt. The store's delete operation itself never prompts;
/// confirmation belongs to this layer.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
