//! Command parsing and execution.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use reqwest::Method;

use campsync_core::cache::{
    CacheManager, CacheStorage, FetchOutcome, FetchRequest, RequestMode, ResponseSource, ShellManifest,
};
use campsync_core::models::CampDocument;
use campsync_core::session::{platform_prefers_dark, ReloadGuard, ThemeState};
use campsync_core::signal::{ClientRegistry, VersionWatcher};
use campsync_core::store::{DocumentStore, LoadOutcome, SaveOutcome};
use campsync_core::utils::{format_bytes, truncate};
use campsync_core::{Config, DocumentClient};

/// Subdirectory of the cache dir holding shell generations
const SHELL_CACHE_DIR: &str = "shell";

/// Width of free-text columns in summaries
const TEXT_COLUMN_WIDTH: usize = 48;

pub const USAGE: &str = "\
Usage: campsync <command> [args]

Shell cache:
  install               Pre-cache the shell manifest under the current generation
  activate              Drop old generations and notify open pages
  update                install + activate
  fetch <path|url> [--navigate]
                        Answer a request the way the offline cache would
  status                List cached generations
  check-shell <dir>     Report manifest assets missing from a built public dir

Camp document:
  show                  Load and summarize the camp document
  export [dir]          Write camp-backup.json (default: current dir)
  import <file>         Restore a backup and save it to the server

Preferences:
  theme [toggle]        Show or toggle the light/dark theme";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Install,
    Activate,
    Update,
    Fetch { target: String, navigate: bool },
    Status,
    CheckShell { dir: PathBuf },
    Show,
    Export { dir: Option<PathBuf> },
    Import { file: PathBuf },
    Theme { toggle: bool },
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let rest = args.get(1..).unwrap_or(&[]);
        let command = match args.first().map(String::as_str) {
            None | Some("help") | Some("--help") | Some("-h") => Command::Help,
            Some("install") => Command::Install,
            Some("activate") => Command::Activate,
            Some("update") => Command::Update,
            Some("status") => Command::Status,
            Some("show") => Command::Show,
            Some("fetch") => {
                let navigate = rest.iter().any(|a| a == "--navigate");
                let target = rest
                    .iter()
                    .find(|a| !a.starts_with("--"))
                    .cloned()
                    .context("fetch needs a path or URL")?;
                Command::Fetch { target, navigate }
            }
            Some("check-shell") => Command::CheckShell {
                dir: rest.first().map(PathBuf::from).context("check-shell needs a directory")?,
            },
            Some("export") => Command::Export {
                dir: rest.first().map(PathBuf::from),
            },
            Some("import") => Command::Import {
                file: rest.first().map(PathBuf::from).context("import needs a backup file")?,
            },
            Some("theme") => match rest.first().map(String::as_str) {
                None => Command::Theme { toggle: false },
                Some("toggle") => Command::Theme { toggle: true },
                Some(other) => bail!("Unknown theme action: {}", other),
            },
            Some(other) => bail!("Unknown command: {}", other),
        };
        Ok(command)
    }
}

pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Install => {
            let manager = cache_manager(&config)?;
            manager.install().await?;
            println!("Installed {} ({} assets)", manager.generation(), manager.manifest().paths().len());
            Ok(())
        }
        Command::Activate => {
            let manager = cache_manager(&config)?;
            let report = manager.activate(&ClientRegistry::new()).await?;
            print_deleted(&report.deleted);
            println!("Activated {}", manager.generation());
            Ok(())
        }
        Command::Update => update(&config).await,
        Command::Fetch { target, navigate } => fetch(&config, &target, navigate).await,
        Command::Status => status(&config).await,
        Command::CheckShell { dir } => check_shell(&dir),
        Command::Show => show(&config).await,
        Command::Export { dir } => export(&config, dir).await,
        Command::Import { file } => import(&config, &file).await,
        Command::Theme { toggle } => theme(toggle),
    }
}

fn cache_manager(config: &Config) -> Result<CacheManager> {
    let root = config.cache_dir()?.join(SHELL_CACHE_DIR);
    let storage = CacheStorage::new(root)?;
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    let manager = CacheManager::new(
        storage,
        builder.build()?,
        &config.shell_origin(),
        config.cache_generation(),
        ShellManifest::default(),
    )?;
    Ok(manager)
}

fn document_store(config: &Config) -> Result<DocumentStore> {
    let client = DocumentClient::new(config.api_base(), config.request_timeout())?;
    Ok(DocumentStore::new(client))
}

fn print_deleted(deleted: &[String]) {
    for generation in deleted {
        println!("Deleted old generation {}", generation);
    }
}

async fn update(config: &Config) -> Result<()> {
    let manager = cache_manager(config)?;
    let previous = manager
        .generations()
        .await?
        .into_iter()
        .find(|g| g != manager.generation());

    // This session counts as a page opened under the previous shell
    let registry = ClientRegistry::new();
    let mut watcher = VersionWatcher::new(registry.connect(previous), ReloadGuard::new());

    let report = manager.update(&registry).await?;
    print_deleted(&report.deleted);
    println!("Updated to {} ({} page(s) notified)", manager.generation(), report.notified);
    if watcher.poll_reload().is_some() {
        println!("A new version is live; open pages will reload once.");
    }
    Ok(())
}

async fn fetch(config: &Config, target: &str, navigate: bool) -> Result<()> {
    let manager = cache_manager(config)?;
    let url = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("{}/{}", config.shell_origin().trim_end_matches('/'), target.trim_start_matches('/'))
    };
    let mode = if navigate {
        RequestMode::Navigate
    } else {
        RequestMode::Subresource
    };
    let request = FetchRequest::new(Method::GET, &url, mode)?;

    match manager.handle_fetch(&request).await? {
        FetchOutcome::Passthrough => println!("{} passes through (not handled by the shell cache)", url),
        FetchOutcome::Respond { response, source } => {
            let source = match source {
                ResponseSource::Network => "network",
                ResponseSource::Cache => "cache",
            };
            println!(
                "{} {} from {} ({}, fetched {})",
                response.status,
                response.key,
                source,
                format_bytes(response.body.len() as u64),
                response.age_display()
            );
        }
    }
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let manager = cache_manager(config)?;
    let status = manager.status().await?;
    if status.generations.is_empty() {
        println!("No cached shell. Run `campsync install`.");
        return Ok(());
    }
    for generation in &status.generations {
        let marker = if generation.current { "*" } else { " " };
        println!(
            "{} {:<24} {:>3} entries  {:>9}  updated {}",
            marker,
            generation.name,
            generation.entries.len(),
            format_bytes(generation.total_bytes()),
            generation.last_updated()
        );
    }
    Ok(())
}

fn check_shell(dir: &std::path::Path) -> Result<()> {
    let manifest = ShellManifest::default();
    let missing = manifest.missing_in(dir);
    if missing.is_empty() {
        println!("All {} shell assets present in {}", manifest.paths().len(), dir.display());
        return Ok(());
    }
    for path in &missing {
        println!("missing: {}", path);
    }
    bail!("{} shell asset(s) missing; they would never be available offline", missing.len())
}

async fn load_or_fail(store: &DocumentStore) -> Result<()> {
    if store.load().await == LoadOutcome::Failed {
        let reason = store
            .take_alert()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "Could not load the camp plan".to_string());
        bail!(reason);
    }
    Ok(())
}

async fn show(config: &Config) -> Result<()> {
    let store = document_store(config)?;
    load_or_fail(&store).await?;
    if let Some(summary) = store.with_document(summarize) {
        println!("{}", summary);
    }
    Ok(())
}

fn summarize(doc: &CampDocument) -> String {
    let mut lines = vec![
        doc.event.display_title().to_string(),
        format!("{} | {}", doc.event.location, doc.event.dates),
        String::new(),
        format!("Itinerary ({})", doc.timeline.itinerary.len()),
    ];
    for entry in &doc.timeline.itinerary {
        lines.push(format!("  - {}", truncate(entry.title(), TEXT_COLUMN_WIDTH)));
    }
    lines.push(format!("Travel ({})", doc.timeline.travel.len()));
    for travel in doc.timeline.sorted_travel() {
        lines.push(format!(
            "  - {:<16} {:<7} {}",
            travel.name,
            travel.mode.to_string(),
            truncate(&travel.details, TEXT_COLUMN_WIDTH)
        ));
    }
    lines.push(format!("Meals ({}), snacks ({})", doc.food.meals.len(), doc.food.snacks.len()));
    lines.push(format!("Booze ({})", doc.booze.len()));
    for item in &doc.booze {
        lines.push(format!(
            "  - {} {} x{} ({})",
            item.kind,
            item.label,
            item.quantity,
            item.assignee_display()
        ));
    }
    if let Some(prefs) = &doc.booze_preferences {
        lines.push(format!("Drink preferences ({})", prefs.len()));
    }
    lines.push(format!("Rules ({})", doc.rules.len()));
    for rule in &doc.rules {
        lines.push(format!("  - {}", truncate(&rule.text, TEXT_COLUMN_WIDTH)));
    }
    lines.join("\n")
}

async fn export(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let store = document_store(config)?;
    load_or_fail(&store).await?;
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = store.export_backup(&dir)?;
    println!("Backup written to {}", path.display());
    Ok(())
}

async fn import(config: &Config, file: &std::path::Path) -> Result<()> {
    let store = document_store(config)?;
    match store.import_backup(file).await? {
        SaveOutcome::Saved => {
            println!("Restored {} and saved it to the server", file.display());
            Ok(())
        }
        SaveOutcome::Failed => {
            let reason = store
                .take_alert()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "Could not save changes to the server".to_string());
            bail!(reason)
        }
        SaveOutcome::NothingToSave => bail!("Backup produced no document"),
    }
}

fn theme(toggle: bool) -> Result<()> {
    let mut state = ThemeState::load(Config::config_path()?, platform_prefers_dark())?;
    if toggle {
        state.toggle()?;
    }
    println!("Theme: {}", state.current());
    Ok(())
}
