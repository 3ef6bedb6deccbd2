mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod report;

use chrono::{Duration, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::HttpFieldSources;
use db::Database;
use error::{Result, SigirError};
use logic::{DataSyncService, IrrigationEngine};
use models::{FieldDataSnapshot, IrrigationEvent, SourceOutcome};
use report::TextReport;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Erreur: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Init) => {
            let config = Config::setup_interactive(cli.config.clone())?;
            println!("Parcelle: {} ({})", config.field.name, config.field.id);
            Ok(())
        }
        Some(Commands::Check) => check(&load_config(&cli)?).await,
        Some(Commands::Irrigate {
            amount,
            date,
            source,
            ref notes,
        }) => {
            let config = load_config(&cli)?;
            let db = open_journal(&cli)?;
            let day = date.unwrap_or_else(|| Utc::now().date_naive());
            let mut event =
                IrrigationEvent::new(config.field.id.clone(), day, amount).with_source(source);
            if let Some(notes) = notes {
                event = event.with_notes(notes.clone());
            }
            let id = db.insert_irrigation_event(&event)?;
            println!(
                "Irrigation #{} enregistrée: {:.1} mm le {} ({})",
                id, amount, day, config.field.name
            );
            Ok(())
        }
        Some(Commands::Journal { since, delete }) => {
            let config = load_config(&cli)?;
            let db = open_journal(&cli)?;
            if let Some(id) = delete {
                let event = db
                    .get_irrigation_event(id)?
                    .filter(|e| e.field_id == config.field.id)
                    .ok_or_else(|| {
                        SigirError::NotFound(format!(
                            "irrigation event {} for field {}",
                            id, config.field.id
                        ))
                    })?;
                db.delete_irrigation_event(id)?;
                println!(
                    "Irrigation #{} supprimée ({:.1} mm le {})",
                    id, event.amount_mm, event.event_date
                );
                return Ok(());
            }
            let events = db.list_irrigation_events(&config.field.id, since)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("Aucune irrigation enregistrée");
            } else {
                for e in &events {
                    println!(
                        "#{:<4} {}  {:>6.1} mm  {:<6} {}",
                        e.id.unwrap_or_default(),
                        e.event_date,
                        e.amount_mm,
                        e.source,
                        e.notes.as_deref().unwrap_or("")
                    );
                }
            }
            Ok(())
        }
        None => evaluate(&cli).await,
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    // stderr keeps --json output clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    if !Config::exists(cli.config.as_ref()) {
        eprintln!("Aucune configuration trouvée. Lancez `sigir init` pour la créer.");
    }
    Config::load(cli.config.clone())
}

fn open_journal(cli: &Cli) -> Result<Database> {
    Database::open(&Config::db_path(cli.data_dir.as_ref())?)
}

async fn evaluate(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let db = open_journal(cli)?;
    let engine = IrrigationEngine::new(config.engine.clone());
    let sync = DataSyncService::new(HttpFieldSources::from_config(&config), &config.sync);

    // Nothing else refreshes concurrently here, so the commit always succeeds
    let snapshot = sync
        .refresh(&config.field)
        .await
        .unwrap_or_else(|| FieldDataSnapshot::empty(config.field.id.clone(), 0));

    let now = Utc::now();
    let since = now.date_naive() - Duration::days(config.engine.balance_window_days as i64);
    let events = db.list_irrigation_events(&config.field.id, Some(since))?;

    let report = engine.evaluate(&snapshot, &config.field, &events, now);
    if cli.json {
        println!("{}", report::render_json(&report)?);
    } else {
        print!("{}", TextReport::new(&report, &config.field).render());
        if let Some(last) = db.last_irrigation_event(&config.field.id)? {
            println!(
                "Dernière irrigation: {} ({:.1} mm, {})",
                last.event_date, last.amount_mm, last.source
            );
        }
    }
    Ok(())
}

async fn check(config: &Config) -> Result<()> {
    println!("Configuration OK");
    println!("  Parcelle: {} ({})", config.field.name, config.field.id);
    println!("  Backend: {} (parcelle {})", config.backend.url, config.backend_field_id());
    match &config.open_meteo {
        Some(om) if om.enabled => println!("  Open-Meteo: {}", om.url),
        _ => println!("  Open-Meteo: désactivé"),
    }
    if config.field.planting_date.is_none() {
        println!("  ! Date de semis absente: pas de phénologie");
    }
    if config.field.latitude.is_none() {
        println!("  ! Latitude absente: ET0 du fournisseur uniquement");
    }

    let sources = HttpFieldSources::from_config(config);
    match sources.backend().test_connection().await {
        Ok(true) => println!("  Backend joignable"),
        Ok(false) => println!("  Backend répond en erreur"),
        Err(e) => println!("  Backend injoignable: {}", e),
    }

    let sync = DataSyncService::new(sources, &config.sync);
    let generation = sync.begin_refresh();
    let snapshot = sync.fetch(&config.field, generation).await;
    println!();
    for report in &snapshot.sources {
        let status = match &report.outcome {
            SourceOutcome::Loaded => "OK".to_string(),
            SourceOutcome::Failed(msg) => format!("ÉCHEC ({})", msg),
            SourceOutcome::TimedOut => "DÉLAI DÉPASSÉ".to_string(),
            SourceOutcome::NotConfigured => "non configuré".to_string(),
        };
        println!("  {:<22} {}", report.source.as_str(), status);
    }
    let failed = snapshot.failed_sources().len();
    if failed > 0 {
        println!();
        println!("  {} source(s) indisponible(s) sur {}", failed, snapshot.sources.len());
    }
    Ok(())
}
