//! ticketsync - a headless watcher for the subject and ticket sheets.
//!
//! Activates the sync engine against a view URL, prints a line for every
//! state change and tears the engine down on Ctrl-C.

use std::io;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticketsync_core::{
    Config, EngineOptions, FileCacheStore, Navigator, SheetClient, SnapshotCache, SyncEngine,
    SyncSnapshot, ViewLocation,
};

const USAGE: &str = "Usage: ticketsync [--clear-cache] [--once] <view-url>

  <view-url>      URL or path of the view, e.g. \"/dashboard?id=u1&ticketId=t9\"
  --clear-cache   Remove all cached state before starting
  --once          Exit after the first settled refresh";

/// Directory for the optional rolling log file
const ENV_LOG_DIR: &str = "TICKETSYNC_LOG_DIR";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    clear_cache: bool,
    once: bool,
    location: String,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut clear_cache = false;
    let mut once = false;
    let mut location = None;

    for arg in args {
        if arg == "--clear-cache" {
            clear_cache = true;
        } else if arg == "--once" {
            once = true;
        } else if arg.starts_with("--") {
            bail!("Unknown option: {}", arg);
        } else if location.is_some() {
            bail!("Unexpected argument: {}", arg);
        } else {
            location = Some(arg);
        }
    }

    let Some(location) = location else {
        bail!("Missing view URL");
    };

    Ok(Args {
        clear_cache,
        once,
        location,
    })
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g., RUST_LOG=debug). When
/// TICKETSYNC_LOG_DIR is set, logs are also written to a daily file there.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ticketsync=info,ticketsync_core=info"));

    let (file_layer, guard) = match std::env::var(ENV_LOG_DIR) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ticketsync.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// There is no view to move in a terminal; redirects are reported instead.
struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, target: &str) {
        warn!(fallback = target, "No subject could be resolved, view redirected");
        println!("redirect -> {}", target);
    }
}

fn summary(snapshot: &SyncSnapshot) -> String {
    let subject = snapshot
        .subject
        .as_ref()
        .map(|s| format!("{} ({})", s.display_name(), s.subject_id))
        .unwrap_or_else(|| "-".to_string());
    let ticket = snapshot
        .ticket
        .as_ref()
        .map(|t| {
            let deleted = if t.is_deleted() { " deleted" } else { "" };
            format!("{} [{}]{}", t.ticket_id, t.event_name, deleted)
        })
        .unwrap_or_else(|| "-".to_string());
    let deleted = snapshot.tickets.iter().filter(|t| t.is_deleted()).count();
    let tickets = if deleted > 0 {
        format!("{} tickets ({} deleted)", snapshot.tickets.len(), deleted)
    } else {
        format!("{} tickets", snapshot.tickets.len())
    };

    format!(
        "subject: {} | ticket: {} | {} subjects, {} | {}{}",
        subject,
        ticket,
        snapshot.subjects.len(),
        tickets,
        snapshot.age_display(),
        if snapshot.loading { " | loading" } else { "" }
    )
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            let mut config = Config::default();
            config.apply_overrides(|name| std::env::var(name).ok());
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let _log_guard = init_tracing();
    info!("ticketsync starting");

    let config = load_config();
    let location = ViewLocation::parse(&args.location)?;

    let cache = Arc::new(FileCacheStore::new(config.cache_dir()?)?);
    if args.clear_cache {
        SnapshotCache::new(cache.clone()).clear();
        info!(dir = %cache.cache_dir().display(), "Cache cleared");
    }

    let fetcher = Arc::new(SheetClient::new(
        &config.subjects_url,
        &config.tickets_url,
        config.request_timeout(),
    )?);

    let mut handle = SyncEngine::spawn(
        EngineOptions::from(&config),
        fetcher,
        cache,
        Arc::new(LogNavigator),
        location,
    );

    let mut updates = handle.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Sync engine exited unexpectedly");
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}", summary(&snapshot));
                if args.once && !snapshot.loading {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown().await;
    info!("ticketsync shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketsync_core::{Subject, Ticket};

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(
            args(&["--once", "/dashboard?id=u1"]).unwrap(),
            Args {
                clear_cache: false,
                once: true,
                location: "/dashboard?id=u1".to_string()
            }
        );
        assert!(args(&["/a", "--clear-cache"]).unwrap().clear_cache);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["--verbose", "/a"]).is_err());
        assert!(args(&["/a", "/b"]).is_err());
    }

    #[test]
    fn test_summary() {
        let mut snapshot = SyncSnapshot::default();
        assert_eq!(
            summary(&snapshot),
            "subject: - | ticket: - | 0 subjects, 0 tickets | never | loading"
        );

        snapshot.loading = false;
        snapshot.subject = Some(Subject {
            subject_id: "u1".into(),
            full_name: "Ada".into(),
            ..Default::default()
        });
        snapshot.ticket = Some(Ticket {
            ticket_id: "t9".into(),
            event_name: "Gala".into(),
            ..Default::default()
        });
        assert_eq!(
            summary(&snapshot),
            "subject: Ada (u1) | ticket: t9 [Gala] | 0 subjects, 0 tickets | never"
        );

        let removed = Ticket {
            ticket_id: "t3".into(),
            deleted_stamp: "2024-05-01".into(),
            ..Default::default()
        };
        snapshot.ticket = Some(removed.clone());
        snapshot.tickets = vec![removed, Ticket::default()];
        assert_eq!(
            summary(&snapshot),
            "subject: Ada (u1) | ticket: t3 [] deleted | 0 subjects, 2 tickets (1 deleted) | never"
        );
    }
}
