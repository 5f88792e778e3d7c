//! Studio Panel: Football Studio betting dashboard.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the saved session (or starts fresh) and serves the dashboard
//! until Ctrl+C, saving the session on the way out.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use studio_panel::config;
use studio_panel::dashboard::{self, routes::DashboardState};
use studio_panel::engine::session::SessionController;
use studio_panel::storage;

const BANNER: &str = r#"
 ___ _____ _   _ ___ ___ ___    ___  _   _  _ ___ _
/ __|_   _| | | |   \_ _/ _ \  | _ \/_\ | \| | __| |
\__ \ | | | |_| | |) | | (_) | |  _/ _ \| .` | _|| |__
|___/ |_|  \___/|___/___\___/  |_|/_/ \_\_|\_|___|____|

  Pattern signals, flat staking and goal / stop-loss gating
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("STUDIO_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load_or_default(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        mode = %cfg.classifier.mode,
        default_odds = %cfg.session.default_odds,
        history_window = cfg.session.history_window,
        currency = %cfg.session.currency,
        "Studio Panel starting up"
    );

    // -- Restore or create the session -----------------------------------

    let state_file = cfg.storage.state_file.clone();
    let controller = match state_file.as_deref() {
        Some(path) => match storage::load_session(Some(path)) {
            Ok(Some(session)) => {
                info!(
                    id = %session.id,
                    rounds = session.history.len(),
                    period = %session.period,
                    "Resumed saved session"
                );
                SessionController::with_session(&cfg, session)
            }
            Ok(None) => SessionController::new(&cfg),
            Err(e) => {
                warn!(error = %e, path, "Saved session unreadable, starting fresh");
                SessionController::new(&cfg)
            }
        },
        None => {
            info!("No state file configured, session is in-memory only");
            SessionController::new(&cfg)
        }
    };

    let state = Arc::new(DashboardState::new(controller, state_file.clone()));

    // -- Serve -----------------------------------------------------------

    if cfg.dashboard.enabled {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
            info!("Shutdown signal received.");
        };
        dashboard::serve_dashboard(state.clone(), cfg.dashboard.port, shutdown).await?;
    } else {
        warn!("Dashboard disabled in config; nothing to serve. Press Ctrl+C to exit.");
        tokio::signal::ctrl_c().await?;
    }

    // Save final state
    let ctl = state.session.read().await;
    if let Some(path) = state_file.as_deref() {
        storage::save_session(ctl.session(), Some(path))?;
    }
    let snapshot = ctl.snapshot();
    info!(
        rounds = snapshot.history.len(),
        period = %snapshot.period,
        balance = ?snapshot.ledger.as_ref().map(|l| l.balance),
        "Studio Panel shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studio_panel=info"));

    let json_logging = std::env::var("STUDIO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
