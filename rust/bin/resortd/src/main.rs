//! `resortd`: the resort front-desk server.
//!
//! Usage:
//!   resortd -c <context-name-or-path> [--listen <addr>] [--db <file>] [--ephemeral] [serve|scan]
//!
//! The context name resolves to `/etc/resort/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth;
mod bootstrap;
mod config;
mod login;
mod routes;
mod scan;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use frontdesk::service::{FrontDeskConfig, FrontDeskService};
use frontdesk::FrontDeskModule;
use resort_core::{Module, ServiceConfig};
use tracing::info;

use auth::JwtAuthenticator;
use config::ServerConfig;
use routes::AppState;

/// Resort front-desk server.
#[derive(Parser, Debug)]
#[command(name = "resortd", about = "Resort front-desk server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// redb file to open instead of `{data_dir}/frontdesk.redb`.
    #[arg(long = "db")]
    db: Option<PathBuf>,

    /// Keep all data in memory; nothing is written to disk.
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Verify QR payloads read from stdin, one per line.
    Scan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let core_config = ServiceConfig {
        data_dir: Some(PathBuf::from(&server_config.storage.data_dir)),
        db_path: cli.db.clone(),
        listen: cli.listen.clone(),
    };
    let kv = open_store(&core_config, cli.ephemeral)?;

    let service = Arc::new(FrontDeskService::new(
        kv,
        FrontDeskConfig {
            retry: server_config.checkin.retry_policy(),
            ..Default::default()
        },
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Scan => {
            scan::run(service.verifier(), tokio::io::stdin()).await?;
        }
        Command::Serve => {
            bootstrap::ensure_root_admin(&service, &server_config)?;

            let jwt = Arc::new(JwtAuthenticator::new(
                &server_config.jwt.secret,
                server_config.jwt.expire_secs,
            ));
            let frontdesk = FrontDeskModule::new(service.clone(), jwt.clone());
            info!("{} module initialized", frontdesk.name());

            let app = routes::build_router(
                AppState { service, jwt },
                vec![(frontdesk.name(), frontdesk.routes())],
            );

            let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
            info!("resortd listening on {}", core_config.listen);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn open_store(config: &ServiceConfig, ephemeral: bool) -> anyhow::Result<Arc<dyn resort_kv::KVStore>> {
    if ephemeral {
        info!("Using in-memory storage (--ephemeral)");
        return Ok(Arc::new(resort_kv::MemoryStore::new()));
    }
    if let Some(dir) = &config.data_dir {
        std::fs::create_dir_all(dir)?;
    }
    let path = config.resolve_db_path();
    info!("Opening {}", path.display());
    let store = resort_kv::RedbStore::open(&path)
        .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_flag_overrides_the_data_dir_file() {
        let cli = Cli::parse_from(["resortd", "-c", "./dev.toml", "--db", "/tmp/desk.redb", "scan"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/desk.redb")));
        assert!(matches!(cli.command, Some(Command::Scan)));

        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/var/lib/resort")),
            db_path: cli.db,
            listen: cli.listen,
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/tmp/desk.redb"));
    }
}
