use clap::Parser;
use duo_ledger::adapters::{PostgresLedgerStore, PostgresUserStore};
use duo_ledger::auth::TokenSigner;
use duo_ledger::cli::{self, Cli, Commands, DbCommands};
use duo_ledger::config::{Config, LogFormat};
use duo_ledger::{create_app, db, AppState, HttpOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Debts => cli::handle_debts(&config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    db::run_migrations(&pool, &config.migrations_dir).await?;

    let signer = TokenSigner::new(
        config.auth_token_secret.as_bytes(),
        chrono::Duration::hours(config.auth_token_ttl_hours),
    );

    let state = AppState::new(
        Arc::new(PostgresLedgerStore::new(pool.clone())),
        Arc::new(PostgresUserStore::new(pool)),
        signer,
        HttpOptions {
            cors_allowed_origin: config.cors_allowed_origin.clone(),
            log_request_body: config.log_request_body,
            expose_internal_errors: config.is_development(),
        },
    );
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!(environment = %config.environment, "listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
