use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::adapters::PostgresLedgerStore;
use crate::config::{mask_password, Config};
use crate::services::TransactionService;

#[derive(Parser)]
#[command(name = "duo-ledger")]
#[command(about = "Duo Ledger - shared expense tracker for two", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,

    /// Print who currently owes whom
    Debts,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!(dir = %config.migrations_dir, "Running database migrations...");
    crate::db::run_migrations(&pool, &config.migrations_dir).await?;

    println!("✓ Database migrations completed");

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Max DB Connections: {}", config.database_max_connections);
    println!("  Token Secret: ****");
    println!("  Token TTL: {}h", config.auth_token_ttl_hours);
    println!("  Environment: {}", config.environment);
    println!(
        "  CORS Origin: {}",
        config.cors_allowed_origin.as_deref().unwrap_or("*")
    );
    println!("  Log Format: {:?}", config.log_format);
    println!("  Migrations Dir: {}", config.migrations_dir);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

pub async fn handle_debts(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    let service = TransactionService::new(Arc::new(PostgresLedgerStore::new(pool)));

    let debts = service.get_debt_summary().await?;

    println!("Nanou owes Amina: {}", debts.nanou_owes_amina);
    println!("Amina owes Nanou: {}", debts.amina_owes_nanou);
    if debts.is_balanced() {
        println!("✓ All square");
    }

    Ok(())
}
