use clap::{Args, Parser, Subcommand};
use warranty_app::{context::AppContext, domain::owners::OwnerUuid};

mod db;
mod locations;
pub(crate) mod logging;
mod output;
mod services;
mod transfers;

#[derive(Debug, Parser)]
#[command(name = "warranty-app", about = "Warranty service tracking CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: logging::LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Locations(locations::LocationsCommand),
    Services(services::ServicesCommand),
    Transfers(transfers::TransfersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Locations(command) => locations::run(command).await,
            Commands::Services(command) => services::run(command).await,
            Commands::Transfers(command) => transfers::run(command).await,
        }
    }
}

/// Connection and caller identity shared by every data command.
#[derive(Debug, Args)]
pub(crate) struct OwnerArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// UUID of the user whose data is addressed
    #[arg(long)]
    owner: OwnerUuid,
}

impl OwnerArgs {
    pub(crate) fn owner(&self) -> OwnerUuid {
        self.owner
    }

    pub(crate) async fn connect(&self) -> Result<AppContext, String> {
        AppContext::from_database_url(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))
    }
}
