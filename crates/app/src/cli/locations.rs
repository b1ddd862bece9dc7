use clap::{Args, Subcommand};
use serde_json::json;
use warranty_app::domain::{
    locations::{LocationsService, LocationsServiceError, data::NewLocation, records::LocationUuid},
    owners::OwnerUuid,
};

use super::{
    OwnerArgs,
    output::{failure, to_json},
};

#[derive(Debug, Args)]
pub(crate) struct LocationsCommand {
    #[command(flatten)]
    target: OwnerArgs,

    #[command(subcommand)]
    command: LocationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum LocationsSubcommand {
    /// List locations with their usage counters
    List {
        /// Only show active locations
        #[arg(long)]
        only_active: bool,
    },

    /// Create a location
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        address: Option<String>,
    },

    /// Activate or deactivate a location
    Toggle {
        #[arg(long)]
        location: LocationUuid,

        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },

    /// Delete a location nothing refers to
    Delete {
        #[arg(long)]
        location: LocationUuid,
    },
}

pub(crate) async fn run(command: LocationsCommand) -> Result<(), String> {
    let owner = command.target.owner();
    let context = command.target.connect().await?;
    let locations = context.locations.as_ref();

    let output = match command.command {
        LocationsSubcommand::List { only_active } => list(locations, owner, only_active).await?,
        LocationsSubcommand::Create { name, address } => {
            create(locations, owner, NewLocation { name, address }).await?
        }
        LocationsSubcommand::Toggle { location, active } => {
            toggle(locations, owner, location, active).await?
        }
        LocationsSubcommand::Delete { location } => delete(locations, owner, location).await?,
    };

    println!("{output}");

    Ok(())
}

fn locations_failure(error: &LocationsServiceError) -> String {
    failure(error.kind(), error)
}

async fn list(
    locations: &dyn LocationsService,
    owner: OwnerUuid,
    only_active: bool,
) -> Result<String, String> {
    let summaries = locations
        .list_locations(owner, only_active)
        .await
        .map_err(|error| locations_failure(&error))?;

    to_json(&summaries)
}

async fn create(
    locations: &dyn LocationsService,
    owner: OwnerUuid,
    location: NewLocation,
) -> Result<String, String> {
    let location = locations
        .create_location(owner, location)
        .await
        .map_err(|error| locations_failure(&error))?;

    to_json(&location)
}

async fn toggle(
    locations: &dyn LocationsService,
    owner: OwnerUuid,
    location: LocationUuid,
    active: bool,
) -> Result<String, String> {
    let location = locations
        .toggle_active(owner, location, active)
        .await
        .map_err(|error| locations_failure(&error))?;

    to_json(&location)
}

async fn delete(
    locations: &dyn LocationsService,
    owner: OwnerUuid,
    location: LocationUuid,
) -> Result<String, String> {
    locations
        .delete_location(owner, location)
        .await
        .map_err(|error| locations_failure(&error))?;

    to_json(&json!({ "deleted": location }))
}
