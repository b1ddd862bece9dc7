use clap::{Args, Subcommand};
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use serde::Serialize;
use serde_json::json;
use warranty_app::domain::{
    locations::records::LocationUuid,
    owners::OwnerUuid,
    pagination::PageRequest,
    services::{
        ServiceLifecycle, ServiceLifecycleError,
        data::{ServicesFilter, SortOrder},
        aging::Urgency,
        records::{ServiceDetails, ServiceStatus, ServiceUuid},
    },
};

use super::{
    OwnerArgs,
    output::{failure, to_json},
};

#[derive(Debug, Args)]
pub(crate) struct ServicesCommand {
    #[command(flatten)]
    target: OwnerArgs,

    #[command(subcommand)]
    command: ServicesSubcommand,
}

#[derive(Debug, Subcommand)]
enum ServicesSubcommand {
    /// List services, oldest entry first
    List(ListArgs),

    /// Show one service with its move history and aging
    Show {
        #[arg(long)]
        service: ServiceUuid,

        /// Reference day for aging (defaults to today, UTC)
        #[arg(long)]
        today: Option<Date>,
    },

    /// Delete a service and its move history
    Delete {
        #[arg(long)]
        service: ServiceUuid,
    },

    /// Status counters and pending-service urgency
    Stats {
        /// Reference day for aging (defaults to today, UTC)
        #[arg(long)]
        today: Option<Date>,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 20)]
    limit: u32,

    /// Substring of client name, invoice number or RUT
    #[arg(long)]
    search: Option<String>,

    /// Restrict to these statuses (repeatable)
    #[arg(long = "status")]
    statuses: Vec<ServiceStatus>,

    #[arg(long)]
    location: Option<LocationUuid>,

    /// Newest entry first
    #[arg(long)]
    desc: bool,
}

impl From<ListArgs> for ServicesFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            page: PageRequest {
                page: args.page,
                limit: args.limit,
            },
            search: args.search,
            statuses: args.statuses.into_iter().collect(),
            location: args.location,
            sort_order: if args.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            },
        }
    }
}

pub(crate) async fn run(command: ServicesCommand) -> Result<(), String> {
    let owner = command.target.owner();
    let context = command.target.connect().await?;
    let services = context.services.as_ref();

    let output = match command.command {
        ServicesSubcommand::List(args) => list(services, owner, args.into()).await?,
        ServicesSubcommand::Show { service, today } => {
            show(services, owner, service, today.unwrap_or_else(utc_today)).await?
        }
        ServicesSubcommand::Delete { service } => delete(services, owner, service).await?,
        ServicesSubcommand::Stats { today } => {
            stats(services, owner, today.unwrap_or_else(utc_today)).await?
        }
    };

    println!("{output}");

    Ok(())
}

fn utc_today() -> Date {
    Timestamp::now().to_zoned(TimeZone::UTC).date()
}

/// A service as shown to an operator: details plus aging as of a given day.
#[derive(Debug, Serialize)]
struct ServiceView {
    #[serde(flatten)]
    details: ServiceDetails,
    business_days_open: i64,
    urgency: Urgency,
}

impl ServiceView {
    fn new(details: ServiceDetails, today: Date) -> Self {
        Self {
            business_days_open: details.service.business_days_open(today),
            urgency: details.service.urgency(today),
            details,
        }
    }
}

fn services_failure(error: &ServiceLifecycleError) -> String {
    failure(error.kind(), error)
}

async fn list(
    services: &dyn ServiceLifecycle,
    owner: OwnerUuid,
    filter: ServicesFilter,
) -> Result<String, String> {
    let page = services
        .list_services(owner, filter)
        .await
        .map_err(|error| services_failure(&error))?;

    to_json(&json!({
        "entries": page.entries,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "total_pages": page.total_pages(),
    }))
}

async fn show(
    services: &dyn ServiceLifecycle,
    owner: OwnerUuid,
    service: ServiceUuid,
    today: Date,
) -> Result<String, String> {
    let details = services
        .get_service(owner, service)
        .await
        .map_err(|error| services_failure(&error))?;

    to_json(&ServiceView::new(details, today))
}

async fn delete(
    services: &dyn ServiceLifecycle,
    owner: OwnerUuid,
    service: ServiceUuid,
) -> Result<String, String> {
    services
        .delete_service(owner, service)
        .await
        .map_err(|error| services_failure(&error))?;

    to_json(&json!({ "deleted": service }))
}

async fn stats(
    services: &dyn ServiceLifecycle,
    owner: OwnerUuid,
    today: Date,
) -> Result<String, String> {
    let stats = services
        .service_stats(owner, today)
        .await
        .map_err(|error| services_failure(&error))?;

    to_json(&stats)
}
