use clap::{Args, Subcommand};
use jiff::civil::Date;
use serde_json::json;
use warranty_app::domain::{
    locations::records::LocationUuid,
    owners::OwnerUuid,
    pagination::PageRequest,
    transfers::{TransferLogsService, data::TransferLogsFilter},
};

use super::{
    OwnerArgs,
    output::{failure, to_json},
};

#[derive(Debug, Args)]
pub(crate) struct TransfersCommand {
    #[command(flatten)]
    target: OwnerArgs,

    #[command(subcommand)]
    command: TransfersSubcommand,
}

#[derive(Debug, Subcommand)]
enum TransfersSubcommand {
    /// Audit listing of service moves, newest first
    List(ListArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 20)]
    limit: u32,

    /// First day to include (UTC)
    #[arg(long)]
    from: Option<Date>,

    /// Last day to include (UTC)
    #[arg(long)]
    to: Option<Date>,

    /// Moves into or out of this location
    #[arg(long)]
    location: Option<LocationUuid>,
}

impl From<ListArgs> for TransferLogsFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            page: PageRequest {
                page: args.page,
                limit: args.limit,
            },
            start_date: args.from,
            end_date: args.to,
            location: args.location,
        }
    }
}

pub(crate) async fn run(command: TransfersCommand) -> Result<(), String> {
    let owner = command.target.owner();
    let context = command.target.connect().await?;

    let output = match command.command {
        TransfersSubcommand::List(args) => {
            list(context.transfer_logs.as_ref(), owner, args.into()).await?
        }
    };

    println!("{output}");

    Ok(())
}

async fn list(
    transfer_logs: &dyn TransferLogsService,
    owner: OwnerUuid,
    filter: TransferLogsFilter,
) -> Result<String, String> {
    let page = transfer_logs
        .list_transfer_logs(owner, filter)
        .await
        .map_err(|error| failure(error.kind(), &error))?;

    to_json(&json!({
        "entries": page.entries,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "total_pages": page.total_pages(),
    }))
}
