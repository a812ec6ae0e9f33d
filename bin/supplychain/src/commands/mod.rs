use core::fmt;

use anyhow::Result;
use clap::Subcommand;
use ledger_client::config::ClientConfig;
use tracing::info_span;

pub(crate) mod create;
pub(crate) mod doctor;
pub(crate) mod options;
pub(crate) mod products;
pub(crate) mod register;
pub(crate) mod supplier;
pub(crate) mod transfer;
pub(crate) mod watch;

use create::CreateProductArgs;
use doctor::DoctorArgs;
use products::ProductsArgs;
use register::RegisterSupplierArgs;
use supplier::SupplierArgs;
use transfer::TransferProductArgs;
use watch::WatchArgs;

pub(crate) const LOG_TARGET: &str = "supplychain::cli";

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Check the connection to the node and the contract deployment")]
    Doctor(Box<DoctorArgs>),
    #[command(about = "List the products stored on the ledger")]
    Products(Box<ProductsArgs>),
    #[command(about = "Create a product owned by the active account")]
    CreateProduct(Box<CreateProductArgs>),
    #[command(about = "Register the active account as a supplier")]
    RegisterSupplier(Box<RegisterSupplierArgs>),
    #[command(about = "Transfer the ownership of a product")]
    TransferProduct(Box<TransferProductArgs>),
    #[command(about = "Look up the supplier registered under an address")]
    Supplier(Box<SupplierArgs>),
    #[command(about = "Follow account and network changes of the provider")]
    Watch(Box<WatchArgs>),
}

impl fmt::Display for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commands::Doctor(_) => write!(f, "Doctor"),
            Commands::Products(_) => write!(f, "Products"),
            Commands::CreateProduct(_) => write!(f, "CreateProduct"),
            Commands::RegisterSupplier(_) => write!(f, "RegisterSupplier"),
            Commands::TransferProduct(_) => write!(f, "TransferProduct"),
            Commands::Supplier(_) => write!(f, "Supplier"),
            Commands::Watch(_) => write!(f, "Watch"),
        }
    }
}

pub async fn run(command: Commands, config: &ClientConfig) -> Result<()> {
    let name = command.to_string();
    let span = info_span!("Subcommand", name);
    let _span = span.enter();

    match command {
        Commands::Doctor(args) => args.run(config).await,
        Commands::Products(args) => args.run(config).await,
        Commands::CreateProduct(args) => args.run(config).await,
        Commands::RegisterSupplier(args) => args.run(config).await,
        Commands::TransferProduct(args) => args.run(config).await,
        Commands::Supplier(args) => args.run(config).await,
        Commands::Watch(args) => args.run(config).await,
    }
}
