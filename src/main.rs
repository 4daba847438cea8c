use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use readership_pipeline::adapters::Publisher;
use readership_pipeline::config::Config;
use readership_pipeline::services::PipelineService;

#[derive(Parser)]
#[command(name = "readership-pipeline")]
#[command(about = "Normalize publisher readership exports into per-customer reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adapt and canonicalize the uncleaned exports of one publisher
    Preclean {
        /// Publisher name as listed in the publisher master
        publisher: String,
    },
    /// Resolve a publisher's latest precleaned snapshot for one customer
    Clean {
        /// Publisher name as listed in the publisher master
        publisher: String,
        /// Customer name as listed in the customer stock code master
        customer: String,
    },
    /// Preclean every publisher and clean every customer
    RunAll,
    /// Rebuild readership summaries from persisted clean files
    Readership {
        /// Customer name; every customer when omitted
        customer: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,readership_pipeline=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Data root: {}", config.data_root.display());

    let service = PipelineService::from_config(config)?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Preclean { publisher } => {
            let publisher = Publisher::from_name(&publisher)?;
            let count = service.preclean_publisher(publisher, today)?;
            info!("Precleaned {} rows for {}", count, publisher);
        }
        Command::Clean {
            publisher,
            customer,
        } => {
            let publisher = Publisher::from_name(&publisher)?;
            let count = service.clean_customer(publisher, &customer)?;
            info!("Cleaned {} rows for {} / {}", count, customer, publisher);
        }
        Command::RunAll => {
            service.run_all(today)?;
            info!("Full run complete");
        }
        Command::Readership { customer } => match customer {
            Some(customer) => {
                let count = service.build_readership(&customer, today)?;
                info!("Readership file for {} holds {} rows", customer, count);
            }
            None => service.build_all_readership(today)?,
        },
    }

    Ok(())
}
