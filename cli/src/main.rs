//! ShipFan CLI: decode fulfillment documents and fan them out to a queue.
//!
//! # Commands
//! ```text
//! shipfan run    --bucket <name> --key <key> --queue-arn <arn> [--config <file>]
//! shipfan decode --file <path.xml> [--messages]
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd_decode;
mod cmd_run;
mod logging;
mod settings;

use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "shipfan",
    about = "Fan fulfillment documents out to a queue, one message per package",
    long_about = "
ShipFan CLI: decode Data945 fulfillment XML and deliver one JSON message per
shipped package to an SQS-compatible queue.

ENVIRONMENT VARIABLES:
  SHIPFAN_CONFIG           Settings file (JSON)
  SHIPFAN_BUCKET           Bucket holding the document (run)
  SHIPFAN_QUEUE_ARN        Destination queue identifier
  SHIPFAN_REGION           Queue region
  SHIPFAN_QUEUE_ENDPOINT   Queue endpoint override
  SHIPFAN_SOURCE_ROOT      Directory holding one sub-directory per bucket
  SHIPFAN_SOURCE_ENDPOINT  Path-style object store endpoint
  SHIPFAN_LOG              Log level
  RUST_LOG                 Full tracing filter, wins over SHIPFAN_LOG
",
    version
)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, env = "SHIPFAN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, env = "SHIPFAN_LOG")]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a document, decode it and dispatch its messages
    Run {
        /// Bucket holding the document
        #[arg(long, env = "SHIPFAN_BUCKET")]
        bucket: String,
        /// Object key; also the source file name in every message
        #[arg(long)]
        key: String,
        /// Destination queue (arn:aws:sqs:<region>:<account>:<name>)
        #[arg(long, env = "SHIPFAN_QUEUE_ARN")]
        queue_arn: Option<String>,
        /// Queue region
        #[arg(long, env = "SHIPFAN_REGION")]
        region: Option<String>,
        /// Queue endpoint override, e.g. http://localhost:9324/
        #[arg(long, env = "SHIPFAN_QUEUE_ENDPOINT")]
        endpoint: Option<String>,
        /// Maximum chunk submissions in flight
        #[arg(long)]
        max_in_flight: Option<usize>,
        /// Read documents from <root>/<bucket>/<key>
        #[arg(long, env = "SHIPFAN_SOURCE_ROOT")]
        source_root: Option<String>,
        /// Fetch documents from <endpoint>/<bucket>/<key>
        #[arg(long, env = "SHIPFAN_SOURCE_ENDPOINT", conflicts_with = "source_root")]
        source_endpoint: Option<String>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a local document and print it as JSON
    Decode {
        /// Path to the Data945 XML file
        #[arg(short, long)]
        file: String,
        /// Print the per-package messages instead of the parsed batch
        #[arg(long)]
        messages: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    let mut overrides = Overrides {
        log_level: cli.log_level,
        json_logs: cli.json_logs,
        ..Default::default()
    };

    match cli.command {
        Commands::Run {
            bucket,
            key,
            queue_arn,
            region,
            endpoint,
            max_in_flight,
            source_root,
            source_endpoint,
            json,
        } => {
            overrides.queue_arn = queue_arn;
            overrides.region = region;
            overrides.endpoint = endpoint;
            overrides.max_in_flight = max_in_flight;
            overrides.source_root = source_root;
            overrides.source_endpoint = source_endpoint;
            settings.apply(overrides);
            logging::init_tracing(&settings.log);

            cmd_run::run(&settings, &bucket, &key, json).await
        }

        Commands::Decode { file, messages } => {
            settings.apply(overrides);
            logging::init_tracing(&settings.log);

            cmd_decode::run(&file, messages)
        }
    }
}
