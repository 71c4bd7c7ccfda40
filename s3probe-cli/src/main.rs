use anyhow::Context;
use clap::{ArgAction, Parser};
use s3probe::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Exit code when the probe itself could not run, including bad arguments.
const EXIT_UNKNOWN: i32 = 3;

#[derive(Debug, Parser)]
#[command(author, version, about = "Health probe for S3-compatible object storage")]
struct Cli {
    /// Endpoint URL, e.g. https://s3.example.org
    #[arg(short = 'E', long, env = "S3PROBE_ENDPOINT")]
    endpoint: Option<String>,
    /// Access key id
    #[arg(long = "s3-access-key", env = "S3PROBE_ACCESS_KEY")]
    access_key: Option<String>,
    /// Secret access key
    #[arg(long = "s3-secret-key", env = "S3PROBE_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
    /// Region name
    #[arg(long = "s3-region", env = "S3PROBE_REGION")]
    region: Option<String>,
    /// Bucket used for the probe object
    #[arg(long = "s3-bucket", env = "S3PROBE_BUCKET")]
    bucket: Option<String>,
    /// Timeout in seconds for each storage operation
    #[arg(long = "se-timeout", value_name = "SECS", default_value_t = s3probe::config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    /// Only check listing; upload, download and delete report OK untouched
    #[arg(long = "read-only", visible_alias = "ro")]
    read_only: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Log output format (compact or json)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,
    /// Increase log verbosity. Repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::new()
            .with_timeout_secs(self.timeout)
            .with_read_only(self.read_only);
        config.endpoint.clone_from(&self.endpoint);
        config.access_key.clone_from(&self.access_key);
        config.secret_key.clone_from(&self.secret_key);
        config.region.clone_from(&self.region);
        config.bucket.clone_from(&self.bucket);
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let code = if err.use_stderr() { EXIT_UNKNOWN } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = init_tracing(cli.log_format, cli.verbose) {
        eprintln!("failed to initialise logging: {err}");
    }

    let code = match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            println!("UNKNOWN - {err:#}");
            EXIT_UNKNOWN
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.probe_config();
    info!(endpoint = %config.endpoint_key(), read_only = config.read_only, "Starting probe");

    // A client that cannot be built still lets List report the reason.
    let gateway: Box<dyn StorageGateway> = match ObjectStoreGateway::connect(&config) {
        Ok(gateway) => Box::new(gateway),
        Err(err) => {
            warn!(error = %err, "Storage client unavailable");
            Box::new(UnavailableGateway::new(err.to_string()))
        }
    };

    let pipeline = PipelineBuilder::storage_probe()?
        .with_event_sink(Arc::new(LoggingEventSink::debug()))
        .build()
        .context("building probe pipeline")?;

    let report = pipeline
        .run(&config, gateway.as_ref())
        .await
        .context("running probe")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    Ok(report.exit_code())
}
