use std::path::PathBuf;

use clap::Parser;
use melt_exporter::{DumpFormat, Error, Exporter, ExporterConfig, HttpConfig, ReqwestPost};
use tracing_subscriber::EnvFilter;

/// Sends the entities described in a model file to a MELT ingestion endpoint.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML (or JSON) model file with the entities to send.
    #[arg(short, long)]
    input: PathBuf,

    /// Tenant-scoped base URL of the ingestion API.
    #[arg(
        long,
        env = "MELT_INGEST_URL",
        default_value = "http://localhost:8080"
    )]
    base_url: String,

    /// Bearer token for the ingestion API.
    #[arg(long, env = "MELT_INGEST_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Auth method of the active profile, used to explain permission errors.
    #[arg(long, env = "MELT_AUTH_METHOD", default_value = "")]
    auth_method: String,

    /// Dump each payload to stdout in this format.
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// Indent used when dumping JSON.
    #[arg(long, default_value = "  ")]
    json_indent: String,

    /// Build (and dump) payloads without sending them.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Err(e.into()),
    };
    let entities = melt_core::load_entities(&args.input)?;

    let config = ExporterConfig {
        dump_format: args.dump.unwrap_or_default(),
        dry_run: args.dry_run,
        json_indent: args.json_indent,
    };
    let poster = ReqwestPost::new(HttpConfig {
        token: args.token,
        ..HttpConfig::new(args.base_url)
    })?;
    let mut exporter = Exporter::new(config, poster, args.auth_method);
    if args.dump.is_some() {
        exporter = exporter.with_dump_fn(|text| print!("{text}"));
    }

    // Events ride along with logs.
    exporter.export_metrics(&entities).await?;
    exporter.export_logs(&entities).await?;
    exporter.export_spans(&entities).await?;
    Ok(())
}
