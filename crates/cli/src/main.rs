use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use attachlink_markers::{discover, group_by_session, Document, Marker, SessionGroup};
use attachlink_pipeline::{Pipeline, ResolverConfig};

const DEFAULT_CONFIG: &str = "attachlink.toml";

#[derive(Parser)]
#[command(name = "attachlink")]
#[command(about = "Scan report pages for attachment markers and resolve them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file (default: attachlink.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover attachment markers in an exported report page
    Scan(ScanArgs),

    /// Discover markers and resolve them against the configured services
    Resolve(ResolveArgs),

    /// Encode text with the legacy wire codec
    Encode(CodecArgs),

    /// Decode a wire argument back to text
    Decode(CodecArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Report HTML file to scan
    page: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ResolveArgs {
    /// Report HTML file to resolve
    page: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Exit non-zero when any marker ends in an error
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Args)]
struct CodecArgs {
    /// Text to transform; reads stdin when omitted
    text: Option<String>,
}

#[derive(Serialize)]
struct ScanReport {
    markers: Vec<Marker>,
    groups: Vec<SessionGroup>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Scan(args) => run_scan(args, config),
        Commands::Resolve(args) => run_resolve(args, config).await,
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// An explicitly requested config file must exist; the default path is
/// optional and silently falls back to built-in defaults.
fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                read_config(default)
            } else {
                log::debug!("no {DEFAULT_CONFIG} found, using defaults");
                Ok(ResolverConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<ResolverConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

fn read_page(path: &Path) -> Result<Document> {
    let page = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report page {}", path.display()))?;
    Ok(Document::parse(&page))
}

fn run_scan(args: ScanArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let document = read_page(&args.page)?;
    let markers = discover(&document, &config.discovery);
    let groups = group_by_session(&markers);
    log::info!("{} markers in {} session groups", markers.len(), groups.len());
    print_json(&ScanReport { markers, groups }, args.pretty)
}

async fn run_resolve(args: ResolveArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let document = read_page(&args.page)?;
    let mut markers = discover(&document, &config.discovery);
    let pipeline = Pipeline::new(&config).context("Invalid service configuration")?;
    let report = pipeline.run(&mut markers).await;
    print_json(&report, args.pretty)?;
    if args.fail_on_error && report.stats.errors > 0 {
        log::warn!("{} markers failed to resolve", report.stats.errors);
        std::process::exit(1);
    }
    Ok(())
}

fn run_encode(args: CodecArgs) -> Result<()> {
    let text = read_text(args.text)?;
    println!("{}", attachlink_codec::encode(&text));
    Ok(())
}

fn run_decode(args: CodecArgs) -> Result<()> {
    let wire = read_text(args.text)?;
    println!("{}", attachlink_codec::decode(wire.trim()));
    Ok(())
}

fn read_text(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
