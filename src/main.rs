use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use esbootstrap::config::Config;
use esbootstrap::resource::naming;
use esbootstrap::{
    ArchiveSource, ClusterClient, DirectorySource, ProvisionOptions, Provisioner, ResourceKind,
    ResourceSource,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Version injected at compile time via ESBOOTSTRAP_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("ESBOOTSTRAP_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Provision an Elasticsearch cluster from a resource tree
#[derive(Parser, Debug)]
#[command(name = "esbootstrap", version, about, long_about = None)]
struct Args {
    /// Cluster base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Directory holding the resource tree
    #[arg(long, global = true, conflicts_with = "archive")]
    dir: Option<PathBuf>,

    /// Zip (or jar) archive holding the resource tree
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    /// Root namespace inside the resource tree
    #[arg(long, global = true)]
    root: Option<String>,

    /// Log level (RUST_LOG wins when set)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the resource tree to the cluster
    Apply {
        /// Replace existing resources, deleting existing indices and their data
        #[arg(long)]
        force: bool,
    },
    /// List the resources found in the tree without contacting the cluster
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("esbootstrap={}", level.as_filter())));

    let (non_blocking, guard, ansi) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (writer, guard, false)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, true)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(ansi)
        .with_target(false)
        .init();

    tracing::debug!("esbootstrap {} started with log level: {:?}", VERSION, level);
    if let Some(path) = log_file {
        tracing::debug!("Log file: {:?}", path);
    }

    Ok(guard)
}

/// CLI archive > CLI dir > config archive > config dir > current directory
fn open_source(args: &Args, config: &Config) -> Result<Box<dyn ResourceSource>> {
    let archive = args
        .archive
        .clone()
        .or_else(|| args.dir.is_none().then(|| config.archive.clone()).flatten());

    if let Some(path) = archive {
        let source = ArchiveSource::open(&path)
            .with_context(|| format!("Failed to open resource archive {:?}", path))?;
        return Ok(Box::new(source));
    }

    let dir = args
        .dir
        .clone()
        .or_else(|| config.dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Box::new(DirectorySource::new(dir)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref())?;

    let config = Config::load();
    let url = config.effective_url(args.url.as_deref());
    let root = config.effective_root(args.root.as_deref());
    let timeout = args
        .timeout_secs
        .or(config.timeout_secs)
        .map(Duration::from_secs);

    let source = open_source(&args, &config)?;
    let options = ProvisionOptions::new(&root).with_layout(config.effective_layout());
    let client = ClusterClient::new(&url, timeout)
        .with_context(|| format!("Invalid cluster url [{}]", url))?;
    let provisioner = Provisioner::new(client, source, options);
    tracing::debug!(
        "Cluster {}, root [{}], environment of {} variable(s)",
        provisioner.client().base_url(),
        provisioner.options().root,
        provisioner.options().environment.len()
    );

    match args.command {
        Command::Apply { force } => {
            let report = provisioner
                .provision(force)
                .await
                .with_context(|| format!("Provisioning [{}] into {} failed", root, url))?;
            println!("{}", report);
        }
        Command::List => list(&provisioner)?,
    }

    Ok(())
}

fn list(provisioner: &Provisioner) -> Result<()> {
    let catalog = provisioner.catalog();
    println!("Resources under [{}]:", catalog.root());

    for kind in ResourceKind::ALL {
        let names = match kind {
            ResourceKind::JsonData => continue,
            _ => catalog.list_names(kind)?,
        };
        if names.is_empty() {
            continue;
        }

        println!("{}:", kind.heading());
        for name in &names {
            match kind {
                ResourceKind::Index if naming::is_dynamic(name) => {
                    println!("  {} (matches {})", naming::decode(name), naming::normalize(name))
                }
                ResourceKind::Index => {
                    let seeds = catalog.bulk_files(Some(name))?.len()
                        + catalog.document_files(name)?.len();
                    if seeds > 0 {
                        println!("  {} ({} seed file(s))", name, seeds);
                    } else {
                        println!("  {}", name);
                    }
                }
                _ => println!("  {}", name),
            }
        }
    }

    Ok(())
}
