use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use free_ss::config::{self, Settings, Source};
use free_ss::fetch::HttpFetcher;
use free_ss::output::{format_servers, OutputFormat};
use free_ss::pipeline;
use free_ss::store::FsStore;
use free_ss::FreeSsError;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "free-ss")]
#[command(version, about = "Harvest free Shadowsocks servers into client configs", long_about = None)]
struct Args {
    /// Page to harvest as "<url> <css selector>" (repeatable, replaces the built-in list)
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// URL of a previously published gui-config.json to fall back on
    #[arg(long)]
    prior_url: Option<String>,

    /// Write the Shadowsocks GUI config even if it does not exist yet
    #[arg(long)]
    ss: bool,

    /// Write the COW config even if it does not exist yet
    #[arg(long)]
    cow: bool,

    /// Path of the Shadowsocks GUI config
    #[arg(long, default_value = config::DEFAULT_SS_CONFIG)]
    ss_config: PathBuf,

    /// Path of the COW rc file [default: ~/.cow/rc, rc.txt on Windows]
    #[arg(long)]
    cow_config: Option<PathBuf>,

    /// Group tag marking harvested servers
    #[arg(short, long, default_value = config::DEFAULT_GROUP)]
    group: String,

    /// Cipher used when a page does not name one
    #[arg(short, long, default_value = config::DEFAULT_METHOD)]
    method: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Custom user agent
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Proxy URL (e.g., http://proxy.example.com:8080)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Print the merged server list to stdout
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Harvest and merge without touching any config file
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_settings(self) -> Result<Settings> {
        let sources = if self.sources.is_empty() {
            config::default_sources()?
        } else {
            self.sources
                .iter()
                .map(|spec| Source::parse(spec))
                .collect::<free_ss::Result<Vec<_>>>()?
        };

        let prior_url = if std::env::var_os("CI").is_some() {
            log::debug!("CI detected, not fetching previously known servers");
            None
        } else {
            self.prior_url
                .as_deref()
                .map(|url| {
                    Url::parse(url).map_err(|e| FreeSsError::InvalidUrl(format!("{}: {}", url, e)))
                })
                .transpose()?
        };

        let mut settings = Settings::new(sources);
        settings.prior_url = prior_url;
        settings.group = self.group;
        settings.fallback_method = self.method;
        settings.ss_config = self.ss_config;
        if let Some(cow_config) = self.cow_config {
            settings.cow_config = cow_config;
        }
        settings.force_ss = self.ss;
        settings.force_cow = self.cow;
        settings.dry_run = self.dry_run;
        settings.http.timeout = Duration::from_secs(self.timeout);
        if let Some(user_agent) = self.user_agent {
            settings.http.user_agent = user_agent;
        }
        settings.http.proxy = self.proxy;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::info!("🚀 free-ss v{}", env!("CARGO_PKG_VERSION"));

    let format = args.format;
    let settings = args.into_settings()?;
    let fetcher = HttpFetcher::new(&settings.http)?;

    let servers = pipeline::run(&settings, &fetcher, &FsStore)
        .await
        .context("harvest failed")?;

    if let Some(format) = format {
        println!("{}", format_servers(&servers, format)?);
    }

    log::info!("✅ {} server(s) available", servers.len());
    Ok(())
}
