//! CLI for the chunkget parallel downloader.

mod output;

use anyhow::{Context, Result};
use chunkget_core::config::{self, TlsVersion};
use chunkget_core::units::format_size;
use chunkget_core::{CancelToken, HeaderList, TransferConfig, TransferRequest};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

pub use output::default_output_name;

/// Download a single HTTP(S) resource, in parallel byte ranges when the server allows it.
#[derive(Debug, Parser)]
#[command(name = "chunkget", version)]
#[command(about = "chunkget: parallel ranged HTTP downloader", long_about = None)]
#[command(after_help = "Examples:\n  \
    chunkget https://example.com/file.iso\n  \
    chunkget -o out.bin -H 'Authorization:Bearer abc,User-Agent:chunkget' https://example.com/x\n  \
    chunkget -v false https://example.com/file.iso")]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    #[arg(required_unless_present_any = ["generate_completions", "generate_man"])]
    pub url: Option<String>,

    /// Output filename (default: last path segment of the URL, or index.html).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Extra request headers as comma-separated Key:Value pairs.
    #[arg(short = 'H', long, value_name = "LIST", default_value = "")]
    pub headers: String,

    /// Print probe result, progress and a completion summary.
    #[arg(short, long, value_name = "BOOL", action = ArgAction::Set, default_value_t = true)]
    pub verbose: bool,

    /// Lowest accepted TLS version (1.0, 1.1, 1.2 or 1.3).
    #[arg(long, value_name = "VERSION", value_parser = parse_tls_version)]
    pub tls_min: Option<TlsVersion>,

    /// TLS cipher list passed to the TLS backend.
    #[arg(long, value_name = "LIST")]
    pub tls_ciphers: Option<String>,

    /// Alternate configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print shell completions to stdout and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub generate_completions: Option<Shell>,

    /// Print a man page to stdout and exit.
    #[arg(long, exclusive = true)]
    pub generate_man: bool,
}

fn parse_tls_version(s: &str) -> std::result::Result<TlsVersion, String> {
    s.parse()
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        if let Some(shell) = self.generate_completions {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "chunkget", &mut io::stdout());
            return Ok(());
        }
        if self.generate_man {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
            return Ok(());
        }

        let cfg = self.load_config()?;
        let request = self.request()?;
        let verbose = request.verbose;
        let outcome = run_transfer(request, cfg).await?;
        if verbose {
            println!(
                "Download complete: {} ({})",
                outcome.path.display(),
                format_size(outcome.bytes)
            );
        }
        Ok(())
    }

    /// Config file (from `--config` or the XDG default) with command-line overrides applied.
    fn load_config(&self) -> Result<TransferConfig> {
        let mut cfg = config::load_or_init(self.config.as_deref())?;
        self.apply_overrides(&mut cfg);
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    /// Command-line TLS flags win over the config file.
    fn apply_overrides(&self, cfg: &mut TransferConfig) {
        if let Some(min) = self.tls_min {
            cfg.tls.min_version = Some(min);
        }
        if let Some(ciphers) = &self.tls_ciphers {
            cfg.tls.cipher_list = Some(ciphers.clone());
        }
    }

    fn request(&self) -> Result<TransferRequest> {
        let url = self.url.clone().context("a URL is required")?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_output_name(&url)));
        let headers: HeaderList = self.headers.parse()?;
        Ok(TransferRequest::new(url, output)
            .with_headers(headers)
            .with_verbose(self.verbose))
    }
}

/// Runs the blocking transfer on the blocking pool; Ctrl-C cancels it.
async fn run_transfer(
    request: TransferRequest,
    cfg: TransferConfig,
) -> Result<chunkget_core::TransferOutcome> {
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling transfer");
            signal_token.cancel();
        }
    });

    let url = request.url.clone();
    let result = tokio::task::spawn_blocking(move || {
        chunkget_core::download_with_cancel(&request, &cfg, &cancel)
    })
    .await
    .context("transfer task panicked")?;
    watcher.abort();

    result.with_context(|| format!("download of {} failed", url))
}
