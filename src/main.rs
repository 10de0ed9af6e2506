//! Command line entry point.

use anyhow::bail;
use clap::Parser;
use segfetch::{DownloadRequest, Downloader, HttpClient, filename_from_url};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse before initialising tracing so --help works without log output.
    let args = Args::parse();

    // RUST_LOG wins over the verbosity flags.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
    debug!(?args, "CLI arguments parsed");

    if !args.dir.is_dir() {
        bail!(
            "destination directory {} does not exist",
            args.dir.display()
        );
    }

    // One client for the whole batch; downloads share its connection pool.
    let client = HttpClient::new();

    for (index, url) in args.urls.iter().enumerate() {
        let filename = filename_from_url(url).unwrap_or_else(|| (index + 1).to_string());
        let request = DownloadRequest::new(url.as_str(), &args.dir, filename.as_str())
            .with_workers(usize::from(args.workers))
            .with_strategy(args.split.into())
            .with_section_size(args.section_size);

        info!(url = %url, filename = %filename, "downloading");
        let report = Downloader::with_client(request, client.clone())
            .download()
            .await?;
        info!(
            path = %report.path.display(),
            bytes = report.bytes_written,
            sections = report.sections,
            "saved"
        );
    }

    Ok(())
}
