//! # Clipo
//!
//! Command-line slide composer and exporter.

use anyhow::Context;
use clap::Parser;
use clipo_cli::{run_export, run_present, CliArgs, Command, SlideJob};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,clipo_core=debug,clipo_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clipo_core=debug,clipo_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!("Parsed arguments: {:?}", args);

    let written = match args.command {
        Command::Export(slide) => {
            let job = SlideJob::from(slide);
            run_export(&job)
                .await
                .with_context(|| format!("exporting slide to {}", job.out.display()))?
        }
        Command::Present { slide, viewport } => {
            let job = SlideJob::from(slide);
            run_present(&job, viewport).await.with_context(|| {
                format!(
                    "rendering {}x{} presentation frame to {}",
                    viewport.0,
                    viewport.1,
                    job.out.display()
                )
            })?
        }
    };

    tracing::info!("Wrote {}", written.display());
    Ok(())
}
