//! # Compositor
//!
//! Headless composition: build a canvas from the command line and write it
//! out as PNG.

use clap::Parser;
use compositor_app::{compose, AppConfig, CliArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels
/// (default: info,compositor_core=debug,compositor_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,compositor_core=debug,compositor_renderer=debug,compositor_app=debug")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
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

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from(CliArgs::parse());
    tracing::info!(
        "Composing {}x{} canvas: {} image(s), {} text layer(s)",
        config.width,
        config.height,
        config.images.len(),
        config.texts.len()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(async {
        let mut editor = compose(&config).await?;
        editor.wait_for_decodes().await;
        editor.write_png(&config.output)
    })?;

    if !output.report.is_complete() {
        tracing::warn!("Export is incomplete: {:?}", output.report);
    }
    tracing::info!(
        "Wrote {}x{} image to {}",
        output.width,
        output.height,
        config.output.display()
    );
    Ok(())
}
