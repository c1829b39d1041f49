//! Application entry point for the overlap separation viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging goes to stderr and is filtered through `RUST_LOG`
/// (default `info`); `RUST_LOG=sep_core=debug` shows every separation tick.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Overlap Separation",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
