use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Level requested through `RUST_LOG`, `Info` when unset or unparsable
fn env_level() -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the stderr logger.
///
/// # Arguments
/// * `level` - Explicit level, overrides `RUST_LOG` when present
///
/// # Errors
/// * If a global logger is already installed
pub fn setup_logger(level: Option<LevelFilter>) -> Result<()> {
    Dispatch::new()
        .level(level.unwrap_or_else(env_level))
        // stdout carries command output
        .chain(std::io::stderr())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
