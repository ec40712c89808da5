use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub const GT_PREFIX: &str = "gt";
pub const SHELF_PREFIX: &str = "shelf";

static SCREEN_HELD: AtomicBool = AtomicBool::new(false);

/// Silences the stderr mirror while a full-screen widget owns the terminal
pub struct ScreenGuard(());

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        SCREEN_HELD.store(false, Ordering::SeqCst);
    }
}

pub fn hold_screen() -> ScreenGuard {
    SCREEN_HELD.store(true, Ordering::SeqCst);
    ScreenGuard(())
}

fn mirror_to_stderr(verbose: bool) -> bool {
    verbose && !SCREEN_HELD.load(Ordering::SeqCst)
}

/// Install the global subscriber.
///
/// Events go to a daily-rotated file under `<data_dir>/logs`; with `verbose`
/// they are mirrored to stderr since stdout carries command output. The mirror
/// pauses while a [`ScreenGuard`] is alive. `RUST_LOG` overrides `level`.
pub fn init(prefix: &str, data_dir: &Path, level: &str, verbose: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(data_dir.join("logs"))?;

    let stderr = std::io::stderr.with_filter(move |_| mirror_to_stderr(verbose));
    let level = if verbose { "debug".to_string() } else { level.to_string() };
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_")));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(stderr.and(appender))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    Ok(())
}

/// Route events to the test harness; force it at the top of a test to see logs
#[cfg(test)]
pub static TEST_LOGGING: std::sync::LazyLock<()> = std::sync::LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::level_filters::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
});
