use std::io::Write;
use std::time::Instant;

use log::{Log, Metadata, Record};
use parking_lot::Mutex;

use crate::style::Palette;

/// Diagnostics sink; task output itself never goes through here.
struct LusLogger {
    file: Option<Mutex<std::fs::File>>,
    palette: Palette,
    filter: log::LevelFilter,
    start: Instant,
}

impl Log for LusLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        if let Some(ref file) = self.file {
            let _ = writeln!(
                file.lock(),
                "[{elapsed:.3}s] [{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        } else {
            let level = self
                .palette
                .paint(level_style(record.level()), record.level().as_str());
            eprintln!("[{elapsed:.3}s] [{level}] {}", record.args());
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

fn level_style(level: log::Level) -> anstyle::Style {
    match level {
        log::Level::Error => crate::style::ERROR,
        log::Level::Warn => crate::style::WARNING,
        log::Level::Info | log::Level::Debug | log::Level::Trace => anstyle::Style::new().dimmed(),
    }
}

/// Level filter from `RUST_LOG`, warnings by default.
#[must_use]
pub fn filter_from(value: Option<&str>) -> log::LevelFilter {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Warn)
}

/// Initialize the global logger. Must be called once before any logging.
///
/// Records go to `log_file` when given, otherwise to stderr.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init(log_file: Option<std::fs::File>) {
    let filter = filter_from(std::env::var("RUST_LOG").ok().as_deref());

    let logger = LusLogger {
        file: log_file.map(Mutex::new),
        palette: Palette::stderr(),
        filter,
        start: Instant::now(),
    };

    log::set_boxed_logger(Box::new(logger)).expect("logger already initialized");
    log::set_max_level(filter);
}
