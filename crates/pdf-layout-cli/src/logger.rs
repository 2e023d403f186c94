use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Writes timestamped log lines to stderr
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    /// `-v` count to level: warnings by default, then info, debug, trace
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Self { level }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let target = if record.level() >= Level::Debug {
            format!(" {}", record.target())
        } else {
            String::new()
        };
        eprintln!(
            "{} {:<5}{} {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {}
}
