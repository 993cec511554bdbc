use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, set_logger, set_max_level};

use config::LOG_TAG;

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 20,  // White
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };
        console_println!(
            "\u{1B}[{}m[{}][{}][{}] {}\u{1B}[0m",
            color,
            LOG_TAG,
            record.level(),
            record.target(),
            record.args(),
        );
    }

    fn flush(&self) {}
}

/// Install [Logger] as the `log` backend. Output goes to the console sink.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    static LOGGER: Logger = Logger;
    set_logger(&LOGGER)?;
    set_max_level(level);
    Ok(())
}

/// Improved debug macro,
/// only compiled in debug mode.
#[macro_export]
macro_rules! debug_ex {
    // debug_ex!(target: "my_target", "a {} event", "log")
    (target: $target:expr, $($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            use log::{log,Level};
            log!(target: $target, Level::Debug, $($arg)+)
        }
    };

    // debug_ex!("a {} event", "log")
    ($($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            use log::{log,Level};
            log!(Level::Debug, $($arg)+)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleSink, set_sink};
    use alloc::string::String;
    use spin::Mutex;

    struct Capture(Mutex<String>);

    impl ConsoleSink for Capture {
        fn put_str(&self, s: &str) {
            self.0.lock().push_str(s);
        }
    }

    static CAPTURE: Capture = Capture(Mutex::new(String::new()));

    #[test]
    fn records_are_tagged_and_routed_to_the_sink() {
        assert!(set_sink(&CAPTURE));
        assert!(init(LevelFilter::Info).is_ok());
        log::info!(target: "gpio", "GPIO count: {}", 2);
        log::debug!("filtered out");
        let out = CAPTURE.0.lock().clone();
        assert!(out.contains("[RUSC_GPIO][INFO][gpio] GPIO count: 2\u{1B}[0m\n"));
        assert!(!out.contains("filtered out"));
        assert!(init(LevelFilter::Debug).is_err());
    }
}
