//! Process wide destination for the diagnostics of this crate.
//!
//! All messages go through the [`log`] facade, so an application that
//! already installs a logger such as `env_logger` receives them with
//! no further setup. For applications without one, [`SinkLogger`]
//! becomes the global logger the first time
//! [`api::initialize`][crate::api::initialize] or
//! [`register_log_callback`] is called. Until a callback is registered
//! the sink writes each message on its own line to stderr.
//!
//! An application that wants its own logger must install it before
//! either call.

use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::{const_mutex, const_rwlock, Mutex, RwLock};

/// Function receiving each log record.
pub type LogCallback = fn(&Record<'_>);

static CALLBACK: RwLock<LogCallback> = const_rwlock(default_log_callback);
static INSTALLED: Mutex<bool> = const_mutex(false);
static LOGGER: SinkLogger = SinkLogger;

fn default_log_callback(record: &Record<'_>) {
    let _ = write_record(&mut io::stderr(), record);
}

fn write_record<W>(out: &mut W, record: &Record<'_>) -> io::Result<()>
where
    W: Write,
{
    writeln!(out, "{}", record.args())
}

/// [`Log`] implementation forwarding records to the registered
/// callback.
#[derive(Debug)]
pub struct SinkLogger;

impl Log for SinkLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    // The `log` macros filter by level before calling in.
    fn log(&self, record: &Record<'_>) {
        let callback = *CALLBACK.read();
        callback(record);
    }

    fn flush(&self) {}
}

/// Install [`SinkLogger`] as the global logger. Installing it again
/// is a no-op. Fails if the application installed another logger,
/// which then keeps receiving all records.
pub fn install() -> Result<(), SetLoggerError> {
    let mut installed = INSTALLED.lock();
    if !*installed {
        log::set_logger(&LOGGER)?;
        log::set_max_level(LevelFilter::Debug);
        *installed = true;
    }
    Ok(())
}

/// Route all diagnostics of this crate to `callback`, replacing any
/// previously registered callback.
pub fn register_log_callback(callback: LogCallback) -> Result<(), SetLoggerError> {
    *CALLBACK.write() = callback;
    install()
}

#[cfg(test)]
mod test {
    use super::*;

    use lazy_static::lazy_static;

    lazy_static! {
        static ref CAPTURED: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());
    }

    fn capture(record: &Record<'_>) {
        CAPTURED
            .lock()
            .unwrap()
            .push(format!("{}: {}", record.level(), record.args()));
    }

    #[test]
    fn test_default_sink_writes_lines() {
        let mut out = Vec::new();
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("Incorrect network interface {}", "wlan9"))
                .level(log::Level::Error)
                .build(),
        )
        .unwrap();
        assert_eq!(out, b"Incorrect network interface wlan9\n");
    }

    #[test]
    fn test_callback_receives_records() {
        *CALLBACK.write() = capture;
        LOGGER.log(
            &Record::builder()
                .args(format_args!("SSID length {} > {}", 40, 32))
                .level(log::Level::Warn)
                .target("wifi_scan")
                .build(),
        );
        *CALLBACK.write() = default_log_callback;

        let captured = CAPTURED.lock().unwrap();
        assert!(captured
            .iter()
            .any(|line| line.contains("WARN: SSID length 40 > 32")));
    }
}
