//! Logging and diagnostics for the chunk loops and the native boundary.
//!
//! Library code only talks to the `log` facade. The host decides whether to
//! install a logger; `enable_verbose_logging` is the one-shot helper the Python
//! layer calls to get `env_logger` output on stderr or in a file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::PhonexError;

/// Logs a structured key-value metric line, only in debug builds.
///
/// # Example
/// ```
/// use phonex_augment::log_metric;
/// let rows = 42;
/// log_metric!("event" = "chunk_written", "rows" = &rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::log::debug!(target: "phonex::metrics", "PHONEX_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `Info` level. Later calls are no-ops.
///
/// With `log_file`, records are appended to that file instead of stderr.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<(), PhonexError> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
