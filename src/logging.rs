use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or `debug` when enabled in the config file.
///
/// With debug logging on, `RUST_LOG` may override the level. When `log_file`
/// is given, output is appended to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // `RUST_LOG` only applies in debug mode.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match log_file.as_ref().and_then(|p| Some((p.parent()?, p.file_name()?))) {
        Some((dir, name)) => {
            let _ = std::fs::create_dir_all(dir);
            let appender = tracing_appender::rolling::never(dir, name);
            builder.with_ansi(false).with_writer(appender).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}
