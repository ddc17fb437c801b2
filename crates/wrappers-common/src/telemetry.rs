use crate::error::{Error, Result};
use crate::settings::LogFormat;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Compose the subscriber for a tool.
///
/// `env_filter` is used unless `RUST_LOG` is set. Plain output carries only
/// the message, so diagnostics read like the legacy commands' stderr.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    format: LogFormat,
    sink: Sink,
) -> Box<dyn Subscriber + Send + Sync>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    match format {
        LogFormat::Plain => Box::new(
            Registry::default().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_level(false)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(sink),
            ),
        ),
        LogFormat::Json => Box::new(
            Registry::default()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(name, sink)),
        ),
    }
}

/// Register the subscriber globally. Call once per process.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    LogTracer::init().map_err(|e| Error::Telemetry(e.to_string()))?;
    set_global_default(subscriber).map_err(|e| Error::Telemetry(e.to_string()))?;
    Ok(())
}

/// Log filter for a `-v` count: warnings by default, then info and debug.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_output(format: LogFormat) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = get_subscriber("test".into(), "warn".into(), format, move || sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::warn!("fsqueue: warning: shown");
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_plain_output_is_bare_message() {
        assert_eq!(captured_output(LogFormat::Plain), "fsqueue: warning: shown\n");
    }

    #[test]
    fn test_json_output() {
        let out = captured_output(LogFormat::Json);
        assert!(out.contains("\"msg\":\"fsqueue: warning: shown\""));
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(3), "debug");
    }
}
