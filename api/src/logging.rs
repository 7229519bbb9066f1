//! env_logger setup driven by `LoggingConfig`

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Env};
use log::Record;
use otp_shared::{LogFormat, LoggingConfig};
use serde_json::{json, Value};

/// Install the global logger
pub fn init(config: &LoggingConfig) {
    builder(config).init();
}

pub fn builder(config: &LoggingConfig) -> Builder {
    let mut builder = Builder::from_env(Env::new().default_filter_or(config.filter()));

    match config.format {
        LogFormat::Json => {
            let timestamp = config.timestamp;
            builder.format(move |buf, record| {
                let stamp =
                    timestamp.then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
                writeln!(buf, "{}", json_line(record, stamp))
            });
        }
        LogFormat::Pretty => {
            builder.format_target(true);
        }
        LogFormat::Compact => {
            builder.format_target(false).format_module_path(false);
        }
    }

    if matches!(config.format, LogFormat::Pretty | LogFormat::Compact) {
        if config.timestamp {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }
    }

    builder
}

fn json_line(record: &Record<'_>, timestamp: Option<String>) -> Value {
    let mut line = json!({
        "level": record.level().as_str(),
        "target": record.target(),
        "message": record.args().to_string(),
    });
    if let Some(timestamp) = timestamp {
        line["timestamp"] = Value::String(timestamp);
    }
    line
}
