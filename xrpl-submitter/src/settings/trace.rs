use eyre::Result;
use serde::Deserialize;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
    Layer, Registry,
};

/// Logging level. A "higher level" means more will be logged.
#[derive(Default, Debug, Clone, Copy, Deserialize, PartialOrd, Ord, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Off
    Off = 0,
    /// Error
    Error = 1,
    /// Warn
    Warn = 2,
    /// Debug
    Debug = 3,
    /// Trace
    Trace = 5,
    /// Info
    #[serde(other)]
    #[default]
    Info = 4,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> LevelFilter {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
        }
    }
}

/// Output format of the stdout layer.
#[derive(Default, Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// Multi-line, human friendly
    Pretty,
    /// One JSON object per event
    Json,
    /// Single line, abbreviated
    Compact,
    /// Single line with all span context
    #[default]
    Full,
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TracingConfig {
    #[serde(default)]
    pub fmt: Style,
    #[serde(default)]
    pub level: Level,
}

impl TracingConfig {
    /// Attempt to instantiate and register a tracing subscriber setup from
    /// settings. Fails if a global subscriber is already installed.
    pub fn start_tracing(&self) -> Result<()> {
        let mut target_layer = Targets::new().with_default(self.level);
        if self.level < Level::Trace {
            // runtime internals only at trace level
            target_layer = target_layer.with_target("tokio", Level::Info);
            target_layer = target_layer.with_target("runtime", Level::Info);
        }
        let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match self.fmt {
            Style::Pretty => fmt::layer().pretty().boxed(),
            Style::Json => fmt::layer().json().boxed(),
            Style::Compact => fmt::layer().compact().boxed(),
            Style::Full => fmt::layer().boxed(),
        };

        let subscriber = Registry::default().with(fmt_layer).with(target_layer);
        subscriber.try_init()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_info() {
        let config: TracingConfig =
            serde_json::from_value(json!({"fmt": "compact", "level": "chatty"})).unwrap();
        assert_eq!(config.fmt, Style::Compact);
        assert_eq!(config.level, Level::Info);
        assert_eq!(LevelFilter::from(Level::Warn), LevelFilter::WARN);
    }
}
