use crate::error::ConfigError;
use crate::graph::Position;
use crate::notify::{LogSink, NotificationSink};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;

/// Editor settings that shape how the graph names and places nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Node positions snap to multiples of this spacing. `0` disables snapping.
    pub grid_spacing: i32,
    /// Separator between operator name and counter in generated node names.
    pub name_separator: String,
    /// Default `env_logger` filter used by the command line tool.
    pub log_filter: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 10,
            name_separator: " ".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl GraphConfig {
    /// Parses a config from JSON. Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Loads a config from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.grid_spacing < 0 {
            return Err(ConfigError::Invalid {
                key: "grid_spacing".to_string(),
                message: format!("must not be negative, got {}", self.grid_spacing),
            });
        }
        if self.name_separator.chars().any(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid {
                key: "name_separator".to_string(),
                message: "must not contain digits".to_string(),
            });
        }
        Ok(())
    }

    /// Rounds a position to the nearest grid point.
    pub fn snap(&self, position: Position) -> Position {
        if self.grid_spacing <= 0 {
            return position;
        }
        let g = self.grid_spacing as f64;
        Position {
            x: ((position.x as f64 / g).round() * g) as i32,
            y: ((position.y as f64 / g).round() * g) as i32,
        }
    }
}

/// Everything a [`Graph`](crate::graph::Graph) needs from its surroundings.
///
/// Passed explicitly at construction; the graph holds no global state.
#[derive(Clone)]
pub struct GraphContext {
    pub sink: Arc<dyn NotificationSink>,
    pub config: GraphConfig,
}

impl GraphContext {
    pub fn new(sink: Arc<dyn NotificationSink>, config: GraphConfig) -> Self {
        Self { sink, config }
    }

    pub fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(sink, GraphConfig::default())
    }
}

impl Default for GraphContext {
    fn default() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }
}
