//! Configuration loading errors.

/// Error loading a configuration file
#[derive(Clone, Debug)]
pub enum ConfigLoadError {
    /// File could not be read
    Io(String),
    /// YAML could not be parsed or has invalid values
    Parse(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigLoadError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigLoadError {}
