//! Error types for the scroll engine.
//!
//! There is exactly one runtime failure kind the engine reports to callers:
//! the load callback failed ([`LoadError`]). [`HostError`] covers platform
//! resources that could not be created while attaching a detector,
//! [`ConfigError`] covers invalid configuration, and [`EngineError`] joins the
//! two for operations that can hit either.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// Normalized failure raised by a load callback.
#[derive(Clone)]
pub struct LoadError {
    message: String,
    source: Option<Rc<dyn Error + 'static>>,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an error value, keeping it as the source.
    pub fn from_error<E: Error + 'static>(error: E) -> Self {
        Self {
            message: error.to_string(),
            source: Some(Rc::new(error)),
        }
    }

    /// Wraps a failure value that is not an error type.
    pub fn from_value<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::new(format!("load callback failed with non-error value: {value:?}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadError")
            .field("message", &self.message)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

impl PartialEq for LoadError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<Box<dyn Error + 'static>> for LoadError {
    fn from(error: Box<dyn Error + 'static>) -> Self {
        Self {
            message: error.to_string(),
            source: Some(Rc::from(error)),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        Self::from_error(error)
    }
}

impl From<std::convert::Infallible> for LoadError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// A platform resource needed by a detector could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host error: {}", self.message)
    }
}

impl Error for HostError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidThreshold(f64),
    InvalidMargin { margin: String, reason: &'static str },
    UnknownAxis(String),
    UnknownState(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidThreshold(value) => {
                write!(f, "threshold must be a finite non-negative number, got {value}")
            }
            ConfigError::InvalidMargin { margin, reason } => {
                write!(f, "invalid margin {margin:?}: {reason}")
            }
            ConfigError::UnknownAxis(name) => write!(f, "unknown scroll axis {name:?}"),
            ConfigError::UnknownState(name) => write!(f, "unknown loading state {name:?}"),
        }
    }
}

impl Error for ConfigError {}

/// Failure of an operation that both validates configuration and attaches
/// platform resources.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Config(ConfigError),
    Host(HostError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(err) => err.fmt(f),
            EngineError::Host(err) => err.fmt(f),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            EngineError::Host(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<HostError> for EngineError {
    fn from(err: HostError) -> Self {
        EngineError::Host(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("request timed out")
        }
    }

    impl Error for Timeout {}

    #[test]
    fn test_from_error_keeps_source() {
        let error = LoadError::from_error(Timeout);
        assert_eq!(error.message(), "request timed out");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_from_value_wraps_with_description() {
        let error = LoadError::from_value(&404);
        assert_eq!(
            error.message(),
            "load callback failed with non-error value: 404"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_string_conversions() {
        let error: LoadError = "offline".into();
        assert_eq!(error.to_string(), "offline");
        let error: LoadError = String::from("offline").into();
        assert_eq!(error, LoadError::new("offline"));
    }

    #[test]
    fn test_boxed_error_conversion() {
        let boxed: Box<dyn Error> = Box::new(Timeout);
        let error = LoadError::from(boxed);
        assert_eq!(error.message(), "request timed out");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::InvalidMargin {
            margin: "10em".into(),
            reason: "lengths must be px or %",
        };
        assert_eq!(
            error.to_string(),
            "invalid margin \"10em\": lengths must be px or %"
        );
    }
}
