//! Log level threshold
//!
//! `logging.level` decides which diagnostic messages are written. Access log
//! lines and the startup banner are not affected.

use std::fmt;
use std::str::FromStr;

/// Message severity, most severe first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    #[default]
    Info,
}

impl Level {
    /// Whether a message at `message` severity passes this threshold
    pub fn allows(self, message: Self) -> bool {
        message <= self
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            // debug and trace have no messages of their own
            "info" | "debug" | "trace" => Ok(Self::Info),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("info".parse::<Level>(), Ok(Level::Info));
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("error".parse::<Level>(), Ok(Level::Error));
        assert_eq!("debug".parse::<Level>(), Ok(Level::Info));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_threshold() {
        assert!(Level::Info.allows(Level::Warn));
        assert!(Level::Warn.allows(Level::Warn));
        assert!(!Level::Warn.allows(Level::Info));
        assert!(!Level::Error.allows(Level::Warn));
        assert!(Level::Error.allows(Level::Error));
    }
}
