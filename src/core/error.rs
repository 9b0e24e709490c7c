//! Engine error taxonomy.
//!
//! Every fallible engine call reports one of four kinds of failure:
//!
//! - `InvalidConfig`: construction-time, caller must fix parameters
//! - `InvalidMove`: rejected transition, state left unchanged
//! - `IndexOutOfRange`: bad player or card index
//! - `Deserialization`: corrupt or version-mismatched bytes

/// Errors reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HanabiError {
    /// A configuration bound was violated.
    InvalidConfig(String),

    /// A move or chance event was rejected. The state is unchanged.
    InvalidMove(String),

    /// A player or card index was outside its valid range.
    IndexOutOfRange {
        /// What was being indexed ("player", "state", ...).
        what: &'static str,
        /// The offending index.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },

    /// Input bytes could not be decoded into a valid value.
    Deserialization(String),
}

impl HanabiError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn invalid_move(msg: impl Into<String>) -> Self {
        Self::InvalidMove(msg.into())
    }

    pub(crate) fn deserialization(msg: impl Into<String>) -> Self {
        Self::Deserialization(msg.into())
    }

    /// Whether retrying with a different move can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidMove(_))
    }
}

impl std::fmt::Display for HanabiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(s) => write!(f, "invalid config: {}", s),
            Self::InvalidMove(s) => write!(f, "invalid move: {}", s),
            Self::IndexOutOfRange { what, index, len } => {
                write!(f, "{} index {} out of range (0..{})", what, index, len)
            }
            Self::Deserialization(s) => write!(f, "deserialization failed: {}", s),
        }
    }
}

impl std::error::Error for HanabiError {}

impl From<bincode::Error> for HanabiError {
    fn from(err: bincode::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, HanabiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = HanabiError::IndexOutOfRange { what: "player", index: 7, len: 3 };
        assert_eq!(err.to_string(), "player index 7 out of range (0..3)");

        let err = HanabiError::invalid_move("no hint tokens");
        assert_eq!(err.to_string(), "invalid move: no hint tokens");
    }

    #[test]
    fn test_retryable() {
        assert!(HanabiError::invalid_move("x").is_retryable());
        assert!(!HanabiError::invalid_config("x").is_retryable());
        assert!(!HanabiError::deserialization("x").is_retryable());
    }
}
