//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors rejected at pattern compilation time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern string is empty
    #[error("tag pattern is empty")]
    Empty,

    /// A segment between separators is empty, e.g. `"a..b"`
    #[error("tag pattern '{pattern}' contains an empty segment")]
    EmptySegment {
        /// The offending pattern
        pattern: String,
    },

    /// More than one wildcard segment, e.g. `"*.b.*"`
    #[error("tag pattern '{pattern}' contains more than one wildcard segment")]
    MultipleWildcards {
        /// The offending pattern
        pattern: String,
    },

    /// A wildcard segment in non-final position, e.g. `"a.*.c"`
    #[error("tag pattern '{pattern}' has a wildcard segment that is not last")]
    WildcardNotLast {
        /// The offending pattern
        pattern: String,
    },
}

impl PatternError {
    /// Create an EmptySegment error
    #[inline]
    pub fn empty_segment(pattern: impl Into<String>) -> Self {
        Self::EmptySegment {
            pattern: pattern.into(),
        }
    }

    /// Create a MultipleWildcards error
    #[inline]
    pub fn multiple_wildcards(pattern: impl Into<String>) -> Self {
        Self::MultipleWildcards {
            pattern: pattern.into(),
        }
    }

    /// Create a WildcardNotLast error
    #[inline]
    pub fn wildcard_not_last(pattern: impl Into<String>) -> Self {
        Self::WildcardNotLast {
            pattern: pattern.into(),
        }
    }
}
