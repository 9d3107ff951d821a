//! Tag pattern compilation and matching
//!
//! Compiled once per route at registration time; matched against a
//! concrete tag for every posted event.

use crate::error::{PatternError, Result};

/// Segment separator in patterns and tags
const SEPARATOR: char = '.';

/// Single-segment wildcard
const WILDCARD: &str = "*";

/// Multi-segment suffix wildcard
const DEEP_WILDCARD: &str = "**";

/// A compiled tag routing pattern
///
/// Construction validates the pattern shape (see [`TagPattern::parse`]);
/// a compiled pattern is immutable and matching it allocates only when a
/// wildcard captures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPattern {
    pattern: String,
}

/// The result of matching a pattern against a tag
///
/// `captured` holds the substring bound by the pattern's wildcard:
/// the last tag segment for `*`, the joined trailing segments for `**`
/// (empty when the tag ends exactly at the fixed prefix), and nothing for
/// a wildcard-free pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    captured: Option<String>,
}

impl Match {
    /// The substring bound by the wildcard, if the pattern had one
    #[inline]
    pub fn captured(&self) -> Option<&str> {
        self.captured.as_deref()
    }
}

impl TagPattern {
    /// Compile a pattern string
    ///
    /// # Errors
    ///
    /// Rejects empty patterns, patterns with empty segments (`"a..b"`),
    /// more than one wildcard segment (`"*.b.*"`), or a wildcard segment
    /// anywhere but the final position (`"a.*.c"`).
    pub fn parse(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let segments: Vec<&str> = pattern.split(SEPARATOR).collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(PatternError::empty_segment(pattern));
        }

        let wildcard_count = segments
            .iter()
            .filter(|s| **s == WILDCARD || **s == DEEP_WILDCARD)
            .count();
        if wildcard_count > 1 {
            return Err(PatternError::multiple_wildcards(pattern));
        }

        let non_trailing_wildcard = segments[..segments.len() - 1]
            .iter()
            .any(|s| *s == WILDCARD || *s == DEEP_WILDCARD);
        if non_trailing_wildcard {
            return Err(PatternError::wildcard_not_last(pattern));
        }

        Ok(Self { pattern })
    }

    /// Get the original pattern string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Match the pattern against a concrete tag
    ///
    /// Returns `None` if the tag does not match. On a match, the returned
    /// [`Match`] carries the wildcard capture as described in the crate
    /// docs.
    pub fn matches(&self, tag: &str) -> Option<Match> {
        // Exact tags short-circuit without splitting
        if tag == self.pattern {
            return Some(Match { captured: None });
        }

        let pattern_segments: Vec<&str> = self.pattern.split(SEPARATOR).collect();
        let tag_segments: Vec<&str> = tag.split(SEPARATOR).collect();

        if tag.is_empty() || tag_segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        let last = *pattern_segments.last()?;
        let prefix = &pattern_segments[..pattern_segments.len() - 1];

        match last {
            DEEP_WILDCARD => {
                // Fixed prefix must match positionally; the tag may stop at
                // the prefix (empty capture) or run arbitrarily deeper.
                if tag_segments.len() < prefix.len() {
                    return None;
                }
                if !segments_equal(prefix, &tag_segments[..prefix.len()]) {
                    return None;
                }
                let captured = tag_segments[prefix.len()..].join(".");
                Some(Match {
                    captured: Some(captured),
                })
            }
            WILDCARD => {
                // Exact arity: `*` binds exactly one segment
                if tag_segments.len() != pattern_segments.len() {
                    return None;
                }
                if !segments_equal(prefix, &tag_segments[..prefix.len()]) {
                    return None;
                }
                let captured = (*tag_segments.last()?).to_string();
                Some(Match {
                    captured: Some(captured),
                })
            }
            // No wildcard and the exact check already failed
            _ => None,
        }
    }
}

fn segments_equal(pattern: &[&str], tag: &[&str]) -> bool {
    pattern.iter().zip(tag.iter()).all(|(p, t)| p == t)
}

impl std::fmt::Display for TagPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}
