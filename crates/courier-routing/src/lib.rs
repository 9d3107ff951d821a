//! Courier - Routing
//!
//! Tag pattern matching: the routing primitive that decides which filters
//! and outputs see an event.
//!
//! # Design
//!
//! Patterns are compiled once at route-registration time and matched on
//! every posted event. Compilation validates the pattern shape up front so
//! the hot path never sees a malformed pattern.
//!
//! # Pattern language
//!
//! Patterns are dot-separated segments with at most one wildcard segment,
//! which must come last:
//!
//! - `"pv"` matches only the tag `"pv"`.
//! - `"pv.*"` matches tags with exactly one extra segment (`"pv.top"`),
//!   capturing that segment.
//! - `"pv.**"` matches `"pv"` and any deeper tag (`"pv.a.b"`), capturing
//!   the trailing segments (`""` for `"pv"` itself).
//!
//! # Example
//!
//! ```
//! use courier_routing::TagPattern;
//!
//! let pattern = TagPattern::parse("pv.*").unwrap();
//!
//! let m = pattern.matches("pv.top").unwrap();
//! assert_eq!(m.captured(), Some("top"));
//!
//! assert!(pattern.matches("pv.top.deeper").is_none());
//! ```

mod error;
mod pattern;

pub use error::{PatternError, Result};
pub use pattern::{Match, TagPattern};
