//! Nesting caps for pathological input.
//!
//! Both parsers recurse; past these depths the remaining input is taken
//! literally instead of descending further.

/// Maximum nesting depth for inline spans (bold inside italic inside link...)
pub const MAX_INLINE_NESTING: usize = 32;

/// Maximum nesting depth for indented lists
pub const MAX_LIST_NESTING: usize = 32;
