//! Char filters that normalise raw text before tokenization.
//!
//! - [`strip_accents::StripAccentsCharFilter`] - removes combining accent marks
//! - [`lowercase::LowercaseCharFilter`] - Unicode lowercasing
//!
//! ```
//! use sentiscope::analysis::char_filter::CharFilter;
//! use sentiscope::analysis::char_filter::strip_accents::StripAccentsCharFilter;
//!
//! let filter = StripAccentsCharFilter::new();
//! assert_eq!(filter.filter("café"), "cafe");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod strip_accents;

pub use lowercase::LowercaseCharFilter;
pub use strip_accents::StripAccentsCharFilter;
