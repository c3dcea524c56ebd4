use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::CharFilter;

/// A char filter that strips accent marks.
///
/// Text is decomposed with NFKD and every combining mark is dropped, so
/// "crème brûlée" becomes "creme brulee". Characters without a
/// decomposition pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripAccentsCharFilter;

impl StripAccentsCharFilter {
    pub fn new() -> Self {
        Self
    }
}

impl CharFilter for StripAccentsCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            return input.to_string();
        }
        input.nfkd().filter(|c| !is_combining_mark(*c)).collect()
    }

    fn name(&self) -> &'static str {
        "strip_accents"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_composed_accents() {
        let filter = StripAccentsCharFilter::new();
        // "Amélie" where 'é' is composed (U+00E9)
        assert_eq!(filter.filter("Am\u{00e9}lie"), "Amelie");
        assert_eq!(filter.filter("crème brûlée"), "creme brulee");
    }

    #[test]
    fn test_strip_decomposed_accents() {
        let filter = StripAccentsCharFilter::new();
        // "Amélie" where 'é' is decomposed (U+0065 U+0301)
        assert_eq!(filter.filter("Am\u{0065}\u{0301}lie"), "Amelie");
    }

    #[test]
    fn test_compatibility_forms_are_folded() {
        let filter = StripAccentsCharFilter::new();
        // Fullwidth "Ａ" to halfwidth "A"
        assert_eq!(filter.filter("\u{ff21}"), "A");
        assert_eq!(filter.filter("plain ascii"), "plain ascii");
    }
}
