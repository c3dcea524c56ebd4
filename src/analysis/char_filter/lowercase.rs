use super::CharFilter;

/// Lowercases the whole input before it reaches the tokenizer.
///
/// Lowercasing ahead of tokenization (rather than per token) keeps the
/// word-boundary decisions of the tokenizer case-independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    pub fn new() -> Self {
        Self
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            input.to_ascii_lowercase()
        } else {
            input.to_lowercase()
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        let filter = LowercaseCharFilter::new();
        assert_eq!(filter.filter("Great VIDEO"), "great video");
        assert_eq!(filter.filter("ÉCOLE"), "école");
    }
}
