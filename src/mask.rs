use std::fmt;

/// Entered characters: whitespace-free and never longer than the cell count
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinText {
    chars: Vec<char>,
}

impl PinText {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character shown in cell `index`, if any
    pub fn char_at(&self, index: usize) -> Option<char> {
        if index < self.chars.len() {
            Some(self.chars[index])
        } else {
            None
        }
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    pub(crate) fn truncate(&mut self, len: usize) -> bool {
        let shortened = self.chars.len() > len;
        self.chars.truncate(len);
        shortened
    }
}

impl fmt::Display for PinText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Caps editable text at a maximum number of characters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthFilter {
    pub max: usize,
}

impl LengthFilter {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn apply<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max) {
            Some((cut, _)) => &text[..cut],
            None => text,
        }
    }
}

/// Length filter followed by the whitespace normalizer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputMask {
    filter: LengthFilter,
}

impl InputMask {
    pub fn new(cell_count: usize) -> Self {
        Self { filter: LengthFilter::new(cell_count) }
    }

    pub fn filter(&self) -> LengthFilter {
        self.filter
    }

    /// Replace the registered filter; there is only ever one
    pub fn set_max_length(&mut self, max: usize) {
        self.filter = LengthFilter::new(max);
    }

    /// Turn the host's full current text into PIN text
    pub fn normalize(&self, raw: &str) -> PinText {
        let bounded = self.filter.apply(raw);
        PinText { chars: bounded.chars().filter(|c| !c.is_whitespace()).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_removed() {
        let mask = InputMask::new(16);
        assert_eq!(mask.normalize("12 3").to_string(), "123");
        assert_eq!(mask.normalize(" 4\t5\n6\u{a0}7 ").to_string(), "4567");
        assert_eq!(mask.normalize("   ").to_string(), "");
    }

    #[test]
    fn test_filter_runs_before_normalizing() {
        let mask = InputMask::new(4);
        // The raw text is capped first, so the trailing digits never reach the normalizer
        assert_eq!(mask.normalize("12 345").to_string(), "123");
        assert_eq!(mask.normalize("123456").to_string(), "1234");
    }

    #[test]
    fn test_length_never_exceeds_cell_count() {
        for count in 1..8 {
            let mask = InputMask::new(count);
            for raw in ["", "1", "1 2 3 4 5 6 7 8 9", "abcdefghijkl", "  99  99  99"] {
                assert!(mask.normalize(raw).len() <= count, "{raw:?} with {count} cells");
            }
        }
    }

    #[test]
    fn test_filter_counts_characters_not_bytes() {
        let filter = LengthFilter::new(2);
        assert_eq!(filter.apply("äöü"), "äö");
        assert_eq!(filter.apply("a"), "a");
    }

    #[test]
    fn test_char_at_is_bounded() {
        let text = InputMask::new(4).normalize("42");
        assert_eq!(text.char_at(0), Some('4'));
        assert_eq!(text.char_at(1), Some('2'));
        assert_eq!(text.char_at(2), None);
        assert_eq!(text.char_at(usize::MAX), None);
    }

    #[test]
    fn test_set_max_length_replaces_filter() {
        let mut mask = InputMask::new(4);
        mask.set_max_length(2);
        assert_eq!(mask.filter(), LengthFilter::new(2));
        assert_eq!(mask.normalize("9876").to_string(), "98");
    }
}
