//! Page labels: what the classifier read off a page, normalised for filenames.
//!
//! A label is either a printed page number or a semantic marker such as
//! `cover` or `copyright`. Numbers are zero-padded to [`PAGE_NUMBER_WIDTH`]
//! digits so that renamed files sort in page order in any file browser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum width of a numeric label.
pub const PAGE_NUMBER_WIDTH: usize = 4;

/// A detected page label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageLabel {
    /// Printed page number, already zero-padded (`"0007"`).
    Number(String),
    /// Any non-numeric label (`"cover"`, `"copyright"`, `"iv"`).
    Marker(String),
}

impl PageLabel {
    /// Normalise a raw label returned by the classifier.
    ///
    /// Returns `None` when nothing usable is left after trimming.
    ///
    /// All-ASCII-digit labels are zero-padded to at least four digits
    /// (`"7"` → `"0007"`). Longer numbers keep every digit (`"12345"` stays
    /// `"12345"`) and surplus leading zeros are dropped (`"00042"` →
    /// `"0042"`). Other labels are kept verbatim apart from characters that
    /// cannot appear in a filename, which become `-`.
    pub fn normalize(raw: &str) -> Option<PageLabel> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let significant = trimmed.trim_start_matches('0');
            let digits = if significant.is_empty() { "0" } else { significant };
            return Some(PageLabel::Number(format!(
                "{digits:0>width$}",
                width = PAGE_NUMBER_WIDTH
            )));
        }

        let cleaned: String = trimmed
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || c.is_control() {
                    '-'
                } else {
                    c
                }
            })
            .collect();
        Some(PageLabel::Marker(cleaned))
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageLabel::Number(s) | PageLabel::Marker(s) => s,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, PageLabel::Number(_))
    }
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_numbers() {
        assert_eq!(PageLabel::normalize("7"), Some(PageLabel::Number("0007".into())));
        assert_eq!(PageLabel::normalize("42"), Some(PageLabel::Number("0042".into())));
        assert_eq!(PageLabel::normalize("1234"), Some(PageLabel::Number("1234".into())));
    }

    #[test]
    fn long_numbers_are_not_truncated() {
        assert_eq!(
            PageLabel::normalize("12345"),
            Some(PageLabel::Number("12345".into()))
        );
        assert_eq!(
            PageLabel::normalize("00042"),
            Some(PageLabel::Number("0042".into()))
        );
        assert_eq!(PageLabel::normalize("0"), Some(PageLabel::Number("0000".into())));
    }

    #[test]
    fn markers_kept_verbatim() {
        assert_eq!(
            PageLabel::normalize("cover"),
            Some(PageLabel::Marker("cover".into()))
        );
        assert_eq!(
            PageLabel::normalize(" copyright \n"),
            Some(PageLabel::Marker("copyright".into()))
        );
        // Mixed digits and letters are not page numbers.
        assert_eq!(PageLabel::normalize("12a"), Some(PageLabel::Marker("12a".into())));
    }

    #[test]
    fn non_ascii_digits_are_markers() {
        // Full-width digits would make int() happy in some languages; here they stay text.
        let label = PageLabel::normalize("１２").expect("label");
        assert!(!label.is_number());
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(
            PageLabel::normalize("../etc/passwd"),
            Some(PageLabel::Marker("..-etc-passwd".into()))
        );
        assert_eq!(
            PageLabel::normalize("a\\b\tc"),
            Some(PageLabel::Marker("a-b-c".into()))
        );
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(PageLabel::normalize(""), None);
        assert_eq!(PageLabel::normalize("   "), None);
    }

    #[test]
    fn display_matches_inner() {
        assert_eq!(PageLabel::Number("0003".into()).to_string(), "0003");
    }
}
