use std::borrow::Cow;

use html_escape::decode_html_entities;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended to truncated summaries
pub const ELLIPSIS: &str = "…";
/// Display width of the ellipsis (U+2026 occupies a single column)
const ELLIPSIS_WIDTH: usize = 1;

/// Longest character reference we treat as a single unit (`&CounterClockwiseContourIntegral;`)
const MAX_ENTITY_LEN: usize = 33;

/// Calculates the display width of a plain string in terminal columns.
///
/// Handles Unicode correctly, accounting for:
/// - CJK characters (typically 2 columns wide)
/// - Emoji (typically 2 columns wide)
/// - Zero-width characters (combining marks, etc.)
/// - Standard ASCII (1 column each)
///
/// # Examples
///
/// ```
/// use webring::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("你好"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Calculates the display width of escaped markup.
///
/// Character references such as `&amp;` count as the width of the character
/// they encode rather than the width of their source text, so the result is
/// the width a reader sees once the markup is rendered.
///
/// ```
/// use webring::util::markup_width;
///
/// assert_eq!(markup_width("Fish &amp; Chips"), 12);
/// ```
pub fn markup_width(s: &str) -> usize {
    MarkupUnits::new(s).map(|unit| unit.width).sum()
}

/// Truncates escaped markup to fit within a maximum display width.
///
/// If truncation is necessary, the longest prefix that leaves room for the
/// ellipsis is kept and "…" is appended; the ellipsis counts toward
/// `max_width`. Widths are measured with [`markup_width`] semantics, and a
/// character reference is never split.
///
/// # Returns
///
/// A `Cow<str>` that fits within `max_width` columns:
/// - If the string fits, returns `Cow::Borrowed(s)` unchanged (no ellipsis)
/// - If `max_width` is narrower than the ellipsis itself, returns `""`
/// - Otherwise returns `Cow::Owned` with truncated text and "…" appended
///
/// # Examples
///
/// ```
/// use webring::util::truncate_markup;
///
/// assert_eq!(truncate_markup("Short", 10), "Short");
/// assert_eq!(truncate_markup("Hello World", 6), "Hello…");
/// assert_eq!(truncate_markup("你好世界", 6), "你好…");
/// assert_eq!(truncate_markup("A &amp; B &amp; C", 6), "A &amp; B…");
/// ```
pub fn truncate_markup(s: &str, max_width: usize) -> Cow<'_, str> {
    if markup_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    // Edge case: not even the ellipsis fits
    if max_width < ELLIPSIS_WIDTH {
        return Cow::Borrowed("");
    }
    let target_width = max_width - ELLIPSIS_WIDTH;

    let mut current_width = 0;
    let mut cut = 0;
    for unit in MarkupUnits::new(s) {
        if current_width + unit.width > target_width {
            break;
        }
        current_width += unit.width;
        cut = unit.end;
    }

    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

/// Strip ASCII control characters that have no business in an HTML document.
///
/// Removes 0x00-0x08, 0x0B-0x0C, 0x0E-0x1F and 0x7F. Tab, newline and
/// carriage return are preserved.
///
/// Returns `Cow::Borrowed` when the input contains no control characters (common case).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_stripped(c: char) -> bool {
        c == '\x7f' || (c < '\x20' && !matches!(c, '\t' | '\n' | '\r'))
    }

    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_stripped(c)).collect())
}

/// One indivisible piece of markup: a single character or a whole character reference.
struct MarkupUnit {
    /// Byte offset just past the unit
    end: usize,
    width: usize,
}

struct MarkupUnits<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> MarkupUnits<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }
}

impl Iterator for MarkupUnits<'_> {
    type Item = MarkupUnit;

    fn next(&mut self) -> Option<MarkupUnit> {
        let rest = self.s.get(self.pos..)?;
        let c = rest.chars().next()?;

        if c == '&' {
            if let Some(len) = entity_len(rest) {
                let decoded = decode_html_entities(&rest[..len]);
                self.pos += len;
                return Some(MarkupUnit {
                    end: self.pos,
                    width: display_width(&decoded),
                });
            }
        }

        self.pos += c.len_utf8();
        Some(MarkupUnit {
            end: self.pos,
            width: UnicodeWidthChar::width(c).unwrap_or(0),
        })
    }
}

/// Byte length of the character reference at the start of `s`, if there is one.
///
/// Recognizes `&name;`, `&#123;` and `&#x1F;` shapes; anything else is a bare ampersand.
fn entity_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes.first(), Some(&b'&'));

    for (i, &b) in bytes.iter().enumerate().skip(1).take(MAX_ENTITY_LEN) {
        match b {
            b';' if i > 1 => return Some(i + 1),
            b'#' if i == 1 => {}
            b if b.is_ascii_alphanumeric() => {}
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_truncation() {
        // "Hello World" = 11 cols, max 6 -> target 5, "Hello" -> "Hello…"
        assert_eq!(truncate_markup("Hello World", 6), "Hello…");
        assert_eq!(truncate_markup("Short", 10), "Short");
    }

    #[test]
    fn test_cjk_truncation() {
        // "你好世界" = 8 cols, max 7 -> target 6, "你好世" = 6 cols
        assert_eq!(truncate_markup("你好世界", 7), "你好世…");
        // max 6 -> target 5, "你好" = 4 cols, "世" would overflow
        assert_eq!(truncate_markup("你好世界", 6), "你好…");
        assert_eq!(truncate_markup("你好", 10), "你好");
    }

    #[test]
    fn test_emoji_truncation() {
        // "Hi 🎉 there" = 3 + 2 + 6 = 11 cols, max 6 -> target 5, "Hi 🎉" = 5
        assert_eq!(truncate_markup("Hi 🎉 there", 6), "Hi 🎉…");
    }

    #[test]
    fn test_exact_fit_is_unchanged() {
        assert_eq!(truncate_markup("12345", 5), "12345");
        assert!(matches!(truncate_markup("12345", 5), Cow::Borrowed(_)));
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_markup("Test", 0), "");
        assert_eq!(truncate_markup("", 0), "");
        assert_eq!(truncate_markup("Test", 1), "…");
        assert_eq!(truncate_markup("Test", 2), "T…");
    }

    #[test]
    fn test_entity_counts_as_one_column() {
        assert_eq!(markup_width("&amp;"), 1);
        assert_eq!(markup_width("a &lt; b"), 5);
        assert_eq!(markup_width("&#20320;"), 2);
        assert_eq!(markup_width("&#x4F60;"), 2);
    }

    #[test]
    fn test_bare_ampersand_is_one_column() {
        assert_eq!(markup_width("Tom & Jerry"), 11);
        assert_eq!(markup_width("&;"), 2);
        assert_eq!(markup_width("&"), 1);
    }

    #[test]
    fn test_entity_never_split() {
        // "ab&amp;cd" displays as "ab&cd" (5 cols). Max 4 -> target 3 -> "ab&amp;"
        assert_eq!(truncate_markup("ab&amp;cd", 4), "ab&amp;…");
        // Max 3 -> target 2 -> "ab", the reference is dropped whole
        assert_eq!(truncate_markup("ab&amp;cd", 3), "ab…");
    }

    #[test]
    fn test_no_panic_on_utf8_boundaries() {
        let result = truncate_markup("日本語テスト", 6);
        assert_eq!(result, "日本…");

        let mixed = "Hello世界";
        assert_eq!(truncate_markup(mixed, 8), "Hello世…");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "line1\nline2\ttabbed\r\nwindows";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_control_chars_removes_controls() {
        let input = "he\x00ll\x07o\x08 w\x0bor\x0cld\x1b\x7f!";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "hello world!");
    }

    proptest! {
        #[test]
        fn prop_truncated_width_within_limit(s in "[a-z &;#0-9你好🎉]{0,80}", w in 0usize..60) {
            let out = truncate_markup(&s, w);
            prop_assert!(markup_width(&out) <= w);
        }

        #[test]
        fn prop_fitting_text_is_unchanged(s in "[a-z &;你好]{0,40}") {
            let w = markup_width(&s);
            prop_assert_eq!(truncate_markup(&s, w), s.as_str());
        }

        #[test]
        fn prop_cut_text_ends_with_ellipsis(s in "[a-z 你好]{10,80}", w in 1usize..10) {
            let out = truncate_markup(&s, w);
            prop_assert!(out.ends_with(ELLIPSIS));
        }
    }
}
