use std::borrow::Cow;

use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthChar;

const ELLIPSIS: &str = "...";

/// Display columns allowed for the first step in a compact recipe card.
pub const STEP_PREVIEW_WIDTH: usize = 50;

/// Ingredients shown in a compact recipe card before " ..." is appended.
pub const INGREDIENT_PREVIEW_COUNT: usize = 2;

/// Truncates `s` to at most `max_width` display columns, then appends "...".
///
/// Unlike a fixed-width layout cut, the ellipsis is added *after* the kept
/// prefix, matching the card preview format (`"<first 50 columns>..."`).
/// Wide characters (CJK, emoji) count as two columns and are never split.
///
/// Returns `Cow::Borrowed` when the string already fits.
///
/// ```
/// use dapur::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Rebus air", 20), "Rebus air");
/// assert_eq!(truncate_to_width("Rebus air hingga mendidih", 9), "Rebus air...");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > max_width {
            return Cow::Owned(format!("{}{}", &s[..idx], ELLIPSIS));
        }
        width += char_width;
    }
    Cow::Borrowed(s)
}

/// One-line ingredient summary: the first two joined by ", ", with " ..."
/// when more follow. `None` when the recipe lists no ingredients.
pub fn ingredients_preview(ingredients: &[String]) -> Option<String> {
    if ingredients.is_empty() {
        return None;
    }
    let shown = ingredients
        .iter()
        .take(INGREDIENT_PREVIEW_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if ingredients.len() > INGREDIENT_PREVIEW_COUNT {
        Some(format!("{} ...", shown))
    } else {
        Some(shown)
    }
}

/// First step, truncated to [`STEP_PREVIEW_WIDTH`] columns.
pub fn step_preview(steps: &[String]) -> Option<Cow<'_, str>> {
    steps
        .first()
        .map(|step| truncate_to_width(step, STEP_PREVIEW_WIDTH))
}

/// Short card date, e.g. "1 May 2024".
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Strips terminal control characters (C0 controls except tab/newline/CR,
/// DEL, and ESC) from server-provided text before it is printed.
///
/// ESC is dropped on its own, which leaves the printable remainder of an
/// escape sequence inert.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_control = |c: char| {
        c == '\u{1b}' || c == '\u{7f}' || (c < ' ' && c != '\t' && c != '\n' && c != '\r')
    };
    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_control(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_fits_returns_borrowed() {
        let result = truncate_to_width("Short", 10);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Short");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_truncate_appends_ellipsis_after_prefix() {
        assert_eq!(truncate_to_width("Hello World", 5), "Hello...");
        assert_eq!(truncate_to_width("Hello", 0), "...");
    }

    #[test]
    fn test_truncate_wide_chars_not_split() {
        // Each CJK character is two columns
        assert_eq!(truncate_to_width("你好世界", 5), "你好...");
        assert_eq!(truncate_to_width("你好世界", 4), "你好...");
    }

    #[test]
    fn test_ingredients_preview() {
        let one = vec!["garam".to_string()];
        assert_eq!(ingredients_preview(&one).as_deref(), Some("garam"));

        let two = vec!["garam".to_string(), "gula".to_string()];
        assert_eq!(ingredients_preview(&two).as_deref(), Some("garam, gula"));

        let three = vec!["garam".to_string(), "gula".to_string(), "air".to_string()];
        assert_eq!(
            ingredients_preview(&three).as_deref(),
            Some("garam, gula ...")
        );

        assert!(ingredients_preview(&[]).is_none());
    }

    #[test]
    fn test_step_preview_truncates_at_fifty_columns() {
        let long = "a".repeat(60);
        let steps = vec![long, "second".to_string()];
        let preview = step_preview(&steps).unwrap();
        assert_eq!(preview.len(), STEP_PREVIEW_WIDTH + ELLIPSIS.len());
        assert!(preview.ends_with("..."));

        let short = vec!["Cuci beras".to_string()];
        assert_eq!(step_preview(&short).unwrap(), "Cuci beras");
        assert!(step_preview(&[]).is_none());
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(format_date(&date), "1 May 2024");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Nasi goreng\tspesial\n";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_removes_escape_and_controls() {
        assert_eq!(strip_control_chars("\x1b[31mMerah\x1b[0m"), "[31mMerah[0m");
        assert_eq!(strip_control_chars("a\x00b\x07c\x7fd"), "abcd");
    }
}
