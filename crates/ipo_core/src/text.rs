/// Glyph the directory renders while a value is pending disclosure.
pub const PLACEHOLDER: &str = "[●]";

/// Collapses whitespace runs to a single space, drops placeholder glyphs and trims.
///
/// Absent or empty input yields an empty string.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    text.replace(PLACEHOLDER, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
