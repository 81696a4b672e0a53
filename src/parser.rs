//! Free-text field normalizers.
//!
//! Both functions are total: a text without a recognizable number yields
//! `None`, which callers treat as "unknown" rather than zero.

use regex::Regex;
use std::sync::LazyLock;

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9,]+)万円").unwrap());

// Renderers that flatten <sup>2</sup> leave a literal "m2" behind
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9.]+)(?:㎡|m2)").unwrap());

// Full-width digits and separators are folded to ASCII so `f64` parsing accepts them
fn fold_full_width(c: char) -> char {
    match c {
        '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
        '，' => ',',
        '．' => '.',
        'ｍ' => 'm',
        _ => c,
    }
}

fn strip_spaces(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{3000}' | '\t'))
        .map(fold_full_width)
        .collect()
}

/// Extracts a price in 万円, e.g. `"1,980万円"` → `1980.0`.
pub fn parse_price(text: &str) -> Option<f64> {
    let compact = strip_spaces(text);
    let captures = PRICE_RE.captures(&compact)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok()
}

/// Extracts a floor or lot area in ㎡, e.g. `"60.88m2（壁芯）"` → `60.88`.
pub fn parse_area(text: &str) -> Option<f64> {
    let compact = strip_spaces(text);
    let captures = AREA_RE.captures(&compact)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|area| area.is_finite() && *area >= 0.0)
}
