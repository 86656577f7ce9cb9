use crate::foundation::core::Rgba8;
use crate::foundation::error::{CardError, CardResult};

/// True when `s` is `#` followed by exactly 3 or 6 hex digits.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse `#rgb` or `#rrggbb` (case-insensitive) into an opaque color.
pub fn parse_hex_color(s: &str) -> CardResult<Rgba8> {
    if !is_hex_color(s) {
        return Err(CardError::config(format!(
            "hex color must be #RGB or #RRGGBB, got \"{s}\""
        )));
    }
    let digits = &s[1..];

    fn hex_byte(pair: &str) -> CardResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| CardError::config(format!("invalid hex byte \"{pair}\"")))
    }

    let (r, g, b) = if digits.len() == 3 {
        let nibble = |i: usize| hex_byte(&digits[i..i + 1]).map(|v| v * 17);
        (nibble(0)?, nibble(1)?, nibble(2)?)
    } else {
        (
            hex_byte(&digits[0..2])?,
            hex_byte(&digits[2..4])?,
            hex_byte(&digits[4..6])?,
        )
    };

    Ok(Rgba8::opaque(r, g, b))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
