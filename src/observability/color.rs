//! Terminal color helpers for console output.

/// Which plane of the terminal cell a color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ground {
    Foreground,
    Background,
}

pub const RESET: &str = "\x1b[0m";
pub const DIM: &str = "\x1b[2m";

/// Convert an RGB hex triplet (`#rrggbb`, `rrggbb`, `#rgb`) into a 24-bit
/// ANSI escape sequence.
///
/// Malformed input yields an empty string so callers can concatenate the
/// result unconditionally.
pub fn hex_to_ansi(hex: &str, ground: Ground) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => {
            let plane = match ground {
                Ground::Foreground => 38,
                Ground::Background => 48,
            };
            format!("\x1b[{};2;{};{};{}m", plane, r, g, b)
        }
        None => String::new(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            // #abc is shorthand for #aabbcc
            let mut channels = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            let r = channels.next()??;
            let g = channels.next()??;
            let b = channels.next()??;
            Some((r, g, b))
        }
        _ => None,
    }
}
