// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CSS-style colour strings.
//!
//! Element colours are stored the way projects have always been saved
//! (`"#1976d2"`, `"transparent"`), and converted to RGBA only when drawing
//! or exporting.

/// Parse a colour string into straight (unmultiplied) RGBA.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `transparent` and a handful of
/// named colours. Returns `None` for anything else.
pub fn parse_color(value: &str) -> Option<[u8; 4]> {
    let value = value.trim();
    match value.to_ascii_lowercase().as_str() {
        "transparent" | "none" => return Some([0, 0, 0, 0]),
        "black" => return Some([0, 0, 0, 255]),
        "white" => return Some([255, 255, 255, 255]),
        "red" => return Some([255, 0, 0, 255]),
        "green" => return Some([0, 128, 0, 255]),
        "blue" => return Some([0, 0, 255, 255]),
        "yellow" => return Some([255, 255, 0, 255]),
        _ => {}
    }

    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some([rgb[0], rgb[1], rgb[2], 255])
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ]),
        8 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ]),
        _ => None,
    }
}

/// Parse with a fallback for unreadable values.
pub fn parse_color_or(value: &str, fallback: [u8; 4]) -> [u8; 4] {
    parse_color(value).unwrap_or(fallback)
}

/// Format RGBA back into the stored string form.
pub fn to_hex(rgba: [u8; 4]) -> String {
    let [r, g, b, a] = rgba;
    match a {
        0 => "transparent".to_string(),
        255 => format!("#{r:02x}{g:02x}{b:02x}"),
        _ => format!("#{r:02x}{g:02x}{b:02x}{a:02x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#1976d2"), Some([0x19, 0x76, 0xd2, 255]));
        assert_eq!(parse_color("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#00000080"), Some([0, 0, 0, 0x80]));
        assert_eq!(parse_color("  #FFFFFF "), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_parse_keywords_and_garbage() {
        assert_eq!(parse_color("transparent"), Some([0, 0, 0, 0]));
        assert_eq!(parse_color("White"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color("50%"), None);
        assert_eq!(parse_color_or("bogus", [1, 2, 3, 4]), [1, 2, 3, 4]);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex([0x19, 0x76, 0xd2, 255]), "#1976d2");
        assert_eq!(to_hex([0, 0, 0, 0]), "transparent");
        assert_eq!(to_hex([255, 0, 0, 128]), "#ff000080");
    }
}
