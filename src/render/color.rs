//! Hex color parsing for element fills.

use image::Rgba;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, String> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid hex color: {}", hex));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|e| e.to_string());

    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let r = channel(&digits[0..2])?;
            let g = channel(&digits[2..4])?;
            let b = channel(&digits[4..6])?;
            let a = if digits.len() == 8 {
                channel(&digits[6..8])?
            } else {
                255
            };
            Ok(Rgba([r, g, b, a]))
        }
        _ => Err(format!("Invalid hex color: {}", hex)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digits() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("000000").unwrap(), BLACK);
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(parse_hex_color("#fff").unwrap(), WHITE);
        assert_eq!(parse_hex_color("#f00").unwrap(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_parse_with_alpha() {
        assert_eq!(parse_hex_color("#0000ff80").unwrap(), Rgba([0, 0, 255, 128]));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_hex_color("red").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
        assert!(parse_hex_color("#ééé").is_err());
        assert!(parse_hex_color("#+F+F+F").is_err());
        assert!(parse_hex_color("+f0").is_err());
        assert!(parse_hex_color("#ff 0 0").is_err());
    }
}
