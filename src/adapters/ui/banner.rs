//! ASCII banner with a blue gradient (TG-DIGEST).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Accent blue (#0078d4).
const ACCENT_BLUE: (u8, u8, u8) = (0x00, 0x78, 0xd4);
/// Light blue (#4da6ff).
const LIGHT_BLUE: (u8, u8, u8) = (0x4d, 0xa6, 0xff);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Banner lines, or the plain name if the figlet font cannot be loaded.
fn banner_lines() -> Vec<String> {
    let font = FIGfont::standard().ok();
    font.as_ref()
        .and_then(|font| font.convert("TG-DIGEST"))
        .map(|figure| figure.to_string().lines().map(String::from).collect())
        .unwrap_or_else(|| vec!["TG-DIGEST".to_string()])
}

/// Prints "TG-DIGEST" with a gradient, then version and tagline.
pub fn print_welcome() {
    let mut out = stdout();
    let lines = banner_lines();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(ACCENT_BLUE, LIGHT_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: LIGHT_BLUE.0,
        g: LIGHT_BLUE.1,
        b: LIGHT_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Telegram AI Summarizer\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp_rgb(ACCENT_BLUE, LIGHT_BLUE, 0.0), ACCENT_BLUE);
        assert_eq!(lerp_rgb(ACCENT_BLUE, LIGHT_BLUE, 1.0), LIGHT_BLUE);
    }

    #[test]
    fn banner_is_not_empty() {
        assert!(!banner_lines().is_empty());
    }
}
