use ratatui::{prelude::*, widgets::*};

use crate::constants::{APP_NAME, APP_VERSION, CREDIT_LINE};
use crate::models::Theme;

/// Colors for one theme
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub editing: Color,
    pub error: Color,
    pub success: Color,
}

/// Resolve the theme to concrete colors; `System` follows the terminal's theme
pub fn palette(theme: Theme, system: Theme) -> Palette {
    match theme.resolve(system) {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            muted: Color::Gray,
            accent: Color::Blue,
            editing: Color::Magenta,
            error: Color::Red,
            success: Color::Green,
        },
        _ => Palette {
            fg: Color::White,
            bg: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            editing: Color::Yellow,
            error: Color::LightRed,
            success: Color::LightGreen,
        },
    }
}

/// Bordered block in the palette's colors
pub fn card<'a>(title: impl Into<Line<'a>>, palette: &Palette, border: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .style(Style::default().fg(palette.fg).bg(palette.bg))
}

/// Human readable byte count
pub fn format_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Line/column of a byte offset in multi-line text, for cursor placement
pub fn cursor_line_col(text: &str, cursor: usize) -> (u16, u16) {
    let before = &text[..cursor.min(text.len())];
    let line = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|l| l.chars().count())
        .unwrap_or(0);
    (line as u16, col as u16)
}

/// Right side of the footer: credit, then name and version
pub fn footer_credit() -> String {
    format!("{} · {} v{} ", CREDIT_LINE, APP_NAME, APP_VERSION)
}
