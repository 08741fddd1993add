//! Greyscale theme for codedock
//! A high-contrast monochrome palette with a few accents for status

use ratatui::style::{Color, Modifier, Style};

/// The greyscale color palette
pub struct Theme;

impl Theme {
    // ─────────────────────────────────────────────────────────────────────
    // Core greyscale palette - from brightest to darkest
    // ─────────────────────────────────────────────────────────────────────

    /// Pure white - maximum emphasis
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Near white - headers, selected items
    pub const GREY_50: Color = Color::Rgb(250, 250, 250);

    /// Bright grey - primary text
    pub const GREY_100: Color = Color::Rgb(220, 220, 220);

    /// Light grey - secondary text
    pub const GREY_200: Color = Color::Rgb(180, 180, 180);

    /// Medium grey - muted text
    pub const GREY_300: Color = Color::Rgb(140, 140, 140);

    /// Dark grey - inactive tabs
    pub const GREY_400: Color = Color::Rgb(100, 100, 100);

    /// Darker grey - borders, separators
    pub const GREY_500: Color = Color::Rgb(70, 70, 70);

    /// Very dark grey - subtle borders
    pub const GREY_600: Color = Color::Rgb(45, 45, 45);

    /// Dark grey - overlay backgrounds
    pub const GREY_700: Color = Color::Rgb(35, 35, 35);

    /// True black - deepest background
    pub const GREY_900: Color = Color::Rgb(18, 18, 18);

    pub const BG: Color = Self::GREY_900;

    // ─────────────────────────────────────────────────────────────────────
    // Accents
    // ─────────────────────────────────────────────────────────────────────

    pub const GREEN: Color = Color::Rgb(100, 200, 100);
    pub const RED: Color = Color::Rgb(200, 100, 100);
    pub const YELLOW: Color = Color::Rgb(220, 190, 90);

    pub const LOGO: &'static str = "c o d e d o c k";

    /// Spinner frames - braille pattern
    pub const SPINNER_BRAILLE: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

    pub const BULLET_FILLED: char = '●';
    pub const BULLET_EMPTY: char = '○';
    pub const ARROW_RIGHT: char = '▸';
    pub const CHECK_ON: &'static str = "[x]";
    pub const CHECK_OFF: &'static str = "[ ]";
    pub const DOT_SEPARATOR: char = '·';

    // ─────────────────────────────────────────────────────────────────────
    // Pre-built styles
    // ─────────────────────────────────────────────────────────────────────

    pub fn bg() -> Style {
        Style::default().bg(Self::GREY_900)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::GREY_100)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Self::GREY_300)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::GREY_400)
    }

    /// Selected/highlighted item
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::WHITE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::GREY_500)
    }

    /// Border of the focused panel
    pub fn border_active() -> Style {
        Style::default().fg(Self::GREY_300)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::GREY_50)
            .add_modifier(Modifier::BOLD)
    }

    /// Keybinding badge in the footer
    pub fn key() -> Style {
        Style::default().fg(Self::GREY_900).bg(Self::GREY_500)
    }
}
