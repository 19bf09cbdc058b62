//! Terminal capability detection and styling

use std::sync::OnceLock;

use owo_colors::{OwoColorize, colors::css};

/// Whether stdout supports colour. Detected once per process.
fn supports_color() -> bool {
    static SUPPORTED: OnceLock<bool> = OnceLock::new();
    *SUPPORTED.get_or_init(|| supports_color::on(supports_color::Stream::Stdout).is_some())
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Success,
    Warning,
    Label,
    Dim,
}

fn paint(text: &str, style: Style) -> String {
    if !supports_color() {
        return text.to_string();
    }
    match style {
        Style::Success => text.fg::<css::Green>().to_string(),
        Style::Warning => text.fg::<css::Orange>().to_string(),
        Style::Label => text.fg::<css::LightBlue>().to_string(),
        Style::Dim => text.dimmed().to_string(),
    }
}

/// Extension trait for styling output
pub trait Colorize: AsRef<str> {
    /// Nothing to report (green)
    fn success(&self) -> String {
        paint(self.as_ref(), Style::Success)
    }

    /// Needs attention (amber)
    fn warning(&self) -> String {
        paint(self.as_ref(), Style::Warning)
    }

    /// Team labels (blue)
    fn info(&self) -> String {
        paint(self.as_ref(), Style::Label)
    }

    /// Secondary detail
    fn dim(&self) -> String {
        paint(self.as_ref(), Style::Dim)
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {}
