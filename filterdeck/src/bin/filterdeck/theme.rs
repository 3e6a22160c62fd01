use colored::Color;

/// Terminal palette shared by status lines, tables and `--help`.
pub struct Palette {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub heading: Color,
    pub muted: Color,
    pub command: Color,
    pub key: Color,
    pub value: Color,
}

pub const PALETTE: Palette = Palette {
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    heading: Color::Cyan,
    muted: Color::BrightBlack,
    command: Color::Magenta,
    key: Color::BrightCyan,
    value: Color::White,
};

pub const ARROW: &str = "→";
pub const FILE: &str = "📄";

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    /// Only shown with `--verbose`.
    Detail,
}

impl Tone {
    pub const fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Error => "✗",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
            Tone::Detail => ARROW,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Tone::Success => PALETTE.success,
            Tone::Error => PALETTE.error,
            Tone::Warning => PALETTE.warning,
            Tone::Info => PALETTE.info,
            Tone::Detail => PALETTE.muted,
        }
    }

    /// Errors and verbose detail go to stderr so piped output stays clean.
    pub const fn to_stderr(self) -> bool {
        matches!(self, Tone::Error | Tone::Detail)
    }
}
