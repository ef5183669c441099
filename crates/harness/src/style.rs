//! ANSI styling for report text

/// A named terminal style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BackBlack,
    BackRed,
    BackGreen,
    BackYellow,
    BackBlue,
    BackMagenta,
    BackCyan,
    BackWhite,
    Bold,
    Underline,
    None,
}

impl Style {
    pub fn escape(self) -> &'static str {
        match self {
            Style::Black => "\x1B[30m",
            Style::Red => "\x1B[31m",
            Style::Green => "\x1B[32m",
            Style::Yellow => "\x1B[33m",
            Style::Blue => "\x1B[34m",
            Style::Magenta => "\x1B[35m",
            Style::Cyan => "\x1B[36m",
            Style::White => "\x1B[37m",
            Style::BackBlack => "\x1B[40m",
            Style::BackRed => "\x1B[41m",
            Style::BackGreen => "\x1B[42m",
            Style::BackYellow => "\x1B[43m",
            Style::BackBlue => "\x1B[44m",
            Style::BackMagenta => "\x1B[45m",
            Style::BackCyan => "\x1B[46m",
            Style::BackWhite => "\x1B[47m",
            Style::Bold => "\x1B[1m",
            Style::Underline => "\x1B[4m",
            Style::None => "\x1B[0m",
        }
    }
}

/// Wrap `text` in the given styles followed by a reset.
///
/// Styles are applied in order, each one prepended to the result of the
/// previous, so `paint("x", &[Style::Red, Style::Bold])` starts with the bold
/// escape.
pub fn paint(text: &str, styles: &[Style]) -> String {
    let mut out = String::with_capacity(text.len() + styles.len() * 5 + 4);
    for style in styles.iter().rev() {
        out.push_str(style.escape());
    }
    out.push_str(text);
    out.push_str(Style::None.escape());
    out
}

/// Remove ANSI escape sequences, leaving the plain text.
pub fn strip(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c2 in chars.by_ref() {
                if c2.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
