//! Cell rendering: labels, formatters and preset styles

use chrono::{DateTime, Local, Utc};
use pinorama_types::{lookup, CssStyle, Formatter, Introspection};
use ratatui::style::palette::tailwind::{self, Palette};
use ratatui::style::{Color, Modifier, Style};
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Time zone used to render timestamps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

impl TimeZoneMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Local => Self::Utc,
            Self::Utc => Self::Local,
        }
    }
}

/// Render epoch milliseconds as a date and time
pub fn format_timestamp(millis: i64, tz: TimeZoneMode) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(match tz {
        TimeZoneMode::Utc => utc.format(TIMESTAMP_FORMAT).to_string(),
        TimeZoneMode::Local => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    })
}

/// Display text of a value: decoded label, then formatter, then the raw value
pub fn format_value(intro: &Introspection, property: &str, value: &Value, tz: TimeZoneMode) -> String {
    if let Some(label) = intro.value_label(property, value) {
        return label.to_string();
    }

    if intro.formatter(property) == Some(Formatter::Timestamp) {
        let millis = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.timestamp_millis()),
            _ => None,
        };
        if let Some(text) = millis.and_then(|ms| format_timestamp(ms, tz)) {
            return text;
        }
    }

    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace(['\n', '\r', '\t'], " "),
        other => other.to_string(),
    }
}

/// Text and style of a table cell
pub fn cell(intro: &Introspection, property: &str, record: &Value, tz: TimeZoneMode) -> (String, Style) {
    let value = lookup(record, property);
    let text = value
        .map(|v| format_value(intro, property, v, tz))
        .unwrap_or_default();
    let style = css_style(&intro.style(property, value));
    (text, style)
}

/// Map CSS declarations onto a terminal style
///
/// Understands `color`, `background-color`, `font-weight`, `font-style`,
/// `text-decoration` and `opacity` (below 1 renders dim).
pub fn css_style(css: &CssStyle) -> Style {
    let mut style = Style::default();

    for (property, value) in css {
        let value = value.trim();
        match property.as_str() {
            "color" => {
                if let Some(color) = parse_color(value) {
                    style = style.fg(color);
                }
            }
            "background-color" | "background" => {
                if let Some(color) = parse_color(value) {
                    style = style.bg(color);
                }
            }
            "font-weight" => {
                let bold = match value {
                    "bold" | "bolder" => true,
                    weight => weight.parse::<u16>().is_ok_and(|w| w >= 600),
                };
                if bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
            }
            "font-style" if value == "italic" => {
                style = style.add_modifier(Modifier::ITALIC);
            }
            "text-decoration" | "text-decoration-line" => {
                if value.contains("underline") {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                if value.contains("line-through") {
                    style = style.add_modifier(Modifier::CROSSED_OUT);
                }
            }
            "opacity" => {
                if value.parse::<f32>().is_ok_and(|o| o < 1.0) {
                    style = style.add_modifier(Modifier::DIM);
                }
            }
            _ => {}
        }
    }

    style
}

/// Parse a CSS color: `var(--color-red-500)`, `#rgb`, `#rrggbb` or a name
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();

    if let Some(inner) = value.strip_prefix("var(").and_then(|v| v.strip_suffix(')')) {
        let name = inner.trim().strip_prefix("--color-")?;
        let (hue, shade) = name.rsplit_once('-')?;
        return tailwind_color(hue, shade.parse().ok()?);
    }

    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return format!("#{}", expanded).parse().ok();
        }
        return value.parse().ok();
    }

    match value {
        "grey" => Some(Color::Gray),
        "orange" => tailwind_color("orange", 500),
        other => other.parse().ok(),
    }
}

fn tailwind_color(hue: &str, shade: u16) -> Option<Color> {
    let palette: &Palette = match hue {
        "slate" => &tailwind::SLATE,
        "gray" => &tailwind::GRAY,
        "zinc" => &tailwind::ZINC,
        "neutral" => &tailwind::NEUTRAL,
        "stone" => &tailwind::STONE,
        "red" => &tailwind::RED,
        "orange" => &tailwind::ORANGE,
        "amber" => &tailwind::AMBER,
        "yellow" => &tailwind::YELLOW,
        "lime" => &tailwind::LIME,
        "green" => &tailwind::GREEN,
        "emerald" => &tailwind::EMERALD,
        "teal" => &tailwind::TEAL,
        "cyan" => &tailwind::CYAN,
        "sky" => &tailwind::SKY,
        "blue" => &tailwind::BLUE,
        "indigo" => &tailwind::INDIGO,
        "violet" => &tailwind::VIOLET,
        "purple" => &tailwind::PURPLE,
        "fuchsia" => &tailwind::FUCHSIA,
        "pink" => &tailwind::PINK,
        "rose" => &tailwind::ROSE,
        _ => return None,
    };

    let color = match shade {
        50 => palette.c50,
        100 => palette.c100,
        200 => palette.c200,
        300 => palette.c300,
        400 => palette.c400,
        500 => palette.c500,
        600 => palette.c600,
        700 => palette.c700,
        800 => palette.c800,
        900 => palette.c900,
        950 => palette.c950,
        _ => return None,
    };
    Some(color)
}

/// Cut text to a display width, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
