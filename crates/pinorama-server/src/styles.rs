use std::fmt::Write;

use pinorama_types::{CssStyle, Introspection};

/// Stylesheet for the introspection's styles
///
/// Each property gets a `.pinorama-col-<prop>` rule with its base style and
/// one `.pinorama-<prop>-<value>` rule per value-specific style.
pub fn stylesheet(introspection: &Introspection) -> String {
    let mut css = String::new();
    for (property, rule) in &introspection.styles {
        let property = class_name(property);
        push_rule(&mut css, &format!("pinorama-col-{}", property), rule.base());

        if let Some(values) = rule.values() {
            for (value, style) in values {
                push_rule(&mut css, &format!("pinorama-{}-{}", property, class_name(value)), style);
            }
        }
    }
    css
}

fn push_rule(css: &mut String, class: &str, style: &CssStyle) {
    if style.is_empty() {
        return;
    }
    // writing to a String cannot fail
    let _ = writeln!(css, ".{} {{", class);
    for (name, value) in style {
        let _ = writeln!(css, "  {}: {};", name, value);
    }
    css.push_str("}\n");
}

/// CSS-safe class fragment
pub fn class_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}
