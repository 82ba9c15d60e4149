//! Output encoding for the status-bar host
//!
//! Plain mode prints the frame glyph alone. JSON mode prints one object per
//! line with the fields waybar's `custom` module understands.

use crate::models::{OutputRecord, ReturnType};
use serde::Serialize;

/// Wire form of one JSON frame
#[derive(Debug, Serialize)]
struct JsonFrame<'a> {
    text: &'a str,
    alt: &'a str,
    tooltip: String,
    class: &'a str,
    percentage: i64,
    label: &'a str,
}

/// Turns output records into lines
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    return_type: ReturnType,
}

impl Renderer {
    pub fn new(return_type: ReturnType) -> Self {
        Self { return_type }
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Render one record as a single line (without the trailing newline)
    pub fn render(&self, record: &OutputRecord) -> String {
        match self.return_type {
            ReturnType::Plain => record.text.clone(),
            ReturnType::Json => {
                let frame = JsonFrame {
                    text: &record.text,
                    alt: &record.alt,
                    tooltip: tooltip(record),
                    class: &record.state,
                    percentage: record.percentage,
                    label: &record.label,
                };
                // Only string and integer fields: serialization cannot fail
                serde_json::to_string(&frame).unwrap_or_default()
            }
        }
    }
}

/// Substitute `{percentage}` and `{label}` in the record's tooltip template
pub fn tooltip(record: &OutputRecord) -> String {
    let percentage = record.percentage.to_string();
    format_template(
        &record.tooltip_format,
        &[("percentage", percentage.as_str()), ("label", record.label.as_str())],
    )
}

/// Minimal named-placeholder formatter
///
/// `{{` and `}}` produce literal braces. Unknown placeholders are copied
/// through untouched.
fn format_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail.find('}') {
                Some(end) => {
                    let name = &tail[1..end];
                    match values.iter().find(|(key, _)| *key == name) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&tail[..=end]),
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
