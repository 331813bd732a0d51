//! Record label autosplit
//!
//! A `shape=record` node whose label holds `|` separators is replaced by one
//! node per field. `|` puts the next field beside the previous one, `||`
//! starts a new row below the first field of the current row. Field nodes are
//! named `base.N` and placed relative to each other through their origin.

use tracing::{debug, trace};

use crate::core::scanner::find_closing;
use crate::core::{Attributes, Graph};

/// One field of a record label
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    text: String,
    port: Option<String>,
    /// Starts a new row (preceded by `||`)
    row_start: bool,
    /// Followed by `||` or nothing
    row_end: bool,
}

/// Whether `label` would split into more than one field
pub(super) fn is_split_label(label: &str) -> bool {
    split_fields(&unwrap_braces(label, false)).len() > 1
}

/// Split `label` on the `|` separators outside `{ }`
///
/// Only braces nest in record syntax; brackets and parentheses are field
/// text. A backslash escapes the next character.
fn split_fields(label: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in label.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&label[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&label[start..]);
    parts
}

/// Undo a `{A|B}` wrapper, biasing the separators so no field ends up zero
/// width in the given flow
fn unwrap_braces(label: &str, horizontal: bool) -> String {
    let trimmed = label.trim();
    let wrapped = trimmed.starts_with('{')
        && find_closing(trimmed, 0).is_ok_and(|close| close + 1 == trimmed.len());
    if !wrapped {
        return label.to_string();
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let parts = split_fields(inner);
    let mut out = String::with_capacity(inner.len() + parts.len());
    let mut iter = parts.iter().peekable();
    while let Some(part) = iter.next() {
        if iter.peek().is_none() {
            out.push_str(part);
            break;
        }
        if part.is_empty() && !out.is_empty() {
            // second half of a `||` that was already written
            if !horizontal {
                out.push_str(" |");
            } else {
                out.push('|');
            }
            continue;
        }
        out.push_str(part);
        let double = iter.peek().is_some_and(|next| next.is_empty());
        if horizontal && !double {
            out.push_str("||");
        } else {
            out.push('|');
        }
    }
    out
}

/// Remove the record escapes, keeping every other backslash sequence
fn unescape_field(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '|' | '{' | '}' | '<' | '>' | '\\') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Split a leading `<port>` off a field
fn split_port(field: &str) -> (Option<String>, &str) {
    let trimmed = field.trim_start();
    let Some(rest) = trimmed.strip_prefix('<') else {
        return (None, field);
    };
    let mut escaped = false;
    for (idx, ch) in rest.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '>' {
            let port = rest[..idx].trim().to_string();
            return (Some(port), &rest[idx + 1..]);
        }
    }
    (None, field)
}

fn fields(label: &str) -> Vec<Field> {
    let parts = split_fields(label);
    let last = parts.len().saturating_sub(1);
    let mut fields: Vec<Field> = Vec::new();
    let mut row_start = false;

    for (idx, part) in parts.iter().enumerate() {
        // an empty part between two separators is the second pipe of `||`
        if part.is_empty() && idx > 0 && idx < last {
            row_start = true;
            if let Some(previous) = fields.last_mut() {
                previous.row_end = true;
            }
            continue;
        }
        let (port, text) = split_port(part);
        fields.push(Field {
            text: unescape_field(text),
            port,
            row_start,
            row_end: false,
        });
        row_start = false;
    }
    if let Some(last) = fields.last_mut() {
        last.row_end = true;
    }
    fields
}

/// Split the record node `base` into field nodes
///
/// Returns the port name of every field, indexed by field number, or `None`
/// when `base` is not a splittable record.
pub(super) fn autosplit(graph: &mut Graph, base: &str) -> Option<Vec<String>> {
    let node = graph.node(base)?;
    if !is_split_label(&node.label) {
        return None;
    }
    let horizontal = graph.flow().is_some_and(|f| f.is_horizontal());
    let label = unwrap_braces(&node.label, horizontal);
    let group = node.group;
    let inherited: Attributes = node
        .attributes
        .iter()
        .filter(|(key, _)| key.as_str() != "shape")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let fields = fields(&label);
    debug!(record = %base, fields = fields.len(), "Splitting record label");

    let mut ports = Vec::with_capacity(fields.len());
    let mut row_first: Option<String> = None;
    let mut previous: Option<String> = None;
    let (mut x, mut y) = (0usize, 0usize);

    for (index, field) in fields.iter().enumerate() {
        let id = format!("{}.{}", base, index);
        if field.row_start {
            x = 0;
            y += 1;
        }

        let blank = field.text.trim().is_empty();
        let (label, shape) = if blank && field.text.chars().count() == 1 && field.row_end {
            (String::new(), Some("invisible"))
        } else if blank {
            (" ".to_string(), None)
        } else {
            (field.text.trim().to_string(), None)
        };
        let port = field.port.clone().unwrap_or_else(|| index.to_string());

        let child = graph.add_node(&id);
        for (key, value) in &inherited {
            child.set_attribute(key.clone(), value.clone());
        }
        child.label = label;
        if let Some(shape) = shape {
            child.set_attribute("shape", shape);
        }
        child.set_attribute("basename", base);
        child.set_attribute("autosplit-offset", format!("{},{}", x, y));
        child.set_attribute("autosplit-port", port.clone());
        trace!(field = %id, x, y, "Created record field");

        if field.row_start {
            if let Some(first) = &row_first {
                graph.set_origin(&id, first, 0, 1);
            }
            row_first = Some(id.clone());
        } else if let Some(prev) = &previous {
            graph.set_origin(&id, prev, 1, 0);
        } else {
            row_first = Some(id.clone());
        }
        if let Some(group) = group {
            graph.add_to_group(&id, group);
        }

        previous = Some(id);
        ports.push(port);
        x += 1;
    }

    graph.remove_node(base);
    graph.retarget_edges(base, &format!("{}.0", base));
    Some(ports)
}
