//! DOT attribute vocabulary translation
//!
//! Each element kind has a table mapping DOT attribute names to either a
//! plain rename or a conversion function. Keys without an entry are kept
//! under the `x-dot-` prefix so nothing from the input is lost.

use crate::core::Attributes;

/// Prefix for DOT attributes without a native counterpart
pub const VENDOR_PREFIX: &str = "x-dot-";

/// Writes the converted form of one DOT value into the output map
type Convert = fn(&str, &mut Attributes);

#[derive(Clone, Copy)]
enum Remap {
    Rename(&'static str),
    Convert(Convert),
    /// Consumed by the grammar itself
    Skip,
}

/// What the attributes are attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Target {
    Graph,
    Group,
    Node,
    Edge,
}

const GRAPH_TABLE: &[(&str, Remap)] = &[
    ("rankdir", Remap::Convert(rankdir)),
    ("labeljust", Remap::Convert(labeljust)),
    ("labelloc", Remap::Convert(labelloc)),
    ("label", Remap::Rename("label")),
    ("colorscheme", Remap::Rename("colorscheme")),
    ("bgcolor", Remap::Rename("fill")),
    ("fontname", Remap::Rename("font")),
    ("fontcolor", Remap::Rename("color")),
    ("fontsize", Remap::Convert(fontsize)),
    ("URL", Remap::Rename("link")),
    ("href", Remap::Rename("link")),
    ("tooltip", Remap::Rename("title")),
];

const GROUP_TABLE: &[(&str, Remap)] = &[
    ("labeljust", Remap::Convert(labeljust)),
    ("labelloc", Remap::Convert(labelloc)),
    ("label", Remap::Rename("label")),
    ("colorscheme", Remap::Rename("colorscheme")),
    ("bgcolor", Remap::Rename("fill")),
    ("fillcolor", Remap::Rename("fill")),
    ("color", Remap::Rename("bordercolor")),
    ("fontname", Remap::Rename("font")),
    ("fontcolor", Remap::Rename("color")),
    ("fontsize", Remap::Convert(fontsize)),
    ("style", Remap::Convert(node_style)),
    ("URL", Remap::Rename("link")),
    ("href", Remap::Rename("link")),
    ("tooltip", Remap::Rename("title")),
];

const NODE_TABLE: &[(&str, Remap)] = &[
    ("label", Remap::Rename("label")),
    ("shape", Remap::Convert(shape)),
    ("style", Remap::Convert(node_style)),
    ("colorscheme", Remap::Rename("colorscheme")),
    ("color", Remap::Rename("bordercolor")),
    ("fillcolor", Remap::Rename("fill")),
    ("fontname", Remap::Rename("font")),
    ("fontcolor", Remap::Rename("color")),
    ("fontsize", Remap::Convert(fontsize)),
    ("URL", Remap::Rename("link")),
    ("href", Remap::Rename("link")),
    ("tooltip", Remap::Rename("title")),
];

const EDGE_TABLE: &[(&str, Remap)] = &[
    ("label", Remap::Rename("label")),
    ("style", Remap::Convert(edge_style)),
    ("colorscheme", Remap::Rename("colorscheme")),
    ("color", Remap::Rename("color")),
    ("fontname", Remap::Rename("font")),
    ("fontcolor", Remap::Rename("labelcolor")),
    ("fontsize", Remap::Convert(fontsize)),
    ("headport", Remap::Convert(headport)),
    ("tailport", Remap::Convert(tailport)),
    ("URL", Remap::Rename("link")),
    ("href", Remap::Rename("link")),
    ("tooltip", Remap::Rename("title")),
    ("dir", Remap::Skip),
];

fn table(target: Target) -> &'static [(&'static str, Remap)] {
    match target {
        Target::Graph => GRAPH_TABLE,
        Target::Group => GROUP_TABLE,
        Target::Node => NODE_TABLE,
        Target::Edge => EDGE_TABLE,
    }
}

/// Translate raw DOT attributes, in order, into the native vocabulary
pub(super) fn remap(target: Target, raw: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for (key, value) in raw {
        let rule = table(target)
            .iter()
            .find(|(name, _)| *name == key.as_str())
            .map(|(_, rule)| *rule);
        match rule {
            Some(Remap::Rename(name)) => {
                out.insert(name.to_string(), value.clone());
            }
            Some(Remap::Convert(convert)) => convert(value, &mut out),
            Some(Remap::Skip) => {}
            None => {
                out.insert(format!("{}{}", VENDOR_PREFIX, key), value.clone());
            }
        }
    }
    out
}

fn rankdir(value: &str, out: &mut Attributes) {
    let flow = match value.trim().to_ascii_uppercase().as_str() {
        "LR" => "east",
        "RL" => "west",
        "TB" => "south",
        "BT" => "north",
        _ => "east",
    };
    out.insert("flow".to_string(), flow.to_string());
}

fn labeljust(value: &str, out: &mut Attributes) {
    let align = match value.trim().to_ascii_lowercase().as_str() {
        "l" => "left",
        "r" => "right",
        _ => "center",
    };
    out.insert("align".to_string(), align.to_string());
}

fn labelloc(value: &str, out: &mut Attributes) {
    let position = match value.trim().to_ascii_lowercase().as_str() {
        "t" | "top" => "top",
        _ => "bottom",
    };
    out.insert("labelpos".to_string(), position.to_string());
}

fn fontsize(value: &str, out: &mut Attributes) {
    let value = value.trim();
    let size = if value.parse::<f64>().is_ok() {
        format!("{}px", value)
    } else {
        value.to_string()
    };
    out.insert("font-size".to_string(), size);
}

fn shape(value: &str, out: &mut Attributes) {
    let lower = value.trim().to_ascii_lowercase();
    let base = lower
        .strip_prefix("double")
        .or_else(|| lower.strip_prefix("triple"))
        .unwrap_or(&lower);
    let mapped = match base {
        "box" | "polygon" | "egg" | "rectangle" | "rect" | "msquare" => "rect",
        "mdiamond" => "diamond",
        "plaintext" | "plain" | "none" => "none",
        "mrecord" => "record",
        other => other,
    };
    out.insert("shape".to_string(), mapped.to_string());
}

/// Border weight bucket for `setlinewidth(N)`; `None` for the default solid
fn line_width(token: &str) -> Option<&'static str> {
    let width: f64 = token
        .strip_prefix("setlinewidth(")?
        .strip_suffix(')')?
        .trim()
        .parse()
        .ok()?;
    if width < 3.0 {
        None
    } else if width < 5.0 {
        Some("bold")
    } else if width < 11.0 {
        Some("broad")
    } else {
        Some("wide")
    }
}

fn node_style(value: &str, out: &mut Attributes) {
    let mut unknown = Vec::new();
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token {
            "filled" => {
                out.entry("shape".to_string())
                    .or_insert_with(|| "rect".to_string());
            }
            "rounded" => {
                out.insert("corner".to_string(), "rounded".to_string());
            }
            "invis" | "invisible" => {
                out.insert("shape".to_string(), "invisible".to_string());
            }
            "dotted" | "dashed" | "bold" => {
                out.insert("border".to_string(), token.to_string());
            }
            t if t.starts_with("setlinewidth(") => {
                if let Some(weight) = line_width(t) {
                    out.insert("border".to_string(), weight.to_string());
                }
            }
            other => unknown.push(other),
        }
    }
    if !unknown.is_empty() {
        out.insert(format!("{}style", VENDOR_PREFIX), unknown.join(","));
    }
}

fn edge_style(value: &str, out: &mut Attributes) {
    let mut unknown = Vec::new();
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token {
            "invis" | "invisible" => {
                out.insert("style".to_string(), "invisible".to_string());
            }
            "dotted" | "dashed" | "bold" => {
                out.insert("style".to_string(), token.to_string());
            }
            "solid" => {}
            t if t.starts_with("setlinewidth(") => {
                if let Some(weight) = line_width(t) {
                    out.insert("style".to_string(), weight.to_string());
                }
            }
            other => unknown.push(other),
        }
    }
    if !unknown.is_empty() {
        out.insert(format!("{}style", VENDOR_PREFIX), unknown.join(","));
    }
}

/// Compass side of a port reference such as `n`, `p1:ne` or `south`
fn compass(value: &str) -> &'static str {
    let last = value.rsplit(':').next().unwrap_or(value).trim();
    match last.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('n') => "north",
        Some('s') => "south",
        Some('w') => "west",
        _ => "east",
    }
}

fn headport(value: &str, out: &mut Attributes) {
    out.insert("end".to_string(), compass(value).to_string());
}

fn tailport(value: &str, out: &mut Attributes) {
    out.insert("start".to_string(), compass(value).to_string());
}
