//! GDL/VCG field translation
//!
//! A flat table per block kind. Fields without an entry are kept under the
//! `x-vcg-` prefix.

use crate::core::Attributes;

/// Prefix for GDL fields without a native counterpart
pub const VENDOR_PREFIX: &str = "x-vcg-";

/// Rank written for `vertical_order: maxdepth`
const MAX_RANK: &str = "1000000";

type Convert = fn(&str, &mut Attributes);

#[derive(Clone, Copy)]
enum Remap {
    Rename(&'static str),
    Convert(Convert),
}

/// Which block a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Block {
    Graph,
    Node,
    Edge,
}

const GRAPH_TABLE: &[(&str, Remap)] = &[
    ("title", Remap::Rename("label")),
    ("orientation", Remap::Convert(orientation)),
];

const NODE_TABLE: &[(&str, Remap)] = &[
    ("label", Remap::Convert(node_label)),
    ("vertical_order", Remap::Convert(vertical_order)),
];

const EDGE_TABLE: &[(&str, Remap)] = &[("label", Remap::Rename("label"))];

/// Translate one field into `out`
pub(super) fn remap(block: Block, key: &str, value: &str, out: &mut Attributes) {
    let table = match block {
        Block::Graph => GRAPH_TABLE,
        Block::Node => NODE_TABLE,
        Block::Edge => EDGE_TABLE,
    };
    match table.iter().find(|(name, _)| *name == key).map(|(_, rule)| *rule) {
        Some(Remap::Rename(name)) => {
            out.insert(name.to_string(), value.to_string());
        }
        Some(Remap::Convert(convert)) => convert(value, out),
        None => {
            out.insert(vendor_key(key), value.to_string());
        }
    }
}

pub(super) fn vendor_key(key: &str) -> String {
    format!("{}{}", VENDOR_PREFIX, key)
}

fn orientation(value: &str, out: &mut Attributes) {
    let flow = match value.trim() {
        "bottom_to_top" => "north",
        "left_to_right" => "east",
        "right_to_left" => "west",
        _ => "south",
    };
    out.insert("flow".to_string(), flow.to_string());
}

/// Strip `\fNN` color codes, turn newlines into a literal `\n`, drop CRs
fn node_label(value: &str, out: &mut Attributes) {
    let mut label = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'f') => {
                chars.next();
                for _ in 0..2 {
                    if chars.next_if(|c| c.is_ascii_digit()).is_none() {
                        break;
                    }
                }
            }
            '\r' => {}
            '\n' => label.push_str("\\n"),
            other => label.push(other),
        }
    }
    out.insert("label".to_string(), label);
}

fn vertical_order(value: &str, out: &mut Attributes) {
    out.insert(vendor_key("vertical_order"), value.to_string());
    let rank = if value.trim() == "maxdepth" {
        MAX_RANK.to_string()
    } else {
        value.trim().to_string()
    };
    out.insert("rank".to_string(), rank);
}
