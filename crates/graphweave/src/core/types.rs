//! Core type definitions shared by every parser
//!
//! Element kinds and selectors for the default attribute tables, the flow
//! direction vocabulary, and the input format identifiers.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Ordered attribute map; rendering is order-sensitive so insertion order is kept
pub type Attributes = IndexMap<String, String>;

/// The four element kinds that carry default attribute tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Graph,
    Node,
    Edge,
    Group,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Graph => "graph",
            ElementKind::Node => "node",
            ElementKind::Edge => "edge",
            ElementKind::Group => "group",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graph" => Ok(ElementKind::Graph),
            "node" => Ok(ElementKind::Node),
            "edge" => Ok(ElementKind::Edge),
            "group" => Ok(ElementKind::Group),
            _ => Err(format!("Unknown element kind: {}", s)),
        }
    }
}

/// Key of a default/class attribute table: `node`, `.red`, `edge.dashed`, ...
///
/// A selector with no kind (`.red`) applies to every element kind carrying
/// that class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selector {
    pub kind: Option<ElementKind>,
    pub class: Option<String>,
}

impl Selector {
    pub fn kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            class: None,
        }
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self {
            kind: None,
            class: Some(class.into()),
        }
    }

    pub fn kind_class(kind: ElementKind, class: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            class: Some(class.into()),
        }
    }

    /// True for the plain `graph` selector, which targets graph attributes directly
    pub fn is_graph(&self) -> bool {
        self.kind == Some(ElementKind::Graph) && self.class.is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.kind {
            write!(f, "{}", kind)?;
        }
        if let Some(class) = &self.class {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

/// Graph-level default layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    North,
    South,
    East,
    West,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::North => "north",
            Flow::South => "south",
            Flow::East => "east",
            Flow::West => "west",
        }
    }

    /// East and west flows lay fields out left to right
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Flow::East | Flow::West)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "up" => Ok(Flow::North),
            "south" | "down" => Ok(Flow::South),
            "east" | "right" | "forward" => Ok(Flow::East),
            "west" | "left" | "back" => Ok(Flow::West),
            other => Err(format!("Unknown flow direction: {}", other)),
        }
    }
}

/// Input languages understood by the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// The bracket/arrow diagram language
    #[default]
    Txt,
    /// Graphviz DOT
    Graphviz,
    /// GDL / VCG brace blocks
    Gdl,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Txt => "txt",
            Format::Graphviz => "graphviz",
            Format::Gdl => "gdl",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["txt", "graphviz", "gdl"]
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" | "native" => Ok(Format::Txt),
            "graphviz" | "dot" | "gv" => Ok(Format::Graphviz),
            "gdl" | "vcg" => Ok(Format::Gdl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}
