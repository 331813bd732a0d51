//! Graph intermediate representation
//!
//! The format-agnostic structure every parser writes into. The [`Graph`] owns
//! all nodes (keyed by id, insertion ordered), the edge list, and an arena of
//! groups addressed by [`GroupId`]. Cross references (edge endpoints, group
//! membership, autosplit origins) are stored as ids and resolved through the
//! graph, so there are no ownership cycles.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, trace};

use super::{Attributes, ElementKind, Flow, Selector};

/// Index of a group inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub usize);

/// A node of the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub attributes: Attributes,
    /// Node this one is placed relative to (autosplit only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub dx: i32,
    pub dy: i32,
    /// Nodes that use this node as their origin
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub children: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            attributes: Attributes::new(),
            origin: None,
            dx: 0,
            dy: 0,
            children: IndexSet::new(),
            group: None,
        }
    }

    /// Set an attribute; `label` updates the label field instead
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == "label" {
            self.label = value.into();
        } else {
            self.attributes.insert(key, value.into());
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Operator written at the source end, e.g. `--`
    pub left: String,
    /// Operator written at the target end, e.g. `-->`
    pub right: String,
    pub label: String,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    pub undirected: bool,
    pub bidirectional: bool,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            left: "--".to_string(),
            right: "-->".to_string(),
            label: String::new(),
            attributes: Attributes::new(),
            group: None,
            undirected: false,
            bidirectional: false,
        }
    }

    /// Set an attribute; `label` updates the label field instead
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == "label" {
            self.label = value.into();
        } else {
            self.attributes.insert(key, value.into());
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A (possibly anonymous) cluster of nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: IndexSet<String>,
    pub children: Vec<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<GroupId>,
    pub attributes: Attributes,
}

impl Group {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// The shared output of every parser
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    attributes: Attributes,
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    groups: Vec<Group>,
    #[serde(serialize_with = "serialize_defaults")]
    defaults: IndexMap<Selector, Attributes>,
    #[serde(skip)]
    anonymous_counter: usize,
}

fn serialize_defaults<S>(
    defaults: &IndexMap<Selector, Attributes>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(defaults.len()))?;
    for (selector, attributes) in defaults {
        map.serialize_entry(&selector.to_string(), attributes)?;
    }
    map.end()
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // graph attributes and default tables

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The `flow` attribute, if it names a known direction
    pub fn flow(&self) -> Option<Flow> {
        self.attribute("flow").and_then(|f| f.parse().ok())
    }

    /// Merge `attributes` into the table for `selector`
    ///
    /// The plain `graph` selector writes graph attributes directly.
    pub fn set_defaults(&mut self, selector: Selector, attributes: &Attributes) {
        trace!(%selector, count = attributes.len(), "Setting default attributes");
        let table = if selector.is_graph() {
            &mut self.attributes
        } else {
            self.defaults.entry(selector).or_default()
        };
        for (key, value) in attributes {
            table.insert(key.clone(), value.clone());
        }
    }

    pub fn defaults(&self, selector: &Selector) -> Option<&Attributes> {
        self.defaults.get(selector)
    }

    pub fn default_tables(&self) -> impl Iterator<Item = (&Selector, &Attributes)> {
        self.defaults.iter()
    }

    /// Defaults `class` contributes to an element of `kind`, generic class table first
    fn class_defaults(&self, kind: ElementKind, class: &str) -> Attributes {
        let mut merged = Attributes::new();
        for selector in [Selector::class(class), Selector::kind_class(kind, class)] {
            if let Some(table) = self.defaults.get(&selector) {
                for (key, value) in table {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    /// Attributes to apply for an explicit attribute block: class defaults
    /// for every class named in `class`, then the block itself
    fn resolve_block(&self, kind: ElementKind, attributes: &Attributes) -> Attributes {
        let mut resolved = Attributes::new();
        if let Some(classes) = attributes.get("class") {
            for class in classes.split([' ', ',']).filter(|c| !c.is_empty()) {
                resolved.extend(self.class_defaults(kind, class));
            }
        }
        for (key, value) in attributes {
            resolved.insert(key.clone(), value.clone());
        }
        resolved
    }

    fn kind_defaults(&self, kind: ElementKind) -> Attributes {
        self.defaults
            .get(&Selector::kind(kind))
            .cloned()
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // nodes

    /// Fetch or create the node `id`
    ///
    /// Creation is idempotent: an existing node is returned untouched. New
    /// nodes inherit the `node` default table.
    pub fn add_node(&mut self, id: &str) -> &mut Node {
        let node_count = self.nodes.len();
        match self.nodes.entry(id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut node = Node::new(id);
                if let Some(defaults) = self.defaults.get(&Selector::kind(ElementKind::Node)) {
                    for (key, value) in defaults {
                        node.set_attribute(key.clone(), value.clone());
                    }
                }
                trace!(node_id = %id, "Adding node to graph");
                debug!(node_count = node_count + 1, "Node added");
                entry.insert(node)
            }
        }
    }

    /// Create a fresh anonymous node `#N`
    pub fn add_anonymous_node(&mut self) -> String {
        let mut id = format!("#{}", self.anonymous_counter);
        while self.nodes.contains_key(&id) {
            self.anonymous_counter += 1;
            id = format!("#{}", self.anonymous_counter);
        }
        self.anonymous_counter += 1;
        let node = self.add_node(&id);
        node.label = String::new();
        node.set_attribute("anonymous", "true");
        id
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Apply an attribute block to node `id`, expanding `class` defaults first
    pub fn apply_node_attributes(&mut self, id: &str, attributes: &Attributes) {
        let resolved = self.resolve_block(ElementKind::Node, attributes);
        let node = self.add_node(id);
        for (key, value) in resolved {
            node.set_attribute(key, value);
        }
    }

    /// Remove a node, detaching it from its group and autosplit relatives
    ///
    /// Edges are not touched; callers rewire them first.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let node = self.nodes.shift_remove(id)?;
        if let Some(group) = node.group {
            if let Some(group) = self.groups.get_mut(group.0) {
                group.members.shift_remove(id);
            }
        }
        if let Some(origin) = &node.origin {
            if let Some(origin) = self.nodes.get_mut(origin) {
                origin.children.shift_remove(id);
            }
        }
        for child in &node.children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.origin = None;
            }
        }
        trace!(node_id = %id, "Removed node from graph");
        Some(node)
    }

    /// Place `child` at (`dx`, `dy`) relative to `origin`
    pub fn set_origin(&mut self, child: &str, origin: &str, dx: i32, dy: i32) {
        self.add_node(origin).children.insert(child.to_string());
        let node = self.add_node(child);
        node.origin = Some(origin.to_string());
        node.dx = dx;
        node.dy = dy;
    }

    // ---------------------------------------------------------------------
    // edges

    /// Create an edge, creating either endpoint that does not exist yet
    ///
    /// New edges inherit the `edge` default table.
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Edge {
        self.add_node(from);
        self.add_node(to);
        let mut edge = Edge::new(from, to);
        for (key, value) in self.kind_defaults(ElementKind::Edge) {
            edge.set_attribute(key, value);
        }
        trace!(edge_from = %from, edge_to = %to, "Adding edge to graph");
        self.edges.push(edge);
        debug!(edge_count = self.edges.len(), "Edge added");
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    /// Apply an attribute block to the edge at `index`
    pub fn apply_edge_attributes(&mut self, index: usize, attributes: &Attributes) {
        let resolved = self.resolve_block(ElementKind::Edge, attributes);
        if let Some(edge) = self.edges.get_mut(index) {
            for (key, value) in resolved {
                edge.set_attribute(key, value);
            }
        }
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Point every edge endpoint naming `old` at `new` instead
    pub fn retarget_edges(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        for edge in &mut self.edges {
            if edge.from == old {
                edge.from = new.to_string();
                changed += 1;
            }
            if edge.to == old {
                edge.to = new.to_string();
                changed += 1;
            }
        }
        changed
    }

    // ---------------------------------------------------------------------
    // groups

    /// Create a group nested under `parent` (or top level)
    ///
    /// New groups inherit the `group` default table.
    pub fn add_group(&mut self, name: &str, parent: Option<GroupId>) -> GroupId {
        let id = GroupId(self.groups.len());
        let group = Group {
            id,
            name: name.to_string(),
            members: IndexSet::new(),
            children: Vec::new(),
            parent,
            attributes: self.kind_defaults(ElementKind::Group),
        };
        trace!(group_name = %name, group_id = id.0, "Adding group to graph");
        self.groups.push(group);
        if let Some(parent) = parent.and_then(|p| self.groups.get_mut(p.0)) {
            parent.children.push(id);
        }
        debug!(group_count = self.groups.len(), "Group added");
        id
    }

    /// Make `node` a member of `group`, leaving any group that held it before
    pub fn add_to_group(&mut self, node: &str, group: GroupId) {
        let previous = self.add_node(node).group;
        if previous == Some(group) {
            return;
        }
        if let Some(old) = previous.and_then(|g| self.groups.get_mut(g.0)) {
            old.members.shift_remove(node);
        }
        if let Some(target) = self.groups.get_mut(group.0) {
            target.members.insert(node.to_string());
            if let Some(n) = self.nodes.get_mut(node) {
                n.group = Some(group);
            }
        }
    }

    /// Apply an attribute block to a group, expanding `class` defaults first
    pub fn apply_group_attributes(&mut self, group: GroupId, attributes: &Attributes) {
        let resolved = self.resolve_block(ElementKind::Group, attributes);
        if let Some(group) = self.groups.get_mut(group.0) {
            for (key, value) in resolved {
                group.attributes.insert(key, value);
            }
        }
    }

    pub fn set_edge_group(&mut self, index: usize, group: Option<GroupId>) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.group = group;
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id.0)
    }

    /// First group carrying `name`
    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Every group, nested ones included, in creation order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Groups without a parent
    pub fn top_level_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.parent.is_none())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
