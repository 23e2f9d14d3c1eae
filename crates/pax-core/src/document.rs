// crates/pax-core/src/document.rs
// ============================================================================
// Module: Node Documents
// Description: Arena-backed node trees with tags, values, attributes, children.
// Purpose: Own one tree of nodes and hand out borrowed views into it.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`Document`] owns every node of one tree in an arena and addresses nodes
//! through copyable [`NodeId`] handles. Read access goes through [`NodeRef`],
//! mutation through [`NodeMut`]. Subtrees move between documents as whole
//! documents: attaching consumes a document, detaching returns one.
//!
//! Values follow one rule everywhere: a value is stored only when it contains
//! something other than whitespace. Setting a blank value clears it.
//!
//! Security posture: documents may hold untrusted text; rendering escapes it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use crate::json::JsonError;
use crate::json::JsonOptions;
use crate::search;
use crate::subset::Subset;
use crate::xml::XmlOptions;

// ============================================================================
// SECTION: Value Rules
// ============================================================================

/// Returns the value to store for `value`, or `None` when it is blank.
#[must_use]
pub fn normalize_value(value: &str) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value.to_string()) }
}

/// Returns true when `value` would be stored as a node or attribute value.
#[must_use]
pub fn is_meaningful_value(value: &str) -> bool {
    !value.trim().is_empty()
}

// ============================================================================
// SECTION: Attributes
// ============================================================================

/// Named attribute with an optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    name: String,
    /// Attribute value after the value rules.
    value: Option<String>,
}

impl Attribute {
    /// Creates an attribute, applying the value rules to `value`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.and_then(normalize_value),
        }
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attribute value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns true when the attribute carries a value.
    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Replaces the value, applying the value rules.
    pub fn set_value(&mut self, value: Option<&str>) {
        self.value = value.and_then(normalize_value);
    }
}

/// Ordered attribute set of one node.
///
/// # Invariants
/// - Every stored attribute has a non-empty name.
/// - A repeated name is stored under a derived key; lookup by name returns the
///   first attribute added with that name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Attributes keyed by name.
    entries: Subset<Attribute>,
}

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no attribute is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first attribute.
    #[must_use]
    pub fn first(&self) -> Option<&Attribute> {
        self.entries.first()
    }

    /// Returns the attribute at `position`.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Attribute> {
        self.entries.at(position)
    }

    /// Returns the attribute stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.entries.get(key)
    }

    /// Returns the value of the attribute stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Attribute::value)
    }

    /// Returns true when an attribute is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns true when an equal attribute is stored.
    #[must_use]
    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.entries.contains(attribute)
    }

    /// Iterates over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.entries.iter()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys()
    }

    /// Adds an attribute and returns its key, or `None` for an empty name.
    pub fn add(&mut self, name: &str, value: Option<&str>) -> Option<String> {
        self.add_attribute(Attribute::new(name, value))
    }

    /// Adds an existing attribute and returns its key, or `None` for an empty name.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Option<String> {
        if attribute.name.is_empty() {
            return None;
        }
        let name = attribute.name.clone();
        Some(self.entries.insert(&name, attribute))
    }

    /// Updates the value stored under `name`, adding the attribute when absent.
    ///
    /// Returns false only for an empty name.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> bool {
        if let Some(existing) = self.entries.get_mut(name) {
            existing.set_value(value);
            return true;
        }
        self.add(name, value).is_some()
    }

    /// Stores `attribute` under its name, returning the attribute it replaced.
    pub fn replace(&mut self, attribute: Attribute) -> Option<Attribute> {
        if attribute.name.is_empty() {
            return None;
        }
        let name = attribute.name.clone();
        self.entries.replace(&name, attribute)
    }

    /// Removes the attribute stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        self.entries.remove(key)
    }

    /// Removes the first attribute equal to `attribute`.
    pub fn remove_attribute(&mut self, attribute: &Attribute) -> Option<Attribute> {
        self.entries.remove_where(|candidate| candidate == attribute).map(|(_, removed)| removed)
    }

    /// Removes every attribute; returns false when there was nothing to remove.
    pub fn clear(&mut self) -> bool {
        !self.entries.drain().is_empty()
    }

    /// Returns attributes whose name starts with `prefix`, ignoring case.
    #[must_use]
    pub fn starting_with(&self, prefix: &str) -> Vec<&Attribute> {
        let prefix = prefix.to_lowercase();
        self.entries
            .iter()
            .filter(|attribute| attribute.name.to_lowercase().starts_with(&prefix))
            .collect()
    }

    /// Renders `name="value"` pairs joined by a single space.
    ///
    /// Missing values render as empty strings; values are escaped.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (position, attribute) in self.entries.iter().enumerate() {
            if position > 0 {
                out.push(' ');
            }
            out.push_str(&attribute.name);
            out.push_str("=\"");
            out.push_str(&crate::xml::escape_attribute(attribute.value().unwrap_or("")));
            out.push('"');
        }
        out
    }
}

// ============================================================================
// SECTION: Node Storage
// ============================================================================

/// Opaque handle to a node inside one [`Document`].
///
/// A handle pairs an arena slot with the generation of the node that held it.
/// Slots are reused after removal, but the generation moves on, so handles of
/// removed nodes never resolve again. Handles are only meaningful for the
/// document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Arena slot.
    slot: usize,
    /// Generation of the slot when this handle was issued.
    generation: u32,
}

impl NodeId {
    /// Returns the arena slot of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.slot
    }

    /// Returns a first-generation handle for `slot`.
    const fn fresh(slot: usize) -> Self {
        Self {
            slot,
            generation: 0,
        }
    }
}

/// Root slot of every document.
const ROOT: NodeId = NodeId::fresh(0);

/// Arena slot contents.
#[derive(Debug, Clone)]
struct NodeData {
    /// Non-empty tag, if any.
    tag: Option<String>,
    /// Value after the value rules.
    value: Option<String>,
    /// Parent node; `None` for the root and dead slots.
    parent: Option<NodeId>,
    /// Child handles keyed by tag.
    children: Subset<NodeId>,
    /// Attributes keyed by name.
    attributes: Attributes,
    /// False once the node has been removed.
    live: bool,
    /// Bumped every time the slot is freed.
    generation: u32,
}

impl NodeData {
    /// Creates a live, parentless node.
    fn new(tag: Option<&str>, value: Option<&str>) -> Self {
        Self {
            tag: tag.filter(|tag| !tag.is_empty()).map(str::to_string),
            value: value.and_then(normalize_value),
            parent: None,
            children: Subset::new(),
            attributes: Attributes::new(),
            live: true,
            generation: 0,
        }
    }

    /// Creates an emptied slot for a removed node of `generation`.
    fn dead(generation: u32) -> Self {
        let mut data = Self::new(None, None);
        data.live = false;
        data.generation = generation.wrapping_add(1);
        data
    }
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// Tree of nodes with exactly one root.
///
/// # Invariants
/// - Slot 0 holds the root, which is always live and has no parent.
/// - Every other live node has exactly one parent and appears exactly once in
///   that parent's children.
/// - Removed slots are reused; a stale handle's generation no longer matches,
///   so it resolves to `None`.
#[derive(Debug, Clone)]
pub struct Document {
    /// Node arena; removed nodes leave dead slots behind.
    nodes: Vec<NodeData>,
    /// Dead slots available for reuse.
    free: Vec<usize>,
}

impl Document {
    /// Creates a document whose root is tagged `tag`.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            nodes: vec![NodeData::new(Some(tag), None)],
            free: Vec::new(),
        }
    }

    /// Creates a document whose root is tagged `tag` and holds `value`.
    #[must_use]
    pub fn with_value(tag: &str, value: &str) -> Self {
        Self {
            nodes: vec![NodeData::new(Some(tag), Some(value))],
            free: Vec::new(),
        }
    }

    /// Creates a document with an untagged root.
    #[must_use]
    pub fn untagged() -> Self {
        Self {
            nodes: vec![NodeData::new(None, None)],
            free: Vec::new(),
        }
    }

    /// Returns the root handle.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        ROOT
    }

    /// Returns a read view of the root.
    #[must_use]
    pub const fn root_node(&self) -> NodeRef<'_> {
        NodeRef {
            document: self,
            id: ROOT,
        }
    }

    /// Returns a mutable view of the root.
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        NodeMut {
            document: self,
            id: ROOT,
        }
    }

    /// Returns true when `id` refers to a live node of this document.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.slot).is_some_and(|data| data.live && data.generation == id.generation)
    }

    /// Returns a read view of `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.contains(id).then_some(NodeRef {
            document: self,
            id,
        })
    }

    /// Returns a mutable view of `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        if self.contains(id) {
            Some(NodeMut {
                document: self,
                id,
            })
        } else {
            None
        }
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns the number of arena slots, live or free.
    ///
    /// Removed slots are recycled, so this stays bounded by the peak node
    /// count rather than by the number of edits.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns a deep copy of the subtree rooted at `id` as its own document.
    #[must_use]
    pub fn copy_subtree(&self, id: NodeId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        Some(self.rebuild(&self.collect(id)))
    }

    /// Resolves `path` starting from the root.
    #[must_use]
    pub fn search(&self, path: &str) -> Option<NodeRef<'_>> {
        search::search(self.root_node(), path)
    }

    /// Returns the slot of `id`; callers guarantee `id` is in range.
    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.slot]
    }

    /// Returns the mutable slot of `id`; callers guarantee `id` is in range.
    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.slot]
    }

    /// Collects the subtree rooted at `id` in pre-order.
    fn collect(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.data(current).children.iter().rev().copied());
        }
        order
    }

    /// Builds a compact document from the nodes in `order`; `order[0]` becomes the root.
    fn rebuild(&self, order: &[NodeId]) -> Self {
        let mapping: HashMap<NodeId, NodeId> =
            order.iter().enumerate().map(|(slot, id)| (*id, NodeId::fresh(slot))).collect();
        let nodes = order
            .iter()
            .map(|id| {
                let source = self.data(*id);
                NodeData {
                    tag: source.tag.clone(),
                    value: source.value.clone(),
                    parent: source.parent.and_then(|parent| mapping.get(&parent).copied()),
                    children: source
                        .children
                        .map_into(|child| mapping.get(child).copied().unwrap_or(*child)),
                    attributes: source.attributes.clone(),
                    live: true,
                    generation: 0,
                }
            })
            .collect();
        Self {
            nodes,
            free: Vec::new(),
        }
    }

    /// Moves every node of `other` into this arena under `parent` without
    /// registering it as a child. Returns the handle of the moved root.
    fn import(&mut self, parent: NodeId, other: Self) -> NodeId {
        let mut placed: Vec<Option<NodeId>> = Vec::with_capacity(other.nodes.len());
        for data in &other.nodes {
            placed.push(data.live.then(|| self.allocate()));
        }
        let relocate = |id: NodeId| placed.get(id.slot).copied().flatten().unwrap_or(id);
        for (mut data, target) in other.nodes.into_iter().zip(placed.iter().copied()) {
            let Some(target) = target else {
                continue;
            };
            data.parent = data.parent.map(relocate);
            data.children.map_in_place(|child| *child = relocate(*child));
            data.generation = target.generation;
            self.nodes[target.slot] = data;
        }
        let moved = relocate(ROOT);
        self.data_mut(moved).parent = Some(parent);
        moved
    }

    /// Reserves a slot, reusing a freed one when available.
    fn allocate(&mut self) -> NodeId {
        if let Some(slot) = self.free.pop() {
            return NodeId {
                slot,
                generation: self.nodes[slot].generation,
            };
        }
        self.nodes.push(NodeData::new(None, None));
        NodeId::fresh(self.nodes.len() - 1)
    }

    /// Marks the subtree rooted at `id` as removed and frees its slots.
    fn kill(&mut self, id: NodeId) {
        for dead in self.collect(id) {
            let generation = self.data(dead).generation;
            *self.data_mut(dead) = NodeData::dead(generation);
            self.free.push(dead.slot);
        }
    }

    /// Unlinks `id` from its parent and returns its subtree as a document.
    fn detach(&mut self, id: NodeId) -> Option<Self> {
        if id == ROOT || !self.contains(id) {
            return None;
        }
        let parent = self.data(id).parent?;
        let extracted = self.rebuild(&self.collect(id));
        self.data_mut(parent).children.remove_where(|child| *child == id);
        self.kill(id);
        Some(extracted)
    }
}

// ============================================================================
// SECTION: Read Views
// ============================================================================

/// Borrowed read view of one live node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    /// Owning document.
    document: &'a Document,
    /// Viewed node.
    id: NodeId,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef").field("id", &self.id).field("tag", &self.tag()).finish()
    }
}

impl<'a> NodeRef<'a> {
    /// Returns the node handle.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &'a Document {
        self.document
    }

    /// Returns the slot backing this view.
    fn data(&self) -> &'a NodeData {
        self.document.data(self.id)
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> Option<&'a str> {
        self.data().tag.as_deref()
    }

    /// Returns true when the node carries a non-empty tag.
    #[must_use]
    pub fn has_tag(&self) -> bool {
        self.data().tag.is_some()
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> Option<&'a str> {
        self.data().value.as_deref()
    }

    /// Returns true when the node carries a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.data().value.is_some()
    }

    /// Returns the parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| Self {
            document: self.document,
            id,
        })
    }

    /// Returns true for every node except the root.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.data().parent.is_some()
    }

    /// Returns the attributes.
    #[must_use]
    pub fn attributes(&self) -> &'a Attributes {
        &self.data().attributes
    }

    /// Returns true when at least one attribute is stored.
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        !self.data().attributes.is_empty()
    }

    /// Returns a view of the children.
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children {
            document: self.document,
            subset: &self.data().children,
        }
    }

    /// Returns true when at least one child is stored.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.data().children.is_empty()
    }

    /// Returns the key this node is stored under in its parent.
    #[must_use]
    pub fn key(&self) -> Option<&'a str> {
        let parent = self.parent()?;
        let subset = &parent.data().children;
        let position = subset.iter().position(|child| *child == self.id)?;
        subset.key_at(position)
    }

    /// Returns `/` followed by the tags from the root down to this node.
    #[must_use]
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            segments.push(node.tag().unwrap_or(""));
            current = node.parent();
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Resolves `path` relative to this node (`./...`) or its root (`/...`).
    #[must_use]
    pub fn search(&self, path: &str) -> Option<Self> {
        search::search(*self, path)
    }

    /// Returns the number of live nodes in this subtree, including itself.
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        self.document.collect(self.id).len()
    }

    /// Returns a deep copy of this subtree.
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.document.rebuild(&self.document.collect(self.id))
    }

    /// Renders this subtree as indented XML with default options.
    #[must_use]
    pub fn xml(&self) -> String {
        crate::xml::to_xml(*self, &XmlOptions::default())
    }

    /// Renders this subtree as XML on a single line.
    #[must_use]
    pub fn xml_lined(&self) -> String {
        crate::xml::to_xml_lined(*self)
    }

    /// Renders this subtree as compact self-describing JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`] when the subtree is too deep to encode.
    pub fn json(&self) -> Result<String, JsonError> {
        crate::json::to_json(*self, &JsonOptions::default())
    }
}

/// Borrowed view of one node's children.
#[derive(Clone, Copy)]
pub struct Children<'a> {
    /// Owning document.
    document: &'a Document,
    /// Child handles.
    subset: &'a Subset<NodeId>,
}

impl fmt::Debug for Children<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.subset.keys()).finish()
    }
}

impl<'a> Children<'a> {
    /// Wraps `id` in a read view.
    const fn wrap(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef {
            document: self.document,
            id,
        }
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subset.len()
    }

    /// Returns true when there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subset.is_empty()
    }

    /// Returns the first child.
    #[must_use]
    pub fn first(&self) -> Option<NodeRef<'a>> {
        self.subset.first().map(|id| self.wrap(*id))
    }

    /// Returns the child at `position`.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<NodeRef<'a>> {
        self.subset.at(position).map(|id| self.wrap(*id))
    }

    /// Returns the child stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<NodeRef<'a>> {
        self.subset.get(key).map(|id| self.wrap(*id))
    }

    /// Returns true when a child is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.subset.contains_key(key)
    }

    /// Returns true when `id` is one of the children.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.subset.contains(&id)
    }

    /// Iterates over children in insertion order.
    pub fn iter(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let document = self.document;
        self.subset.iter().map(move |id| NodeRef {
            document,
            id: *id,
        })
    }

    /// Iterates over child keys in insertion order.
    pub fn keys(self) -> impl Iterator<Item = &'a str> + 'a {
        self.subset.keys()
    }

    /// Returns children whose tag starts with `prefix`, ignoring case.
    #[must_use]
    pub fn starting_with(&self, prefix: &str) -> Vec<NodeRef<'a>> {
        let prefix = prefix.to_lowercase();
        self.iter()
            .filter(|child| {
                child.tag().is_some_and(|tag| tag.to_lowercase().starts_with(&prefix))
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Mutable Views
// ============================================================================

/// Borrowed mutable view of one live node.
#[derive(Debug)]
pub struct NodeMut<'a> {
    /// Owning document.
    document: &'a mut Document,
    /// Viewed node.
    id: NodeId,
}

impl NodeMut<'_> {
    /// Returns the node handle.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns a read view of the same node.
    #[must_use]
    pub fn view(&self) -> NodeRef<'_> {
        NodeRef {
            document: self.document,
            id: self.id,
        }
    }

    /// Returns the slot backing this view.
    fn data_mut(&mut self) -> &mut NodeData {
        self.document.data_mut(self.id)
    }

    /// Sets the tag; an empty tag clears it. The key in the parent is unchanged.
    pub fn set_tag(&mut self, tag: &str) {
        self.data_mut().tag = if tag.is_empty() { None } else { Some(tag.to_string()) };
    }

    /// Removes the tag.
    pub fn clear_tag(&mut self) {
        self.data_mut().tag = None;
    }

    /// Sets the value under the value rules; returns true when it was stored.
    pub fn set_value(&mut self, value: &str) -> bool {
        let normalized = normalize_value(value);
        let stored = normalized.is_some();
        self.data_mut().value = normalized;
        stored
    }

    /// Removes the value.
    pub fn clear_value(&mut self) {
        self.data_mut().value = None;
    }

    /// Returns the attributes for modification.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.data_mut().attributes
    }

    /// Adds a child tagged `tag`; returns `None` for an empty tag.
    pub fn add_child(&mut self, tag: &str) -> Option<NodeId> {
        if tag.is_empty() {
            return None;
        }
        Some(self.attach(Document::new(tag)))
    }

    /// Adds a child tagged `tag` holding `value`; returns `None` for an empty tag.
    pub fn add_child_value(&mut self, tag: &str, value: &str) -> Option<NodeId> {
        if tag.is_empty() {
            return None;
        }
        Some(self.attach(Document::with_value(tag, value)))
    }

    /// Moves `child` under this node and returns the handle of its root.
    pub fn attach(&mut self, child: Document) -> NodeId {
        let key = child.root_node().tag().unwrap_or("").to_string();
        let moved = self.document.import(self.id, child);
        self.data_mut().children.insert(&key, moved);
        moved
    }

    /// Updates the value of the child stored under `tag`, adding it when absent.
    pub fn set_child(&mut self, tag: &str, value: &str) -> Option<NodeId> {
        if let Some(existing) = self.view().children().get(tag).map(|child| child.id()) {
            self.document.data_mut(existing).value = normalize_value(value);
            return Some(existing);
        }
        self.add_child_value(tag, value)
    }

    /// Stores `child` under its tag, dropping the subtree it replaces.
    ///
    /// Returns the handle of the stored child.
    pub fn replace_child(&mut self, child: Document) -> NodeId {
        let key = child.root_node().tag().unwrap_or("").to_string();
        let moved = self.document.import(self.id, child);
        if let Some(previous) = self.data_mut().children.replace(&key, moved) {
            self.document.kill(previous);
        }
        moved
    }

    /// Removes the child stored under `key` and returns its subtree.
    pub fn remove_child(&mut self, key: &str) -> Option<Document> {
        let id = self.view().children().get(key)?.id();
        self.document.detach(id)
    }

    /// Removes the direct child `id` and returns its subtree.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Document> {
        if !self.view().children().contains(id) {
            return None;
        }
        self.document.detach(id)
    }

    /// Removes every child; returns false when there was nothing to remove.
    pub fn clear_children(&mut self) -> bool {
        let removed = self.data_mut().children.drain();
        let any = !removed.is_empty();
        for child in removed {
            self.document.kill(child);
        }
        any
    }

    /// Returns a mutable view of the child stored under `key`.
    pub fn child_mut(&mut self, key: &str) -> Option<NodeMut<'_>> {
        let id = self.view().children().get(key)?.id();
        Some(NodeMut {
            document: self.document,
            id,
        })
    }
}
