//! In-memory document
//!
//! Provides [`MemoryDocument`], an arena-backed [`Document`] built in code
//! through [`Element`] or decoded from a JSON [`ElementSnapshot`].
//!
//! Layout is not computed: each element carries an explicit `top` and a
//! `hidden` flag. An element is rendered when neither it nor any ancestor is
//! hidden or selected by an installed [`HideRule`].

use crate::document::{Document, HideRule, RuleId};
use crate::error::DocumentError;
use crate::node::NodeId;
use crate::selector::{ElementView, Selector};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const ROOT_TAG: &str = "#document";

/// Element description used to build a [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    /// Tag name
    pub tag: String,
    /// Attributes (`id` and `data-*` included, `class` excluded)
    pub attributes: IndexMap<String, String>,
    /// Class list
    pub classes: Vec<String>,
    /// Live value of an input or textarea
    pub value: Option<String>,
    /// Checkbox / radio state
    pub checked: bool,
    /// Option state
    pub selected: bool,
    /// Excluded from layout
    pub hidden: bool,
    /// Top edge of the bounding box
    pub top: f64,
    /// Displayed text content
    pub text: Option<String>,
}

impl Element {
    /// Create element with tag
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// With `id` attribute
    #[inline]
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// With class
    #[inline]
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// With attribute
    #[inline]
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// With live value
    #[inline]
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// With checked state
    #[inline]
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// With selected state
    #[inline]
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// With hidden flag
    #[inline]
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// With top edge
    #[inline]
    #[must_use]
    pub fn top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }

    /// With text content
    #[inline]
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Serialized element tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// The element itself
    #[serde(flatten)]
    pub element: Element,
    /// Child elements in document order
    #[serde(default)]
    pub children: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    hide_rules: IndexMap<RuleId, (HideRule, Option<Arc<Selector>>)>,
    next_rule: u64,
    scroll: Option<(f64, f64)>,
    selectors: Mutex<HashMap<String, Option<Arc<Selector>>>>,
}

impl MemoryDocument {
    /// Create document holding only the root
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                element: Element::new(ROOT_TAG),
                parent: None,
                children: Vec::new(),
            }],
            hide_rules: IndexMap::new(),
            next_rule: 0,
            scroll: None,
            selectors: Mutex::new(HashMap::new()),
        }
    }

    /// Build document from snapshots of the root's children
    pub fn from_snapshots(children: Vec<ElementSnapshot>) -> Result<Self, DocumentError> {
        let mut doc = Self::new();
        let root = doc.root();
        let mut pending: Vec<(NodeId, ElementSnapshot)> =
            children.into_iter().rev().map(|child| (root, child)).collect();

        while let Some((parent, snapshot)) = pending.pop() {
            let id = doc.append(parent, snapshot.element)?;
            pending.extend(snapshot.children.into_iter().rev().map(|child| (id, child)));
        }
        Ok(doc)
    }

    /// Decode document from JSON (a single element or an array of elements)
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Top {
            Many(Vec<ElementSnapshot>),
            One(ElementSnapshot),
        }

        match serde_json::from_str::<Top>(json)? {
            Top::Many(children) => Self::from_snapshots(children),
            Top::One(child) => Self::from_snapshots(vec![child]),
        }
    }

    /// Read and decode a JSON snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Append element as last child of `parent`
    pub fn append(
        &mut self,
        parent: NodeId,
        mut element: Element,
    ) -> Result<NodeId, DocumentError> {
        if self.node(parent).is_none() {
            return Err(DocumentError::UnknownNode(parent));
        }
        element.tag = element.tag.to_ascii_lowercase();

        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Number of elements, root included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Element description of `node`
    #[inline]
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.node(node).map(|n| &n.element)
    }

    /// First element with `id`
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.attr(node, "id") == Some(id))
    }

    /// Children of `node`
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], |n| n.children.as_slice())
    }

    /// Displayed text content
    #[inline]
    #[must_use]
    pub fn content(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|e| e.text.as_deref())
    }

    /// Last viewport position passed to [`Document::scroll_to`]
    #[inline]
    #[must_use]
    pub fn last_scroll(&self) -> Option<(f64, f64)> {
        self.scroll
    }

    /// Installed hide rules in installation order
    pub fn hide_rules(&self) -> impl Iterator<Item = &HideRule> {
        self.hide_rules.values().map(|(rule, _)| rule)
    }

    /// Set the live value of a field
    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.element.value = Some(value.into());
        }
    }

    /// Set checked state
    ///
    /// Checking a radio unchecks every other radio of the same name in the
    /// same form, as a browser does.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if checked && self.field_type(node).as_deref() == Some("radio") {
            for sibling in self.radio_group(node) {
                if let Some(n) = self.node_mut(sibling) {
                    n.element.checked = false;
                }
            }
        }
        if let Some(n) = self.node_mut(node) {
            n.element.checked = checked;
        }
    }

    /// Set selected state of an option
    ///
    /// Selecting an option of a single select deselects its siblings.
    pub fn set_selected(&mut self, node: NodeId, selected: bool) {
        if selected {
            let single = self
                .closest(node, "select")
                .filter(|&select| self.attr(select, "multiple").is_none());
            if let Some(select) = single {
                for option in self.options(select) {
                    if let Some(n) = self.node_mut(option) {
                        n.element.selected = false;
                    }
                }
            }
        }
        if let Some(n) = self.node_mut(node) {
            n.element.selected = selected;
        }
    }

    /// Set hidden flag
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(n) = self.node_mut(node) {
            n.element.hidden = hidden;
        }
    }

    /// Set top edge
    pub fn set_top(&mut self, node: NodeId, top: f64) {
        if let Some(n) = self.node_mut(node) {
            n.element.top = top;
        }
    }

    fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index())
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node.index())
    }

    /// Strict descendants of `scope` in document order
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn radio_group(&self, radio: NodeId) -> Vec<NodeId> {
        let Some(name) = self.attr(radio, "name") else {
            return Vec::new();
        };
        let form = self.form_of(radio);
        self.descendants(form.unwrap_or_else(|| self.root()))
            .into_iter()
            .filter(|&n| {
                self.attr(n, "name") == Some(name)
                    && self.field_type(n).as_deref() == Some("radio")
                    && self.form_of(n) == form
            })
            .collect()
    }

    /// Parse once per distinct selector string
    fn selector(&self, selector: &str) -> Option<Arc<Selector>> {
        let mut cache = self.selectors.lock();
        if let Some(parsed) = cache.get(selector) {
            return parsed.clone();
        }
        let parsed = match selector.parse::<Selector>() {
            Ok(parsed) => Some(Arc::new(parsed)),
            Err(error) => {
                tracing::warn!(selector, %error, "unparseable selector matches nothing");
                None
            }
        };
        cache.insert(selector.to_string(), parsed.clone());
        parsed
    }

    fn hidden_by_rule(&self, node: NodeId) -> bool {
        self.hide_rules
            .values()
            .filter_map(|(_, parsed)| parsed.as_deref())
            .any(|selector| selector.matches(self, node))
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementView for MemoryDocument {
    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    fn class_present(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn checkedness(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.checked || e.selected)
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId::from_index(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_element(node)
    }

    fn query_all(&self, selector: &str, scope: Option<NodeId>) -> Vec<NodeId> {
        let Some(parsed) = self.selector(selector) else {
            return Vec::new();
        };
        self.descendants(scope.unwrap_or_else(|| self.root()))
            .into_iter()
            .filter(|&node| parsed.matches(self, node))
            .collect()
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.selector(selector)
            .is_some_and(|parsed| parsed.matches(self, node))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        if name == "class" {
            return self.element(node).map(|e| e.classes.join(" "));
        }
        self.attr(node, name).map(str::to_string)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_present(node, class)
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        let classes = &mut n.element.classes;
        let present = classes.iter().any(|c| c == class);
        if on && !present {
            classes.push(class.to_string());
        } else if !on && present {
            classes.retain(|c| c != class);
        }
    }

    fn value(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        match element.tag.as_str() {
            "select" => self
                .options(node)
                .into_iter()
                .find(|&option| self.is_selected(option))
                .map(|option| self.value(option))
                .unwrap_or_default(),
            "option" => element
                .attributes
                .get("value")
                .cloned()
                .or_else(|| element.text.clone())
                .unwrap_or_default(),
            "input" | "textarea" => element
                .value
                .clone()
                .or_else(|| element.attributes.get("value").cloned())
                .unwrap_or_else(|| match self.field_type(node).as_deref() {
                    Some("checkbox" | "radio") => "on".to_string(),
                    _ => String::new(),
                }),
            _ => String::new(),
        }
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.checked)
    }

    fn is_selected(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.selected)
    }

    fn field_type(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        match element.tag.as_str() {
            "input" => Some(
                element
                    .attributes
                    .get("type")
                    .map_or_else(|| "text".to_string(), |t| t.to_ascii_lowercase()),
            ),
            "select" if element.attributes.contains_key("multiple") => {
                Some("select-multiple".to_string())
            }
            "select" => Some("select-one".to_string()),
            "textarea" => Some("textarea".to_string()),
            _ => None,
        }
    }

    fn options(&self, node: NodeId) -> Vec<NodeId> {
        if self.tag_name(node) != Some("select") {
            return Vec::new();
        }
        self.descendants(node)
            .into_iter()
            .filter(|&n| self.tag_name(n) == Some("option"))
            .collect()
    }

    fn set_content(&mut self, node: NodeId, content: &str) {
        if let Some(n) = self.node_mut(node) {
            n.element.text = Some(content.to_string());
        }
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        if self.node(node).is_none() {
            return false;
        }
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == self.root() {
                return true;
            }
            let hidden = self.element(candidate).is_some_and(|e| e.hidden);
            if hidden || self.hidden_by_rule(candidate) {
                return false;
            }
            current = self.parent_element(candidate);
        }
        true
    }

    fn top(&self, node: NodeId) -> f64 {
        self.element(node).map_or(0.0, |e| e.top)
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = Some((x, y));
    }

    fn install_hide_rule(&mut self, rule: &HideRule) -> RuleId {
        let id = RuleId(self.next_rule);
        self.next_rule += 1;
        let parsed = self.selector(&rule.selector);
        self.hide_rules.insert(id, (rule.clone(), parsed));
        id
    }

    fn remove_hide_rule(&mut self, id: RuleId) -> bool {
        self.hide_rules.shift_remove(&id).is_some()
    }
}
