//! Testing utilities for CBX workspace
//!
//! Fixture builders over `MemoryDocument`.

#![allow(missing_docs)]

use cbx_dom::{Document, Element, MemoryDocument, NodeId};

/// Builder for a constraint box element
#[derive(Debug, Clone)]
pub struct BoxFixture {
    element: Element,
}

impl BoxFixture {
    pub fn new(selectors: &str, constraint: &str) -> Self {
        Self {
            element: Element::new("div")
                .class("cbx")
                .attr("data-selectors", selectors)
                .attr("data-constraint", constraint),
        }
    }

    pub fn param(mut self, param: &str) -> Self {
        self.element = self.element.attr("data-param", param);
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.element = self.element.attr("data-message", message);
        self
    }

    pub fn triggers(mut self, triggers: &str) -> Self {
        self.element = self.element.attr("data-triggers", triggers);
        self
    }

    pub fn insta(mut self) -> Self {
        self.element = self.element.class("cbx--insta");
        self
    }

    pub fn initial(mut self) -> Self {
        self.element = self.element.class("cbx--initial");
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.element = self.element.id(id);
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.element = self.element.class(class);
        self
    }

    pub fn top(mut self, top: f64) -> Self {
        self.element = self.element.top(top);
        self
    }

    pub fn build(self) -> Element {
        self.element
    }

    pub fn append(self, doc: &mut MemoryDocument, parent: NodeId) -> NodeId {
        doc.append(parent, self.element).unwrap()
    }
}

pub fn constraint_box(selectors: &str, constraint: &str) -> BoxFixture {
    BoxFixture::new(selectors, constraint)
}

pub fn form(doc: &mut MemoryDocument) -> NodeId {
    let root = doc.root();
    doc.append(root, Element::new("form")).unwrap()
}

pub fn text_input(doc: &mut MemoryDocument, parent: NodeId, id: &str, value: &str) -> NodeId {
    doc.append(parent, Element::new("input").id(id).attr("name", id).value(value))
        .unwrap()
}

/// Checkboxes `{name}-0..n`, checked where listed
pub fn checkbox_group(
    doc: &mut MemoryDocument,
    parent: NodeId,
    name: &str,
    count: usize,
    checked: &[usize],
) -> Vec<NodeId> {
    (0..count)
        .map(|i| {
            let element = Element::new("input")
                .id(format!("{name}-{i}"))
                .attr("type", "checkbox")
                .attr("name", name)
                .attr("value", format!("v{i}"))
                .checked(checked.contains(&i));
            doc.append(parent, element).unwrap()
        })
        .collect()
}

/// Radios `{name}-0..n` sharing `name`, none checked
pub fn radio_group(
    doc: &mut MemoryDocument,
    parent: NodeId,
    name: &str,
    count: usize,
) -> Vec<NodeId> {
    (0..count)
        .map(|i| {
            let element = Element::new("input")
                .id(format!("{name}-{i}"))
                .attr("type", "radio")
                .attr("name", name)
                .attr("value", format!("v{i}"));
            doc.append(parent, element).unwrap()
        })
        .collect()
}

/// Select with the given option values, `selected` marking the chosen one
pub fn select(
    doc: &mut MemoryDocument,
    parent: NodeId,
    id: &str,
    options: &[&str],
    selected: Option<usize>,
) -> NodeId {
    let select = doc
        .append(parent, Element::new("select").id(id).attr("name", id))
        .unwrap();
    for (i, value) in options.iter().enumerate() {
        doc.append(
            select,
            Element::new("option")
                .attr("value", *value)
                .selected(selected == Some(i)),
        )
        .unwrap();
    }
    select
}

/// Login form: `#user`, `#password` and two required boxes at tops 50 and 120
pub fn login_form() -> (MemoryDocument, NodeId, Vec<NodeId>) {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    text_input(&mut doc, form, "user", "");
    text_input(&mut doc, form, "password", "");
    let boxes = vec![
        constraint_box("#user", "minTextLength")
            .param("1")
            .message("user is required")
            .top(50.0)
            .append(&mut doc, form),
        constraint_box("#password", "minTextLength")
            .param("8")
            .message("%value% of 8 characters")
            .top(120.0)
            .append(&mut doc, form),
    ];
    (doc, form, boxes)
}

pub fn is_visible(doc: &MemoryDocument, node: NodeId) -> bool {
    doc.has_class(node, "cbx--visible")
}
