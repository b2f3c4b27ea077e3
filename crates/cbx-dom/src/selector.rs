//! CSS selector subset
//!
//! Provides [`Selector`], parsed with [`FromStr`] and matched against any
//! [`ElementView`].
//!
//! Supported grammar:
//! - selector lists: `a, b`
//! - combinators: descendant (`a b`) and child (`a > b`)
//! - type selectors and `*`
//! - `#id`, `.class`, `[attr]`, `[attr=value]` (bare, `'single'` or `"double"` quoted)
//! - `:checked`, `:not(<compound>)`

use crate::error::SelectorError;
use crate::node::NodeId;
use smallvec::SmallVec;
use std::str::FromStr;

/// Read access a selector needs to match an element
pub trait ElementView {
    /// Lower-cased tag name
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Parent element
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    /// Attribute value
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Class membership
    fn class_present(&self, node: NodeId, class: &str) -> bool;

    /// Checkedness (for `:checked`)
    fn checkedness(&self, node: NodeId) -> bool;
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Whether `node` matches any alternative
    #[must_use]
    pub fn matches<V: ElementView + ?Sized>(&self, view: &V, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(view, node, complex.parts.len() - 1))
    }

    /// Number of comma-separated alternatives
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always false for a parsed selector
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).selector_list()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators; `parts[i].0` links `parts[i - 1]` to `parts[i]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches_at<V: ElementView + ?Sized>(&self, view: &V, node: NodeId, idx: usize) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(view, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => view
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(view, parent, idx - 1)),
            Combinator::Descendant => {
                let mut ancestor = view.parent_element(node);
                while let Some(candidate) = ancestor {
                    if self.matches_at(view, candidate, idx - 1) {
                        return true;
                    }
                    ancestor = view.parent_element(candidate);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    simple: SmallVec<[Simple; 4]>,
}

impl Compound {
    fn matches<V: ElementView + ?Sized>(&self, view: &V, node: NodeId) -> bool {
        let Some(tag) = view.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simple.iter().all(|simple| simple.matches(view, node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
    Checked,
    Not(Box<Compound>),
}

impl Simple {
    fn matches<V: ElementView + ?Sized>(&self, view: &V, node: NodeId) -> bool {
        match self {
            Self::Id(id) => view.attr(node, "id") == Some(id.as_str()),
            Self::Class(class) => view.class_present(node, class),
            Self::Attr { name, value: None } => view.attr(node, name).is_some(),
            Self::Attr {
                name,
                value: Some(expected),
            } => view.attr(node, name) == Some(expected.as_str()),
            Self::Checked => view.checkedness(node),
            Self::Not(inner) => !inner.matches(view, node),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(self.unexpected(found)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            found,
            position: self.pos,
        }
    }

    /// Returns whether any whitespace was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_ws();
            if matches!(self.peek(), None | Some(',')) {
                return Err(SelectorError::Empty);
            }
            alternatives.push(self.complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(found) => return Err(self.unexpected(found)),
            }
        }
        Ok(Selector { alternatives })
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',' | ')') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(found) => return Err(self.unexpected(found)),
            };
            parts.push((combinator, self.compound()?));
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let start = self.pos;

        if self.eat('*') {
            // universal: no tag constraint
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.simple.push(Simple::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.simple.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.simple.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.simple.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(self.unexpected(found)),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(self.unexpected(found)),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let value = if self.eat('=') {
            self.skip_ws();
            let value = self.attribute_value()?;
            self.skip_ws();
            Some(value)
        } else {
            None
        };
        self.expect(']')?;
        Ok(Simple::Attr { name, value })
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let value = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(value);
                    }
                    self.pos += 1;
                }
                Err(SelectorError::UnexpectedEnd)
            }
            _ => self.ident(),
        }
    }

    fn pseudo(&mut self) -> Result<Simple, SelectorError> {
        let name = self.ident()?;
        match name.as_str() {
            "checked" => Ok(Simple::Checked),
            "not" => {
                self.expect('(')?;
                self.skip_ws();
                let inner = self.compound()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Simple::Not(Box::new(inner)))
            }
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Flat test tree: (tag, parent, attributes, classes, checked)
    #[derive(Default)]
    struct Tree {
        nodes: Vec<(String, Option<usize>, HashMap<String, String>, Vec<String>, bool)>,
    }

    impl Tree {
        fn add(
            &mut self,
            tag: &str,
            parent: Option<usize>,
            attrs: &[(&str, &str)],
            classes: &[&str],
        ) -> NodeId {
            self.nodes.push((
                tag.to_string(),
                parent,
                attrs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
                classes.iter().map(|c| (*c).to_string()).collect(),
                false,
            ));
            NodeId::from_index(self.nodes.len() - 1)
        }
    }

    impl ElementView for Tree {
        fn tag_name(&self, node: NodeId) -> Option<&str> {
            self.nodes.get(node.index()).map(|n| n.0.as_str())
        }
        fn parent_element(&self, node: NodeId) -> Option<NodeId> {
            self.nodes.get(node.index()).and_then(|n| n.1).map(NodeId::from_index)
        }
        fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
            self.nodes.get(node.index()).and_then(|n| n.2.get(name)).map(String::as_str)
        }
        fn class_present(&self, node: NodeId, class: &str) -> bool {
            self.nodes.get(node.index()).is_some_and(|n| n.3.iter().any(|c| c == class))
        }
        fn checkedness(&self, node: NodeId) -> bool {
            self.nodes.get(node.index()).is_some_and(|n| n.4)
        }
    }

    fn sel(s: &str) -> Selector {
        s.parse().unwrap()
    }

    #[test]
    fn parses_selector_list() {
        assert_eq!(sel("#a, .b ,input[name=c]").len(), 3);
    }

    #[test]
    fn rejects_empty_and_dangling() {
        assert_eq!("".parse::<Selector>(), Err(SelectorError::Empty));
        assert_eq!("a,".parse::<Selector>(), Err(SelectorError::Empty));
        assert_eq!("[name".parse::<Selector>(), Err(SelectorError::UnexpectedEnd));
        assert_eq!("[name='x]".parse::<Selector>(), Err(SelectorError::UnexpectedEnd));
        assert!(matches!(
            "a!b".parse::<Selector>(),
            Err(SelectorError::Unexpected { found: '!', position: 1 })
        ));
        assert_eq!(
            "a:hover".parse::<Selector>(),
            Err(SelectorError::UnsupportedPseudo("hover".to_string()))
        );
    }

    #[test]
    fn matches_compound_parts() {
        let mut tree = Tree::default();
        let input = tree.add("input", None, &[("id", "email"), ("name", "mail")], &["wide"]);

        assert!(sel("input").matches(&tree, input));
        assert!(sel("INPUT").matches(&tree, input));
        assert!(sel("*").matches(&tree, input));
        assert!(sel("#email").matches(&tree, input));
        assert!(sel("input.wide#email[name]").matches(&tree, input));
        assert!(sel("[name=\"mail\"]").matches(&tree, input));
        assert!(sel("[name='mail']").matches(&tree, input));
        assert!(!sel("[name=other]").matches(&tree, input));
        assert!(!sel("select").matches(&tree, input));
        assert!(sel("select, .wide").matches(&tree, input));
    }

    #[test]
    fn matches_not_and_checked() {
        let mut tree = Tree::default();
        let visible = tree.add("div", None, &[], &["cbx", "cbx--visible"]);
        let hidden = tree.add("div", None, &[], &["cbx"]);
        let rule = sel(".cbx:not(.cbx--visible)");

        assert!(!rule.matches(&tree, visible));
        assert!(rule.matches(&tree, hidden));

        tree.nodes[hidden.index()].4 = true;
        assert!(sel(":checked").matches(&tree, hidden));
        assert!(!sel("div:checked").matches(&tree, visible));
    }

    #[test]
    fn matches_combinators() {
        let mut tree = Tree::default();
        let form = tree.add("form", None, &[("id", "f")], &[]);
        let fieldset = tree.add("fieldset", Some(form.index()), &[], &[]);
        let input = tree.add("input", Some(fieldset.index()), &[], &[]);

        assert!(sel("form input").matches(&tree, input));
        assert!(sel("#f fieldset > input").matches(&tree, input));
        assert!(sel("form > fieldset input").matches(&tree, input));
        assert!(!sel("form > input").matches(&tree, input));
        assert!(!sel("fieldset form input").matches(&tree, input));
    }
}
