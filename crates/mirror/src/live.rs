//! Live host tree model (the observed side of the mirror).
//!
//! The host owns a tree of reference-counted, interior-mutable nodes and
//! mutates it freely between capture cycles. The engine only reads it.
//!
//! Invariants:
//! - A node handle stays the same `Rc` for as long as the host keeps the
//!   node in the tree; identity allocation depends on this.
//! - A node appears at most once in the tree (no sharing, no cycles).
//! - Element and attribute names are expected to be canonical
//!   ASCII-lowercase; attribute names are unique per element.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Shared handle to one live node.
pub type LiveHandle = Rc<RefCell<LiveNode>>;

#[derive(Debug)]
pub enum LiveNode {
    Element {
        tag: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
        children: Vec<LiveHandle>,
    },
    Text {
        text: String,
    },
    /// Present in real host trees but outside the mirror contract; the
    /// snapshot layer rejects it as an unsupported kind.
    Comment {
        text: String,
    },
}

impl LiveNode {
    pub fn element(tag: &str) -> LiveHandle {
        Rc::new(RefCell::new(LiveNode::Element {
            tag: Arc::from(tag),
            attributes: Vec::new(),
            children: Vec::new(),
        }))
    }

    pub fn text(text: &str) -> LiveHandle {
        Rc::new(RefCell::new(LiveNode::Text {
            text: text.to_string(),
        }))
    }

    pub fn comment(text: &str) -> LiveHandle {
        Rc::new(RefCell::new(LiveNode::Comment {
            text: text.to_string(),
        }))
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            LiveNode::Element { .. } => "element",
            LiveNode::Text { .. } => "text",
            LiveNode::Comment { .. } => "comment",
        }
    }

    pub fn children(&self) -> &[LiveHandle] {
        match self {
            LiveNode::Element { children, .. } => children,
            LiveNode::Text { .. } | LiveNode::Comment { .. } => &[],
        }
    }

    /// Sets or replaces an attribute, preserving first-set order.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let LiveNode::Element { attributes, .. } = self else {
            return;
        };
        for (existing, existing_value) in attributes.iter_mut() {
            if existing.as_ref() == name {
                *existing_value = value.to_string();
                return;
            }
        }
        attributes.push((Arc::from(name), value.to_string()));
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if let LiveNode::Element { attributes, .. } = self {
            attributes.retain(|(existing, _)| existing.as_ref() != name);
        }
    }

    pub fn set_text(&mut self, new_text: &str) {
        if let LiveNode::Text { text } = self {
            *text = new_text.to_string();
        }
    }

    pub fn append_child(&mut self, child: &LiveHandle) {
        if let LiveNode::Element { children, .. } = self {
            children.push(Rc::clone(child));
        }
    }

    pub fn insert_child(&mut self, index: usize, child: &LiveHandle) {
        if let LiveNode::Element { children, .. } = self {
            let index = index.min(children.len());
            children.insert(index, Rc::clone(child));
        }
    }

    /// Detaches a child by handle identity. Returns false when absent.
    pub fn remove_child(&mut self, child: &LiveHandle) -> bool {
        let LiveNode::Element { children, .. } = self else {
            return false;
        };
        let before = children.len();
        children.retain(|existing| !Rc::ptr_eq(existing, child));
        children.len() != before
    }
}
