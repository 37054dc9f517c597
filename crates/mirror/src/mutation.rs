//! Mutation result model and its wire mapping.
//!
//! The in-memory shape never varies: all four categories are always
//! present. The compact wire contract (`r` / `am` / `t` / `cN`, each key
//! absent when its list is empty) is enforced only at the serde boundary.
//!
//! Wire records:
//! - `r`: removed subtree-root ids; descendants are implied.
//! - `am`: `{id, at}` where `at` maps attribute name to the new value, or
//!   null for a removal.
//! - `t`: `{id, tC}` text replacements.
//! - `cN`: `{id, pN, nS, tN?, at?, tC?}` created nodes in pre-order;
//!   `nS` is the previous-sibling anchor (null for a first child), `pN`
//!   is null only for a bootstrap root.

use core_types::NodeId;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MutationSet {
    #[serde(rename = "r", skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<NodeId>,
    #[serde(rename = "am", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeChange>,
    #[serde(rename = "t", skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<TextChange>,
    #[serde(rename = "cN", skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<NodeDescriptor>,
}

impl MutationSet {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.attributes.is_empty()
            && self.texts.is_empty()
            && self.created.is_empty()
    }
}

/// Per-node attribute delta. Order is deterministic: changed and added
/// names in current-attribute order, then removed names in
/// previous-attribute order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttrDelta(pub Vec<(String, Option<String>)>);

impl AttrDelta {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttrDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Attribute mapping carried by a created element, in host order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrMap(pub Vec<(String, String)>);

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub id: NodeId,
    #[serde(rename = "at")]
    pub changes: AttrDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChange {
    pub id: NodeId,
    #[serde(rename = "tC")]
    pub text: String,
}

/// Self-contained record of one newly introduced node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    pub id: NodeId,
    #[serde(rename = "pN")]
    pub parent: Option<NodeId>,
    #[serde(rename = "nS")]
    pub previous_sibling: Option<NodeId>,
    #[serde(rename = "tN", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "at", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttrMap>,
    #[serde(rename = "tC", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
