//! Canonical in-memory form of the task tree
//!
//! The KDL document is converted once into a tree of [`ConfigNode`]s so the
//! resolver never has to look at parser types.

use std::collections::BTreeMap;
use std::fmt;

use kdl::{KdlDocument, KdlNode, KdlValue};

/// Node names reserved for inline statements
pub const STATEMENT_MARKERS: [&str; 2] = ["$", "-"];

/// A normalized scalar from the task file
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i128),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Collapse integral floats into integers, leave everything else untouched.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn normalize_value(value: &KdlValue) -> Value {
    match value {
        KdlValue::String(s) => Value::String(s.clone()),
        KdlValue::Integer(i) => Value::Integer(*i),
        KdlValue::Float(x) if x.is_finite() && x.fract() == 0.0 => Value::Integer(*x as i128),
        KdlValue::Float(x) => Value::Float(*x),
        KdlValue::Bool(b) => Value::Bool(*b),
        KdlValue::Null => Value::Null,
    }
}

/// Property map of a node. Later duplicates of a key win.
pub type Properties = BTreeMap<String, Value>;

/// A single node of the task tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode {
    pub name: String,
    pub args: Vec<Value>,
    pub properties: Properties,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Whether the node is an inline statement rather than a subcommand or flag.
    ///
    /// `$`/`-` nodes always are; any other childless node carrying positional
    /// arguments is one too, with its name as the first token.
    #[must_use]
    pub fn is_statement(&self) -> bool {
        STATEMENT_MARKERS.contains(&self.name.as_str())
            || (self.children.is_empty() && !self.args.is_empty())
    }

    /// Raw tokens of a statement node, or `None` for named nodes.
    ///
    /// An empty vector means a property-only statement.
    #[must_use]
    pub fn statement_tokens(&self) -> Option<Vec<Value>> {
        if !self.is_statement() {
            return None;
        }
        if STATEMENT_MARKERS.contains(&self.name.as_str()) {
            return Some(self.args.clone());
        }
        let mut tokens = Vec::with_capacity(self.args.len() + 1);
        tokens.push(Value::String(self.name.clone()));
        tokens.extend(self.args.iter().cloned());
        Some(tokens)
    }

    /// Named child that can be selected as a subcommand or listed in help.
    #[must_use]
    pub fn is_subcommand(&self) -> bool {
        !self.name.is_empty() && !self.name.starts_with('-') && !self.is_statement()
    }

    /// Flag-style children (`--release { ... }`) accepted by this node.
    #[must_use]
    pub fn flag_names(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|c| c.name.starts_with('-') && !c.is_statement())
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl From<&KdlNode> for ConfigNode {
    fn from(node: &KdlNode) -> Self {
        let mut args = Vec::new();
        let mut properties = Properties::new();
        for entry in node.entries() {
            let value = normalize_value(entry.value());
            match entry.name() {
                Some(key) => {
                    properties.insert(key.value().to_string(), value);
                }
                None => args.push(value),
            }
        }
        ConfigNode {
            name: node.name().value().to_string(),
            args,
            properties,
            children: node.children().map(normalize_document).unwrap_or_default(),
        }
    }
}

/// Normalize every node of a parsed document.
#[must_use]
pub fn normalize_document(document: &KdlDocument) -> Vec<ConfigNode> {
    document.nodes().iter().map(ConfigNode::from).collect()
}
