//! Token tree flattening.
//!
//! A token tree is an ordered mapping whose leaves are strings, numbers or
//! lists of scalars. [`flatten`] walks it depth-first and produces one
//! [`TokenRecord`] per leaf, carrying the generated custom-property name and
//! the branch metadata the utility class expander and the directive filter
//! need.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::case::kebab_case;
use crate::config::CustomPropertyScope;
use crate::error::{Result, TokenError};

pub type TokenTree = IndexMap<String, TokenNode>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenNode {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<TokenScalar>),
    Group(TokenTree),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenScalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for TokenScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScalar::Number(value) => f.write_str(&format_number(*value)),
            TokenScalar::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for TokenNode {
    fn from(value: &str) -> Self {
        TokenNode::Text(value.to_string())
    }
}

impl From<f64> for TokenNode {
    fn from(value: f64) -> Self {
        TokenNode::Number(value)
    }
}

impl From<TokenTree> for TokenNode {
    fn from(value: TokenTree) -> Self {
        TokenNode::Group(value)
    }
}

/// One flattened token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Leaf key as written in the tree.
    pub name: String,
    /// Dotted path with branch prefixes applied, before naming.
    pub path: String,
    /// Generated custom-property name, `--<kebab path>`.
    pub prop: String,
    pub value: String,
    /// Dotted id of the branch that directly contains this leaf.
    pub parent_id: Option<String>,
    pub group: Option<String>,
}

impl TokenRecord {
    pub fn var_reference(&self) -> String {
        format!("var({})", self.prop)
    }
}

/// Prefix and group assignments for token branches, keyed by branch id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenScopes {
    prefixes: HashMap<String, String>,
    groups: HashMap<String, String>,
}

impl TokenScopes {
    pub fn new(scopes: &[CustomPropertyScope]) -> Self {
        let mut prefixes = HashMap::new();
        let mut groups = HashMap::new();
        for scope in scopes {
            if let Some(prefix) = scope.prefix.as_ref() {
                prefixes.insert(scope.id.clone(), prefix.clone());
            }
            if let Some(group) = scope.group.as_ref() {
                groups.insert(scope.id.clone(), group.clone());
            }
        }
        Self { prefixes, groups }
    }

    /// Prefix used for the children of branch `id`; the id itself unless a
    /// prefix was configured.
    pub fn resolve_prefix<'a>(&'a self, id: &'a str) -> &'a str {
        self.prefixes.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn group(&self, id: &str) -> Option<&str> {
        self.groups.get(id).map(String::as_str)
    }
}

/// Reduces a leaf candidate to its serialized value.
///
/// Returns `None` for anything that is not a leaf; the flattener descends into
/// groups and drops the rest. Zero and the empty string are values.
pub fn normalize_value(node: &TokenNode) -> Option<String> {
    match node {
        TokenNode::Text(value) => Some(value.clone()),
        TokenNode::Number(value) => Some(format_number(*value)),
        TokenNode::List(items) => Some(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        TokenNode::Group(_) | TokenNode::Flag(_) | TokenNode::Null => None,
    }
}

/// Renders a number the way CSS authors write it: shortest round-trip digits,
/// `0` for negative zero, and exponent form (`1e+21`, `1e-7`) outside
/// `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.is_nan() || (1e-6..1e21).contains(&value.abs()) {
        return value.to_string();
    }
    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

pub fn property_name(path: &str) -> String {
    format!("--{}", kebab_case(path))
}

/// Flattens `tree` into records in the tree's own key order.
///
/// Fails when two leaves end up with the same custom-property name.
pub fn flatten(tree: &TokenTree, scopes: &TokenScopes) -> Result<Vec<TokenRecord>> {
    let mut records = Vec::new();
    walk(tree, None, None, scopes, &mut records);
    ensure_unique_properties(&records)?;
    tracing::debug!(records = records.len(), "flattened design tokens");
    Ok(records)
}

fn walk(
    tree: &TokenTree,
    parent_id: Option<&str>,
    inherited_group: Option<&str>,
    scopes: &TokenScopes,
    out: &mut Vec<TokenRecord>,
) {
    let prefix = parent_id.map(|id| scopes.resolve_prefix(id));
    let group = inherited_group.or_else(|| parent_id.and_then(|id| scopes.group(id)));

    for (key, node) in tree {
        let path = match prefix {
            None | Some("") => key.clone(),
            Some(prefix) => format!("{}.{}", prefix, key),
        };

        match normalize_value(node) {
            Some(value) => out.push(TokenRecord {
                name: key.clone(),
                prop: property_name(&path),
                path,
                value,
                parent_id: parent_id.map(str::to_string),
                group: group.map(str::to_string),
            }),
            None => {
                if let TokenNode::Group(children) = node {
                    walk(children, Some(&path), group, scopes, out);
                }
            }
        }
    }
}

fn ensure_unique_properties(records: &[TokenRecord]) -> Result<()> {
    let mut seen = HashMap::<&str, &str>::new();
    for record in records {
        if let Some(first) = seen.insert(record.prop.as_str(), record.path.as_str()) {
            return Err(TokenError::DuplicateProperty {
                name: record.prop.clone(),
                first: first.to_string(),
                second: record.path.clone(),
            });
        }
    }
    Ok(())
}
