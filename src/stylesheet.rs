//! In-memory stylesheet tree used by the command line build.
//!
//! The tree is assembled programmatically, directives are replaced in place by
//! [`transform`], and [`Stylesheet::to_css`] renders the result either
//! minified or indented.

use crate::directive::{DirectiveSite, StylesheetBuilder};
use crate::engine::DesignTokenUtils;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule {
        selector: String,
        children: Vec<Node>,
    },
    AtRule {
        name: String,
        params: String,
        /// `None` for statement at-rules terminated by `;`.
        children: Option<Vec<Node>>,
    },
    Declaration {
        property: String,
        value: String,
    },
}

impl Node {
    pub fn rule(selector: &str, children: Vec<Node>) -> Self {
        Node::Rule {
            selector: selector.to_string(),
            children,
        }
    }

    pub fn statement(name: &str, params: &str) -> Self {
        Node::AtRule {
            name: name.to_string(),
            params: params.to_string(),
            children: None,
        }
    }

    pub fn block(name: &str, params: &str, children: Vec<Node>) -> Self {
        Node::AtRule {
            name: name.to_string(),
            params: params.to_string(),
            children: Some(children),
        }
    }

    pub fn declaration(property: &str, value: &str) -> Self {
        Node::Declaration {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn to_css(&self, minify: bool) -> String {
        if minify {
            let mut out = String::new();
            for node in &self.nodes {
                write_minified(node, &mut out);
            }
            out
        } else {
            self.nodes
                .iter()
                .map(|node| {
                    let mut out = String::new();
                    write_pretty(node, 0, &mut out);
                    out
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Builds [`Node`]s for the engine and records warnings.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    pub warnings: Vec<String>,
}

impl StylesheetBuilder for TreeBuilder {
    type Node = Node;

    fn declaration(&mut self, property: &str, value: &str) -> Node {
        Node::declaration(property, value)
    }

    fn rule(&mut self, selector: &str, declarations: Vec<Node>) -> Node {
        Node::rule(selector, declarations)
    }

    fn conditional_block(&mut self, condition: &str, rules: Vec<Node>) -> Node {
        Node::block("media", condition, rules)
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!("{}", message);
        self.warnings.push(message.to_string());
    }
}

/// Replaces every directive in `sheet` the engine recognises and returns the
/// warnings raised on the way.
pub fn transform(sheet: &mut Stylesheet, engine: &DesignTokenUtils) -> Vec<String> {
    let mut builder = TreeBuilder::default();
    transform_nodes(&mut sheet.nodes, true, engine, &mut builder);
    builder.warnings
}

fn transform_nodes(
    nodes: &mut Vec<Node>,
    at_root: bool,
    engine: &DesignTokenUtils,
    builder: &mut TreeBuilder,
) {
    let mut idx = 0;
    while idx < nodes.len() {
        let replacement = match &nodes[idx] {
            Node::AtRule { name, params, .. } => {
                let site = DirectiveSite {
                    name: name.as_str(),
                    params: params.as_str(),
                    at_root,
                };
                engine.dispatch(&site, builder)
            }
            _ => None,
        };

        if let Some(replacement) = replacement {
            let inserted = replacement.len();
            nodes.splice(idx..=idx, replacement);
            // generated nodes are final
            idx += inserted;
            continue;
        }

        match &mut nodes[idx] {
            Node::Rule { children, .. }
            | Node::AtRule {
                children: Some(children),
                ..
            } => transform_nodes(children, false, engine, builder),
            _ => {}
        }
        idx += 1;
    }
}

fn write_minified(node: &Node, out: &mut String) {
    match node {
        Node::Rule { selector, children } => {
            out.push_str(selector);
            write_minified_body(children, out);
        }
        Node::AtRule {
            name,
            params,
            children,
        } => {
            out.push('@');
            out.push_str(name);
            if !params.is_empty() {
                out.push(' ');
                out.push_str(params);
            }
            match children {
                Some(children) => write_minified_body(children, out),
                None => out.push(';'),
            }
        }
        Node::Declaration { property, value } => {
            out.push_str(property);
            out.push(':');
            out.push_str(value);
            out.push(';');
        }
    }
}

fn write_minified_body(children: &[Node], out: &mut String) {
    let mut body = String::new();
    for child in children {
        write_minified(child, &mut body);
    }
    out.push('{');
    out.push_str(body.strip_suffix(';').unwrap_or(&body));
    out.push('}');
}

fn write_pretty(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Rule { selector, children } => {
            out.push_str(&indent);
            out.push_str(selector);
            write_pretty_body(children, depth, out);
        }
        Node::AtRule {
            name,
            params,
            children,
        } => {
            out.push_str(&indent);
            out.push('@');
            out.push_str(name);
            if !params.is_empty() {
                out.push(' ');
                out.push_str(params);
            }
            match children {
                Some(children) => write_pretty_body(children, depth, out),
                None => out.push_str(";\n"),
            }
        }
        Node::Declaration { property, value } => {
            out.push_str(&format!("{}{}: {};\n", indent, property, value));
        }
    }
}

fn write_pretty_body(children: &[Node], depth: usize, out: &mut String) {
    if children.is_empty() {
        out.push_str(" {}\n");
        return;
    }
    out.push_str(" {\n");
    for child in children {
        write_pretty(child, depth + 1, out);
    }
    out.push_str(&"  ".repeat(depth));
    out.push_str("}\n");
}
