//! Help text for the `-l` listing: comments, aliases and flag hints

use std::collections::HashMap;
use std::fmt::Write;

use crate::node::{ConfigNode, Value};
use crate::style::{NAME, Palette};

/// Collect `//` comment lines that directly precede a top-level node.
#[must_use]
pub fn extract_top_level_comments(content: &str) -> HashMap<String, String> {
    let mut comments = HashMap::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut depth: i64 = 0;

    for line in content.lines() {
        let stripped = line.trim();

        if let Some(comment) = stripped.strip_prefix("//") {
            if depth == 0 {
                pending.push(comment.trim());
            }
            continue;
        }

        if depth == 0 && !stripped.is_empty() && !stripped.starts_with(['{', '}']) {
            let token = stripped
                .split(|c: char| c.is_whitespace() || c == '{')
                .next()
                .unwrap_or_default();
            if !token.is_empty() && !pending.is_empty() {
                comments.insert(token.to_string(), pending.join(" "));
            }
            pending.clear();
        }

        let opened = i64::try_from(line.matches('{').count()).unwrap_or(i64::MAX);
        let closed = i64::try_from(line.matches('}').count()).unwrap_or(i64::MAX);
        depth += opened - closed;

        if depth != 0 {
            pending.clear();
        }
    }

    comments
}

/// Target of a subcommand whose whole body is `lus <target> ...`.
#[must_use]
pub fn alias_target(node: &ConfigNode) -> Option<String> {
    if !node.is_subcommand() || node.children.len() != 1 || !node.properties.is_empty() {
        return None;
    }
    let child = &node.children[0];
    if !child.properties.is_empty() {
        return None;
    }
    match child.statement_tokens()?.as_slice() {
        [Value::String(program), Value::String(target), ..] if program == "lus" => {
            Some(target.clone())
        }
        _ => None,
    }
}

/// Alias map for the given sibling list.
#[must_use]
pub fn compute_aliases(nodes: &[ConfigNode]) -> HashMap<String, String> {
    nodes
        .iter()
        .filter_map(|node| alias_target(node).map(|target| (node.name.clone(), target)))
        .collect()
}

/// Render the `-l` listing of `nodes`.
///
/// `comments` are only meaningful at the top level; pass an empty map below it.
/// `aliases` maps a subcommand to the one it delegates to, see [`compute_aliases`].
#[must_use]
pub fn render_listing(
    nodes: &[ConfigNode],
    comments: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
    palette: Palette,
) -> String {
    let entries: Vec<(&ConfigNode, String)> = nodes
        .iter()
        .filter(|n| n.is_subcommand())
        .map(|n| {
            let mut label = n.name.clone();
            for flag in n.flag_names() {
                let _ = write!(label, " [{flag}]");
            }
            (n, label)
        })
        .collect();
    let width = entries
        .iter()
        .map(|(_, label)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Available subcommands:\n");
    for (node, label) in &entries {
        let suffix = if let Some(target) = aliases.get(&node.name) {
            Some(format!("# alias for `{target}`"))
        } else {
            comments.get(&node.name).map(|c| format!("# {c}"))
        };
        let name = palette.paint(NAME, &node.name);
        let hints = &label[node.name.len()..];
        match suffix {
            Some(suffix) => {
                let padding = " ".repeat(width - label.chars().count() + 1);
                let _ = writeln!(out, "    {name}{hints}{padding}{suffix}");
            }
            None => {
                let _ = writeln!(out, "    {name}{hints}");
            }
        }
    }
    out
}
