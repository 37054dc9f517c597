//! Deterministic snapshot rendering for diagnostics and test comparisons.
//! Not a stable format.

use crate::snapshot::{MirrorContent, Snapshot};
use core_types::NodeId;
use std::fmt::Write;

#[derive(Clone, Copy, Debug)]
pub struct DumpOptions {
    pub include_ids: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self { include_ids: true }
    }
}

pub fn render(snapshot: &Snapshot, options: DumpOptions) -> String {
    render_lines(snapshot, options).join("\n")
}

pub fn render_lines(snapshot: &Snapshot, options: DumpOptions) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.len());
    walk(snapshot, snapshot.root(), 0, &options, &mut lines);
    lines
}

fn walk(
    snapshot: &Snapshot,
    id: NodeId,
    depth: usize,
    options: &DumpOptions,
    out: &mut Vec<String>,
) {
    let Some(node) = snapshot.get(id) else {
        out.push(format!("{}<missing {id}>", "  ".repeat(depth)));
        return;
    };
    let mut line = "  ".repeat(depth);
    match &node.content {
        MirrorContent::Element { tag, attributes } => {
            line.push('<');
            line.push_str(tag);
            for (name, value) in attributes {
                let _ = write!(line, " {name}=\"");
                write_escaped(&mut line, value);
                line.push('"');
            }
            line.push('>');
        }
        MirrorContent::Text { text } => {
            line.push('"');
            write_escaped(&mut line, text);
            line.push('"');
        }
    }
    if options.include_ids {
        let _ = write!(line, " {id}");
    }
    out.push(line);
    for child in &node.children {
        walk(snapshot, *child, depth + 1, options, out);
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
}
