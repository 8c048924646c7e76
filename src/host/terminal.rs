//! Terminal output for a [`MemoryHost`] tree.
//!
//! Draws the committed host tree as an indented outline:
//!
//! ```text
//! div id="app"
//!   h1
//!     "Hello"
//! ```
//!
//! Element names are bold, attributes dim, text in the default color. All output
//! is queued and flushed once.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::types::{TEXT_KIND, TEXT_VALUE_KEY};

use super::memory::{MemoryHost, NodeId};

const INDENT: &str = "  ";

/// Paint the children of `root` as an outline.
pub fn paint<W: Write>(host: &MemoryHost, root: NodeId, out: &mut W) -> io::Result<()> {
    for &child in host.children(root) {
        paint_node(host, child, 0, out)?;
    }
    out.flush()
}

/// Clear the screen, then paint from the top-left corner.
pub fn paint_screen<W: Write>(host: &MemoryHost, root: NodeId, out: &mut W) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    paint(host, root, out)
}

fn paint_node<W: Write>(
    host: &MemoryHost,
    id: NodeId,
    depth: usize,
    out: &mut W,
) -> io::Result<()> {
    let Some(node) = host.node(id) else {
        return Ok(());
    };
    queue!(out, Print(INDENT.repeat(depth)))?;

    if node.kind == TEXT_KIND {
        let value = node
            .attributes
            .get(TEXT_VALUE_KEY)
            .map(ToString::to_string)
            .unwrap_or_default();
        queue!(out, Print(format!("{value:?}")), Print("\r\n"))?;
        return Ok(());
    }

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        SetForegroundColor(Color::Cyan),
        Print(&node.kind),
        ResetColor,
        SetAttribute(Attribute::Reset),
    )?;
    for (key, value) in &node.attributes {
        queue!(
            out,
            SetAttribute(Attribute::Dim),
            Print(format!(" {key}=\"{value}\"")),
            SetAttribute(Attribute::Reset),
        )?;
    }
    for event in node.handlers.keys() {
        queue!(
            out,
            SetForegroundColor(Color::Yellow),
            Print(format!(" @{event}")),
            ResetColor,
        )?;
    }
    queue!(out, Print("\r\n"))?;

    for &child in &node.children {
        paint_node(host, child, depth + 1, out)?;
    }
    Ok(())
}
