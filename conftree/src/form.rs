//! HTML form generation.
//!
//! Every option appears in the form whatever its activation condition, so a
//! user can flip a controlling checkbox and resubmit.

use std::fmt::Write as _;

use crate::data::{Node, NodeKind, Tree};

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

impl Node<'_> {
    fn label(&self) -> String {
        escape_html(self.description().unwrap_or(self.name()))
    }

    /// Form control for this node alone.
    pub fn form(&self) -> String {
        let path = escape_html(self.path());
        let mut out = String::new();

        match self.kind() {
            NodeKind::Boolean | NodeKind::Plugin { .. } => {
                let checked = if self.value().as_bool() {
                    r#" checked="checked""#
                } else {
                    ""
                };
                let _ = write!(
                    out,
                    r#"<div class="checkbox"><label><input type="checkbox"{checked} id="{path}" name="{path}"/> {}</label></div>"#,
                    self.label()
                );
                // Unchecked boxes are not submitted; the fallback keeps the key present.
                let _ = write!(out, r#"<input type="hidden" value="0" name="{path}">"#);
            }
            NodeKind::String => {
                let value = escape_html(&self.value().to_string());
                let _ = write!(
                    out,
                    r#"<div class="form-group"><label for="{path}">{}:</label><input class="form-control" name="{path}" value="{value}" id="{path}"/></div>"#,
                    self.label()
                );
            }
            NodeKind::Choice { choices } => {
                let _ = write!(
                    out,
                    r#"<div class="form-group"><label for="{path}">{}:</label><select class="form-control" name="{path}" id="{path}">"#,
                    self.label()
                );
                let current = self.value().as_str();
                for choice in choices {
                    let selected = if current == Some(choice.as_str()) {
                        r#" selected="selected""#
                    } else {
                        ""
                    };
                    let choice = escape_html(choice);
                    let _ = write!(out, r#"<option value="{choice}"{selected}>{choice}</option>"#);
                }
                out.push_str("</select></div>");
            }
            NodeKind::Hidden => {}
        }
        out
    }

    /// Form control for this node followed by its indented children.
    pub fn tree_form(&self) -> String {
        let mut out = self.form();
        if !self.children().is_empty() {
            out.push_str(r#"<div class="form-indent">"#);
            for child in self.children().values() {
                out.push_str(&child.tree_form());
            }
            out.push_str("</div>");
        }
        out
    }
}

impl Tree<'_> {
    /// Form markup for the whole tree; the root adds no wrapper of its own.
    pub fn render_form(&self) -> String {
        self.children().values().map(Node::tree_form).collect()
    }
}
