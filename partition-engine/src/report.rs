// SPDX-License-Identifier: GPL-3.0-only

//! Hierarchical run report.
//!
//! One node per run/operation/job; parent-child nesting mirrors the
//! operation-to-job containment. Rendered output is used for both UI display
//! and audit logging.

#[derive(Debug, Clone, Default)]
pub struct Report {
    text: String,
    children: Vec<Report>,
}

impl Report {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Root node for a whole commit pass
    pub fn new_root() -> Self {
        Self::new("Run")
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Report] {
        &self.children
    }

    /// Append a nested report node and return it for further nesting
    pub fn child(&mut self, text: impl Into<String>) -> &mut Report {
        self.children.push(Report::new(text));
        // push above guarantees a last element
        self.children.last_mut().unwrap()
    }

    /// Append a leaf line
    pub fn line(&mut self, text: impl Into<String>) {
        self.children.push(Report::new(text));
    }

    /// Render the tree as indented text, one line per node
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.text);
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}
