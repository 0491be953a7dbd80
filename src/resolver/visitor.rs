//! Hooks into the dependency tree walk.
//!
//! Visitors observe accepted components as the walker enters and leaves
//! them. Every hook has an empty default so implementors override only what
//! they need. Visitors never influence traversal.

use tracing::info;

use super::artifact_graph::ResolvedComponent;

pub trait DependencyTreeVisitor {
    fn before_all_roots(&mut self) {}

    fn after_all_roots(&mut self) {}

    fn enter_root_artifact(&mut self, _component: &ResolvedComponent) {}

    fn leave_root_artifact(&mut self, _component: &ResolvedComponent) {}

    fn enter_dependency(&mut self, _component: &ResolvedComponent) {}

    fn leave_dependency(&mut self, _component: &ResolvedComponent) {}

    fn enter_parent_manifest(&mut self, _component: &ResolvedComponent) {}

    fn leave_parent_manifest(&mut self, _component: &ResolvedComponent) {}

    fn enter_manifest_import(&mut self, _component: &ResolvedComponent) {}

    fn leave_manifest_import(&mut self, _component: &ResolvedComponent) {}
}

/// Renders each traversed tree as indented text and logs it at `info`.
#[derive(Debug, Default)]
pub struct LoggingTreeVisitor {
    depth: usize,
    lines: Vec<String>,
    rendered: Vec<String>,
}

impl LoggingTreeVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered trees, one string per root.
    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }

    fn push(&mut self, marker: &str, component: &ResolvedComponent) {
        let indent = "  ".repeat(self.depth);
        let line = format!(
            "{indent}{marker}{} [{}]",
            component.coords().to_compact_string(),
            component.release_id()
        );
        self.lines.push(line);
        self.depth += 1;
    }

    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl DependencyTreeVisitor for LoggingTreeVisitor {
    fn enter_root_artifact(&mut self, component: &ResolvedComponent) {
        self.lines.clear();
        self.depth = 0;
        self.push("", component);
    }

    fn leave_root_artifact(&mut self, _component: &ResolvedComponent) {
        self.pop();
        let tree = self.lines.join("\n");
        info!("Dependency tree:\n{}", tree);
        self.rendered.push(tree);
        self.lines.clear();
    }

    fn enter_dependency(&mut self, component: &ResolvedComponent) {
        self.push("", component);
    }

    fn leave_dependency(&mut self, _component: &ResolvedComponent) {
        self.pop();
    }

    fn enter_parent_manifest(&mut self, component: &ResolvedComponent) {
        self.push("parent ", component);
    }

    fn leave_parent_manifest(&mut self, _component: &ResolvedComponent) {
        self.pop();
    }

    fn enter_manifest_import(&mut self, component: &ResolvedComponent) {
        self.push("import ", component);
    }

    fn leave_manifest_import(&mut self, _component: &ResolvedComponent) {
        self.pop();
    }
}
