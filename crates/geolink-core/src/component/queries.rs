//! Query methods for ComponentTree

use super::{Component, ComponentTree};

impl ComponentTree {
    // ============== Query Helpers ==============

    /// Find a component by name
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Root component names in creation order
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Direct children of a component, in creation order
    pub fn children(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Get the parent name of a component
    pub fn parent_name(&self, name: &str) -> Option<&str> {
        self.parent.get(name).map(String::as_str)
    }

    /// Get the parent of a component
    pub fn parent(&self, name: &str) -> Option<&Component> {
        self.parent_name(name).and_then(|parent| self.get(parent))
    }

    /// Iterate over all components in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.order.iter().filter_map(|name| self.components.get(name))
    }

    /// Count total number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get a component and all its descendants in depth-first order
    pub fn subtree(&self, name: &str) -> Vec<&Component> {
        let mut result = Vec::new();
        self.collect_depth_first(name, &mut result);
        result
    }

    fn collect_depth_first<'a>(&'a self, name: &str, result: &mut Vec<&'a Component>) {
        if let Some(component) = self.components.get(name) {
            result.push(component);
            for child in self.children(name) {
                self.collect_depth_first(child, result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn sample_tree() -> ComponentTree {
        let mut tree = ComponentTree::new();
        for (name, parent) in [
            ("root", None),
            ("a", Some("root")),
            ("a1", Some("a")),
            ("b", Some("root")),
            ("a2", Some("a")),
        ] {
            tree.create(name, 1, DVec3::ZERO, DVec3::ZERO, parent).unwrap();
        }
        tree
    }

    fn names<'a>(components: &[&'a Component]) -> Vec<&'a str> {
        components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_subtree_follows_creation_order() {
        let tree = sample_tree();
        assert_eq!(names(&tree.subtree("root")), ["root", "a", "a1", "a2", "b"]);
        assert_eq!(names(&tree.subtree("a")), ["a", "a1", "a2"]);
        assert!(tree.subtree("missing").is_empty());
    }

    #[test]
    fn test_parent_and_children() {
        let tree = sample_tree();
        assert_eq!(tree.parent_name("a2"), Some("a"));
        assert_eq!(tree.parent_name("root"), None);
        assert_eq!(tree.parent("a1").map(|c| c.name.as_str()), Some("a"));
        assert!(tree.children("b").is_empty());
    }

    #[test]
    fn test_iter_in_creation_order() {
        let tree = sample_tree();
        let order: Vec<&str> = tree.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["root", "a", "a1", "b", "a2"]);
    }
}
