//! Instance / app type / status hierarchy

use appdash_core::records::Dataset;
use serde::Serialize;

/// Hierarchical node; a parent's value is the sum of its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub value: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: 0,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Follow child labels from this node
    pub fn find(&self, path: &[&str]) -> Option<&TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self
                .children
                .iter()
                .find(|child| child.label == *head)?
                .find(rest),
        }
    }

    fn child_mut(&mut self, label: &str) -> &mut TreeNode {
        let idx = match self.children.binary_search_by(|child| child.label.as_str().cmp(label)) {
            Ok(idx) => idx,
            Err(idx) => {
                self.children.insert(idx, TreeNode::new(label));
                idx
            }
        };
        &mut self.children[idx]
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }
}

/// Root label of the hierarchy
pub const ROOT_LABEL: &str = "All Instances";

/// Group records by instance, then app type, then status
///
/// Siblings are sorted by label. Each leaf holds the number of records with
/// that exact combination.
pub fn hierarchy(dataset: &Dataset) -> TreeNode {
    let mut root = TreeNode::new(ROOT_LABEL);
    for record in dataset {
        root.value += 1;
        let instance = root.child_mut(&record.instance_name);
        instance.value += 1;
        let app_type = instance.child_mut(&record.app_type);
        app_type.value += 1;
        app_type.child_mut(&record.app_status).value += 1;
    }
    root
}
