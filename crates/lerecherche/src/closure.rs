// Category subtree expansion

use crate::error::Result;
use lecatalogue::{CategoryRecord, CategoryStore, Storage};
use std::collections::HashSet;

/// Source of parent/child links between categories
pub trait CategoryHierarchy {
    /// Direct children of any of the given categories
    fn children_of(&self, parent_ids: &[String]) -> Result<Vec<String>>;
}

impl CategoryHierarchy for Storage {
    fn children_of(&self, parent_ids: &[String]) -> Result<Vec<String>> {
        Ok(CategoryStore::new(self).children_of(parent_ids)?)
    }
}

impl CategoryHierarchy for [CategoryRecord] {
    fn children_of(&self, parent_ids: &[String]) -> Result<Vec<String>> {
        Ok(self
            .iter()
            .filter(|c| {
                !c.is_root()
                    && c.parent_id
                        .as_ref()
                        .is_some_and(|parent| parent_ids.contains(parent))
            })
            .map(|c| c.id.clone())
            .collect())
    }
}

/// Expands a category into itself plus every descendant
///
/// Breadth-first over parent links with a visited set. The node and depth
/// bounds keep corrupted (cyclic or runaway) hierarchies finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryClosureResolver {
    max_nodes: usize,
    max_depth: usize,
}

impl Default for CategoryClosureResolver {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_depth: 64,
        }
    }
}

impl CategoryClosureResolver {
    /// Resolver with default bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum closure size
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }

    /// Set the maximum number of levels below the root
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Closure of `category_id`, in breadth-first order
    ///
    /// Always starts with `category_id`, even when it does not exist.
    pub fn resolve<H>(&self, hierarchy: &H, category_id: &str) -> Result<Vec<String>>
    where
        H: CategoryHierarchy + ?Sized,
    {
        let mut closure = vec![category_id.to_string()];
        let mut visited: HashSet<String> = closure.iter().cloned().collect();
        let mut frontier = closure.clone();
        let mut depth = 0;

        while !frontier.is_empty() {
            if depth >= self.max_depth {
                tracing::warn!(
                    "Category closure for {} stopped at depth {}",
                    category_id,
                    depth
                );
                break;
            }

            let mut next = Vec::new();
            for child in hierarchy.children_of(&frontier)? {
                if closure.len() >= self.max_nodes {
                    tracing::warn!(
                        "Category closure for {} capped at {} nodes",
                        category_id,
                        self.max_nodes
                    );
                    return Ok(closure);
                }
                if visited.insert(child.clone()) {
                    closure.push(child.clone());
                    next.push(child);
                }
            }

            frontier = next;
            depth += 1;
        }

        tracing::debug!("Category {} expands to {} ids", category_id, closure.len());
        Ok(closure)
    }
}
