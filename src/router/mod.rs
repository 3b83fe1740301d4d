//! Method-aware routing over radix trees.
//!
//! Every HTTP method gets its own [`PathTree`], created on first use.
//! Lookups are purely literal: there are no parameters or wildcards.

mod tree;
mod tests;

use std::collections::HashMap;

use crate::parser::Method;

pub use tree::{PathTree, TreeNode};

/// Per-method collection of path trees.
#[derive(Debug, Clone)]
pub struct Router<T> {
    trees: HashMap<Method, PathTree<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    /// Register `handler` for `method` and `path`.
    ///
    /// Returns the handler previously registered for the same pair; the new
    /// one replaces it.
    pub fn add(&mut self, method: Method, path: &str, handler: T) -> Option<T> {
        self.trees.entry(method).or_default().add(path, handler)
    }

    pub fn find(&self, method: Method, path: &str) -> Option<&T> {
        self.trees.get(&method)?.get(path)
    }

    pub fn tree(&self, method: Method) -> Option<&PathTree<T>> {
        self.trees.get(&method)
    }

    /// Total number of registered routes.
    pub fn len(&self) -> usize {
        self.trees.values().map(PathTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(method, path)` for every route, sorted by method then path.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes: Vec<(Method, String)> = self
            .trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.entries()
                    .into_iter()
                    .map(move |(path, _)| (*method, path))
            })
            .collect();
        routes.sort();
        routes
    }
}
