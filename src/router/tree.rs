//! Compressed prefix tree over literal paths.
//!
//! Each edge is labelled with a string; a node's children are disambiguated
//! by the first character of their key, recorded in `indices`. Inserting a
//! path that diverges in the middle of an edge splits that edge.

/// A node of the [`PathTree`].
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Edge label from the parent to this node.
    pub(crate) key: String,
    /// `indices[i]` is the first character of `children[i].key`.
    pub(crate) indices: Vec<char>,
    pub(crate) children: Vec<TreeNode<T>>,
    /// Set iff a registered path ends exactly here.
    pub(crate) leaf: Option<T>,
}

impl<T> TreeNode<T> {
    fn empty() -> Self {
        Self {
            key: String::new(),
            indices: Vec::new(),
            children: Vec::new(),
            leaf: None,
        }
    }

    fn terminal(key: &str, value: T) -> Self {
        Self {
            key: key.to_string(),
            indices: Vec::new(),
            children: Vec::new(),
            leaf: Some(value),
        }
    }

    fn child_for(&self, c: char) -> Option<usize> {
        self.indices.iter().position(|&index| index == c)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    pub fn leaf(&self) -> Option<&T> {
        self.leaf.as_ref()
    }
}

/// Radix tree keyed by literal, case-folded paths.
#[derive(Debug, Clone)]
pub struct PathTree<T> {
    root: TreeNode<T>,
    len: usize,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTree<T> {
    pub fn new() -> Self {
        Self {
            root: TreeNode::empty(),
            len: 0,
        }
    }

    pub fn root(&self) -> &TreeNode<T> {
        &self.root
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `value` under `path`, returning the value it replaces.
    ///
    /// Paths are lower-cased on insert, matching [`PathTree::get`].
    pub fn add(&mut self, path: &str, value: T) -> Option<T> {
        let path = path.to_lowercase();
        let replaced = self.insert(&path, value);
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    fn insert(&mut self, path: &str, value: T) -> Option<T> {
        let mut node = &mut self.root;

        if node.key.is_empty() && node.children.is_empty() && node.leaf.is_none() {
            node.key = path.to_string();
            node.leaf = Some(value);
            return None;
        }

        let mut path = path;
        loop {
            let i = common_prefix_len(path, &node.key);

            // Split edge
            if i < node.key.len() {
                let suffix = node.key.split_off(i);
                let first = first_char(&suffix);
                let child = TreeNode {
                    key: suffix,
                    indices: std::mem::take(&mut node.indices),
                    children: std::mem::take(&mut node.children),
                    leaf: node.leaf.take(),
                };
                node.indices = vec![first];
                node.children = vec![child];
            }

            if i == path.len() {
                return node.leaf.replace(value);
            }

            path = &path[i..];
            let c = first_char(path);
            match node.child_for(c) {
                Some(pos) => node = &mut node.children[pos],
                None => {
                    node.indices.push(c);
                    node.children.push(TreeNode::terminal(path, value));
                    return None;
                }
            }
        }
    }

    /// Look up `path` (lower-cased before matching).
    pub fn get(&self, path: &str) -> Option<&T> {
        let path = path.to_lowercase();
        let mut p = path.as_str();
        let mut node = &self.root;

        loop {
            if p.len() > node.key.len() {
                if !p.starts_with(node.key.as_str()) {
                    return None;
                }
                p = &p[node.key.len()..];
                let pos = node.child_for(first_char(p))?;
                node = &node.children[pos];
            } else if p == node.key {
                return node.leaf.as_ref();
            } else {
                return None;
            }
        }
    }

    /// All registered `(path, value)` pairs, depth first.
    pub fn entries(&self) -> Vec<(String, &T)> {
        let mut out = Vec::with_capacity(self.len);
        collect(&self.root, String::new(), &mut out);
        out
    }
}

fn collect<'a, T>(node: &'a TreeNode<T>, mut prefix: String, out: &mut Vec<(String, &'a T)>) {
    prefix.push_str(&node.key);
    if let Some(leaf) = &node.leaf {
        out.push((prefix.clone(), leaf));
    }
    for child in &node.children {
        collect(child, prefix.clone(), out);
    }
}

/// Byte length of the longest common prefix, always on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

// Callers only pass non-empty strings.
fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or_default()
}
