use std::{fmt::Debug, ops::Index, sync::Arc};

#[derive(Debug)]
enum Tree<T> {
    Leaf(T),
    Branch { left: Arc<Tree<T>>, right: Arc<Tree<T>> },
}

#[inline(always)]
fn left_len(len: usize) -> usize {
    len / 2
}

fn build<T>(items: &mut impl Iterator<Item = T>, len: usize) -> Option<Arc<Tree<T>>> {
    if len == 1 {
        return items.next().map(|item| Arc::new(Tree::Leaf(item)));
    }
    let left = build(items, left_len(len))?;
    let right = build(items, len - left_len(len))?;
    Some(Arc::new(Tree::Branch { left, right }))
}

// Rebuilds the path to `index`, sibling subtrees are shared
fn set<T>(node: &Tree<T>, len: usize, index: usize, value: T) -> Tree<T> {
    match node {
        Tree::Leaf(_) => Tree::Leaf(value),
        Tree::Branch { left, right } => {
            let half = left_len(len);
            if index < half {
                Tree::Branch {
                    left: Arc::new(set(left, half, index, value)),
                    right: Arc::clone(right),
                }
            } else {
                Tree::Branch {
                    left: Arc::clone(left),
                    right: Arc::new(set(right, len - half, index - half, value)),
                }
            }
        }
    }
}

// ------------------------------------------------------------------------------------------

/// An immutable vector of a fixed length backed by a balanced binary tree.
///
/// `update` returns a new vector that shares every untouched subtree with
/// the old one, so both stay valid and unchanged afterwards. Cloning is
/// a reference count increment.
///
/// # Example
///
/// ```
/// use pmrf::gibbs::PersistentVec;
///
/// let v1: PersistentVec<usize> = (0..5).collect();
/// let v2 = v1.update(2, 7);
/// assert_eq!(v1.to_vec(), vec![0, 1, 2, 3, 4]);
/// assert_eq!(v2.to_vec(), vec![0, 1, 7, 3, 4]);
/// ```
pub struct PersistentVec<T> {
    root: Option<Arc<Tree<T>>>,
    len: usize,
}

impl<T> PersistentVec<T> {
    /// Creates an empty vector
    #[inline]
    pub fn new() -> Self {
        PersistentVec { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an element in O(log n) or None if the index is out of range
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let mut node = self.root.as_deref()?;
        let mut len = self.len;
        let mut index = index;
        loop {
            match node {
                Tree::Leaf(value) => return Some(value),
                Tree::Branch { left, right } => {
                    let half = left_len(len);
                    if index < half {
                        node = left.as_ref();
                        len = half;
                    } else {
                        node = right.as_ref();
                        len -= half;
                        index -= half;
                    }
                }
            }
        }
    }

    /// Returns a vector that differs from this one at `index` only.
    /// This vector is left as it is.
    ///
    /// # Arguments
    ///
    /// * `index` - A position to replace
    /// * `value` - A new value
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    pub fn update(&self, index: usize, value: T) -> Self
    where
        T: PartialEq,
    {
        assert!(
            index < self.len,
            "Index {index} is out of range of a persistent vector of length {}",
            self.len
        );
        if self.get(index) == Some(&value) {
            return self.clone();
        }
        let root = self
            .root
            .as_deref()
            .map(|root| Arc::new(set(root, self.len, index, value)));
        PersistentVec { root, len: self.len }
    }

    /// Returns true if both vectors share the same root
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
            remaining: self.len,
        }
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> Default for PersistentVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PersistentVec<T> {
    fn clone(&self) -> Self {
        PersistentVec {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T: Debug> Debug for PersistentVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for PersistentVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentVec<T> {}

impl<T> FromIterator<T> for PersistentVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let len = items.len();
        if len == 0 {
            return PersistentVec::new();
        }
        let root = build(&mut items.into_iter(), len);
        PersistentVec { root, len }
    }
}

impl<T> Index<usize> for PersistentVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "Index {index} is out of range of a persistent vector of length {}",
                self.len
            ),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a persistent vector
pub struct Iter<'a, T> {
    stack: Vec<&'a Tree<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while let Some(node) = self.stack.pop() {
            match node {
                Tree::Leaf(value) => {
                    self.remaining -= 1;
                    return Some(value);
                }
                Tree::Branch { left, right } => {
                    self.stack.push(right.as_ref());
                    self.stack.push(left.as_ref());
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
