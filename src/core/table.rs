use serde::Serialize;

use crate::core::numeric::argmax_first;

/// Values attached to the states of a variable, kept in the enumeration
/// order of the variable's domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTable<S> {
    entries: Vec<(S, f64)>,
}

impl<S: PartialEq> StateTable<S> {
    #[inline]
    pub(crate) fn new(entries: Vec<(S, f64)>) -> Self {
        StateTable { entries }
    }

    /// Returns a value of a state or None if the state is not in the table
    #[inline]
    pub fn get(&self, state: &S) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, v)| *v)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
        self.entries.iter().map(|(s, v)| (s, *v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Returns the state with the largest value. Among equal values the
    /// one that comes first in the enumeration order wins
    #[inline]
    pub fn most_probable(&self) -> Option<&S> {
        argmax_first(self.entries.iter().map(|(_, v)| *v)).map(|i| &self.entries[i].0)
    }

    #[inline]
    pub fn into_vec(self) -> Vec<(S, f64)> {
        self.entries
    }
}
