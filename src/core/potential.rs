use std::fmt::{Debug, Formatter};

/// A pairwise compatibility function between states of two variables
///
/// # Notes
///
/// Values must lie in (0, 1]. A graph tabulates a potential once when an
/// edge is connected and rejects non-positive values, since they break
/// the log-domain arithmetic of message passing. One potential may be
/// shared by any number of edges
pub trait Potential<A, B>: Debug {
    /// Returns a compatibility of a pair of states
    ///
    /// # Arguments
    ///
    /// * `first` - A state of the first endpoint of an edge
    /// * `second` - A state of the second endpoint of an edge
    fn value(&self, first: &A, second: &B) -> f64;

    #[inline]
    fn log_value(&self, first: &A, second: &B) -> f64 {
        self.value(first, second).ln()
    }
}

/// A potential backed by a closure
pub struct FnPotential<F> {
    name: &'static str,
    func: F,
}

impl<F> Debug for FnPotential<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPotential").field("name", &self.name).finish()
    }
}

impl<A, B, F> Potential<A, B> for FnPotential<F>
where
    F: Fn(&A, &B) -> f64,
{
    #[inline(always)]
    fn value(&self, first: &A, second: &B) -> f64 {
        (self.func)(first, second)
    }
}

/// Wraps a closure into a potential
///
/// # Arguments
///
/// * `name` - A name shown in debug output
/// * `func` - A compatibility function
///
/// # Example
///
/// ```
/// use pmrf::core::{potential, Potential};
///
/// let differ = potential::from_fn("differ", |a: &u8, b: &u8| if a == b { 0.1 } else { 0.9 });
/// assert_eq!(differ.value(&1, &2), 0.9);
/// ```
pub fn from_fn<A, B, F>(name: &'static str, func: F) -> FnPotential<F>
where
    F: Fn(&A, &B) -> f64,
{
    FnPotential { name, func }
}
