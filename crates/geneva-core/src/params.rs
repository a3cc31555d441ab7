//! Path parameters extracted by the router
//!
//! Parameters are kept in match order as `(name, value)` pairs. Most routes
//! have four or fewer, so they are stored inline without a heap allocation.

use smallvec::SmallVec;

/// Number of parameters stored inline before spilling to the heap.
pub const STACK_PARAMS_CAPACITY: usize = 4;

/// Path parameters of one matched request, in match order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: SmallVec<[(String, String); STACK_PARAMS_CAPACITY]>,
}

impl Params {
    /// Create a new empty parameter set.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmallVec::new(),
        }
    }

    /// Append a parameter.
    #[inline]
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Value of the first parameter called `name`, if any.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first parameter called `name`, or `""` when absent.
    #[inline]
    pub fn by_name(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over `(name, value)` pairs in match order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Params {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
