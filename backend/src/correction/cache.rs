//! Single-slot evaluator cache
//!
//! Holds the evaluator built for the most recent key. A build happens only
//! when the requested key differs from the stored one (or nothing has been
//! stored yet), so runs sharing a key reuse the same evaluator.

/// Key-guarded cache of one lazily built value
///
/// # Example
///
/// ```rust
/// use jet_calib_core::correction::CorrectorCache;
///
/// let mut cache: CorrectorCache<String, f64> = CorrectorCache::new();
/// let mut builds = 0;
/// for _ in 0..3 {
///     let value = cache
///         .ensure_current(&"run-A".to_string(), || {
///             builds += 1;
///             Ok::<_, ()>(Some(1.05))
///         })
///         .unwrap();
///     assert_eq!(value, Some(&1.05));
/// }
/// assert_eq!(builds, 1);
/// ```
#[derive(Debug)]
pub struct CorrectorCache<K, T> {
    key: Option<K>,
    value: Option<T>,
    builds: usize,
}

impl<K, T> Default for CorrectorCache<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            value: None,
            builds: 0,
        }
    }
}

impl<K: PartialEq + Clone, T> CorrectorCache<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild if `key` is new, then return the cached value.
    ///
    /// `build` may return `Ok(None)`, which is cached as "disabled". A failed
    /// build leaves the previous key and value untouched.
    pub fn ensure_current<F, E>(&mut self, key: &K, build: F) -> Result<Option<&T>, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
    {
        if self.needs_build(key) {
            let value = build()?;
            self.value = value;
            self.key = Some(key.clone());
            self.builds += 1;
        }
        Ok(self.value.as_ref())
    }

    /// Whether `key` would trigger a build.
    pub fn needs_build(&self, key: &K) -> bool {
        self.key.as_ref() != Some(key)
    }

    /// Currently cached value, if any.
    pub fn current(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Key of the cached value, if a build has happened.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Number of builds performed so far.
    pub fn build_count(&self) -> usize {
        self.builds
    }

    /// Forget the cached value and key.
    pub fn clear(&mut self) {
        self.key = None;
        self.value = None;
    }
}
