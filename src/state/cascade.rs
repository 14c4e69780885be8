//! Parent/child select pairs whose child options are fetched per parent.
//!
//! A response is only accepted while its parent key is still the selected
//! parent, so a slow answer for a superseded selection can never overwrite
//! the options of the current one.

#[derive(Debug, Clone, PartialEq)]
pub enum CascadeState<K, O> {
    Idle,
    Loading(K),
    Loaded(K, Vec<O>),
}

/// What the caller has to do after a parent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAction<K> {
    /// Same parent as before; nothing to do.
    Unchanged,
    /// Parent cleared: options dropped, child must be cleared, no request.
    Clear,
    /// New parent: child must be cleared and the options fetched for `K`.
    Fetch(K),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cascade<K, O> {
    state: CascadeState<K, O>,
}

impl<K, O> Default for Cascade<K, O> {
    fn default() -> Self {
        Self { state: CascadeState::Idle }
    }
}

impl<K: Clone + PartialEq, O> Cascade<K, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CascadeState<K, O> {
        &self.state
    }

    pub fn parent(&self) -> Option<&K> {
        match &self.state {
            CascadeState::Idle => None,
            CascadeState::Loading(key) | CascadeState::Loaded(key, _) => Some(key),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CascadeState::Loading(_))
    }

    pub fn options(&self) -> &[O] {
        match &self.state {
            CascadeState::Loaded(_, options) => options,
            _ => &[],
        }
    }

    pub fn select(&mut self, parent: Option<K>) -> CascadeAction<K> {
        match parent {
            None => {
                self.state = CascadeState::Idle;
                CascadeAction::Clear
            }
            Some(key) if self.parent() == Some(&key) => CascadeAction::Unchanged,
            Some(key) => {
                self.state = CascadeState::Loading(key.clone());
                CascadeAction::Fetch(key)
            }
        }
    }

    /// Installs options fetched for `parent`. Returns `false` and changes
    /// nothing when `parent` is no longer the selected parent.
    pub fn resolve(&mut self, parent: &K, options: Vec<O>) -> bool {
        if self.parent() != Some(parent) {
            return false;
        }
        self.state = CascadeState::Loaded(parent.clone(), options);
        true
    }

    /// A failed fetch leaves the current parent with no options.
    pub fn fail(&mut self, parent: &K) -> bool {
        self.resolve(parent, Vec::new())
    }
}
