//! # Session-Scoped State
//!
//! One viewing session owns its filter selections, its case selection, and
//! its navigation signal as an explicit `Session` value handed to whoever
//! needs it. Each named view gets its own `FilterState` instance; there is
//! no ambient global and no shared singleton.
//!
//! The load cache is likewise an explicit object: bundles are write-once
//! per `(root, demo)` key and shared out as `Arc`s. The lock is never held
//! across a load, so two sessions missing the same key at once may both
//! load; the loader is deterministic, so the duplicated work is idempotent
//! and the first insert wins.

use crate::data::{self, Bundle};
use crate::filter::FilterState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The viewer's logical screens, used for explicit navigation signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    CaseExplorer,
    Performance,
}

/// Per-session mutable state. Filter selections are keyed by view name and
/// persist across navigation for the lifetime of the session.
#[derive(Debug, Default)]
pub struct Session {
    filters: HashMap<String, FilterState>,
    selected_case: Option<String>,
    pending_page: Option<Page>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The named view's filter state, created unconstrained on first use.
    pub fn filter_mut(&mut self, view: &str) -> &mut FilterState {
        self.filters.entry(view.to_string()).or_default()
    }

    /// Read-only access; `None` until the view has touched its filters.
    pub fn filter(&self, view: &str) -> Option<&FilterState> {
        self.filters.get(view)
    }

    /// Drop a view's selections back to unconstrained.
    pub fn reset_filter(&mut self, view: &str) {
        self.filters.remove(view);
    }

    /// Signal a jump to another page, optionally focusing a case there.
    pub fn navigate_to(&mut self, page: Page, case_id: Option<String>) {
        if case_id.is_some() {
            self.selected_case = case_id;
        }
        self.pending_page = Some(page);
    }

    pub fn selected_case(&self) -> Option<&str> {
        self.selected_case.as_deref()
    }

    pub fn select_case(&mut self, case_id: Option<String>) {
        self.selected_case = case_id;
    }

    /// Consume the navigation signal, if any. The signal fires once.
    pub fn take_pending_page(&mut self) -> Option<Page> {
        self.pending_page.take()
    }
}

/// Explicit bundle cache keyed by `(root, demo)`. A new key is a miss and
/// triggers a fresh load; there is no other invalidation rule. Entries are
/// immutable once constructed (write-once, read-many).
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<(PathBuf, bool), Arc<Bundle>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, root: &Path, demo: bool) -> Arc<Bundle> {
        let key = (root.to_path_buf(), demo);
        if let Some(bundle) = self.lock().get(&key) {
            return Arc::clone(bundle);
        }

        // Loading happens outside the lock; see the module doc for the
        // duplicate-miss contract.
        let bundle = Arc::new(data::load_bundle(root, demo));
        let mut entries = self.lock();
        Arc::clone(entries.entry(key).or_insert(bundle))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(PathBuf, bool), Arc<Bundle>>> {
        self.entries.lock().expect("load cache lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskBand;

    #[test]
    fn views_own_independent_filter_states() {
        let mut session = Session::new();
        session
            .filter_mut("dashboard")
            .risk_bands
            .insert(RiskBand::High);

        assert!(session.filter("explorer").is_none());
        assert!(session.filter_mut("explorer").is_unconstrained());
        assert!(!session.filter_mut("dashboard").is_unconstrained());

        session.reset_filter("dashboard");
        assert!(session.filter("dashboard").is_none());
    }

    #[test]
    fn navigation_signal_fires_once() {
        let mut session = Session::new();
        session.navigate_to(Page::CaseExplorer, Some("Case-07".to_string()));

        assert_eq!(session.selected_case(), Some("Case-07"));
        assert_eq!(session.take_pending_page(), Some(Page::CaseExplorer));
        assert_eq!(session.take_pending_page(), None);
        // Selection survives the consumed signal.
        assert_eq!(session.selected_case(), Some("Case-07"));
    }

    #[test]
    fn cache_hits_share_the_same_bundle() {
        let cache = LoadCache::new();
        let root = Path::new("ignored-in-demo-mode");
        let first = cache.get_or_load(root, true);
        let second = cache.get_or_load(root, true);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn toggling_demo_is_a_different_key() {
        let cache = LoadCache::new();
        let dir = tempfile::tempdir().unwrap();
        let real = cache.get_or_load(dir.path(), false);
        let demo = cache.get_or_load(dir.path(), true);
        assert!(!Arc::ptr_eq(&real, &demo));
        assert!(!real.demo);
        assert!(demo.demo);
        assert_eq!(cache.len(), 2);
    }
}
