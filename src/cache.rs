//! Per-user cache for fetched payloads.
//!
//! The cache lives as long as the session (the page) and stores the most recent
//! dashboard snapshot and recommendation sheet for every Codeforces handle seen.
//! Switching between views reuses these entries instead of hitting the API again.
//!
//! # Cache Key Structure
//! - the Codeforces handle embedded in the payload (`codeforces_id`)
//! - falling back to the handle of the user that was active when the write happened
//!
//! # Cache Value Structure
//! - `Rc<T>`: the payload exactly as received, shared with the views rendering it
//!
//! Entries are never evicted; one entry per handle and kind, last write wins.

use crate::{DashboardSnapshot, Keyed, RecommendationSheet};
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;
use yew::Reducible;

/// Payloads of one kind, keyed by Codeforces handle.
#[derive(Debug)]
pub struct UserCache<T> {
    entries: HashMap<String, Rc<T>>,
}

impl<T> Default for UserCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> Clone for UserCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: Keyed> UserCache<T> {
    pub fn read(&self, user_id: &str) -> Option<Rc<T>> {
        self.entries.get(user_id).cloned()
    }

    /// Store `payload` under its embedded handle, or under `active_user` when it has none.
    ///
    /// Returns the key written, or `None` when the payload has no addressable owner.
    pub fn write(&mut self, payload: Rc<T>, active_user: Option<&str>) -> Option<String> {
        let key = payload
            .owner_id()
            .or_else(|| active_user.filter(|id| !id.trim().is_empty()))?
            .to_owned();
        self.entries.insert(key.clone(), payload);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything fetched during this session.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    pub dashboards: UserCache<DashboardSnapshot>,
    pub sheets: UserCache<RecommendationSheet>,
}

/// Write requests dispatched by the views. The second field is the handle of the
/// user that was active when the payload arrived.
pub enum CacheAction {
    StoreDashboard(Rc<DashboardSnapshot>, Option<String>),
    StoreSheet(Rc<RecommendationSheet>, Option<String>),
}

impl Reducible for SessionCache {
    type Action = CacheAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        let stored = match action {
            CacheAction::StoreDashboard(payload, active) => {
                next.dashboards.write(payload, active.as_deref())
            }
            CacheAction::StoreSheet(payload, active) => next.sheets.write(payload, active.as_deref()),
        };

        match stored {
            Some(key) => {
                debug!("cached payload for {}", key);
                Rc::new(next)
            }
            None => {
                debug!("dropping payload without an owner");
                self
            }
        }
    }
}
