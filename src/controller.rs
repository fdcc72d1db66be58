//! Fetch/cache/render state machine shared by the data-backed views.
//!
//! A [`FetchController`] owns the loading/error/data tri-state of one view. It never
//! performs I/O itself: the caller asks it whether to fetch ([`FetchController::sync`]),
//! registers each request it starts ([`FetchController::begin`]) and reports back how the
//! request ended ([`FetchController::settle`]). Only the most recently begun request may
//! commit; anything older was cancelled through its [`Cancel`] handle and its late result
//! is dropped.

use crate::api::ApiError;
use crate::Keyed;
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// Something that can cancel an in-flight request.
pub trait Cancel {
    fn cancel(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Shows the loading indicator and surfaces failures.
    Foreground,
    /// Background refresh: no loading indicator, failures keep the current data on screen.
    Silent,
}

/// Identifies one request begun by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    mode: FetchMode,
    user_id: String,
}

impl Ticket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// What the view should do after the user or the cache entry changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The cached payload belongs to the user and is now displayed.
    Adopted,
    /// Nothing usable is cached, a request should be started.
    Fetch,
    /// No linked handle, or the entry is already on screen.
    Skipped,
}

struct InFlight {
    ticket_id: u64,
    handle: Box<dyn Cancel>,
}

pub struct FetchController<T> {
    shown: Option<(String, Rc<T>)>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<InFlight>,
    issued: u64,
    torn_down: bool,
}

impl<T> Default for FetchController<T> {
    fn default() -> Self {
        Self {
            shown: None,
            loading: false,
            error: None,
            in_flight: None,
            issued: 0,
            torn_down: false,
        }
    }
}

fn linked(user_id: Option<&str>) -> Option<&str> {
    user_id.filter(|id| !id.trim().is_empty())
}

impl<T: Keyed> FetchController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Re-evaluate after the active user or its cache entry changed.
    pub fn sync(&mut self, user_id: Option<&str>, cached: Option<Rc<T>>) -> SyncAction {
        let Some(id) = linked(user_id) else {
            return SyncAction::Skipped;
        };

        match cached {
            Some(entry) if entry.owner_id() == Some(id) => {
                self.shown = Some((id.to_owned(), entry));
                self.error = None;
                SyncAction::Adopted
            }
            // Our own write-through of an ownerless payload coming back
            Some(entry) if self.is_showing(id, &entry) => SyncAction::Skipped,
            _ => SyncAction::Fetch,
        }
    }

    /// Register a new request for `user_id`, cancelling whatever was in flight.
    ///
    /// Returns `None` (and drops `handle` unused) when there is no linked handle or the
    /// view is gone.
    pub fn begin(
        &mut self,
        user_id: Option<&str>,
        mode: FetchMode,
        handle: Box<dyn Cancel>,
    ) -> Option<Ticket> {
        if self.torn_down {
            return None;
        }
        let id = linked(user_id)?;

        self.cancel_in_flight();
        self.issued += 1;
        self.loading = mode == FetchMode::Foreground;
        if mode == FetchMode::Foreground {
            self.error = None;
        }
        self.in_flight = Some(InFlight {
            ticket_id: self.issued,
            handle,
        });

        Some(Ticket {
            id: self.issued,
            mode,
            user_id: id.to_owned(),
        })
    }

    /// Apply the outcome of `ticket`'s request.
    ///
    /// Returns the newly displayed payload when it should be written through to the
    /// session cache.
    pub fn settle(
        &mut self,
        ticket: &Ticket,
        outcome: Result<Option<T>, ApiError>,
    ) -> Option<Rc<T>> {
        if self.torn_down || !self.is_active(ticket) {
            debug!("dropping stale result for request #{}", ticket.id);
            return None;
        }
        self.in_flight = None;
        self.loading = false;

        match outcome {
            Ok(Some(payload)) => {
                let payload = Rc::new(payload);
                self.shown = Some((ticket.user_id.clone(), payload.clone()));
                self.error = None;
                Some(payload)
            }
            Ok(None) => {
                self.shown = None;
                self.error = None;
                None
            }
            Err(err) if err.is_cancellation() => None,
            Err(err) => {
                if ticket.mode == FetchMode::Foreground {
                    self.error = Some(err.to_string());
                } else {
                    debug!("background refresh failed: {}", err);
                }
                None
            }
        }
    }

    /// A request could not even be started. Foreground failures become the view's error;
    /// the displayed data is left as it is.
    pub fn reject(&mut self, mode: FetchMode, err: &ApiError) {
        if self.torn_down {
            return;
        }
        if mode == FetchMode::Foreground {
            self.error = Some(err.to_string());
        } else {
            debug!("background refresh not started: {}", err);
        }
    }

    /// Displayed payload for `user_id`; never one that belongs to somebody else.
    pub fn visible(&self, user_id: Option<&str>) -> Option<Rc<T>> {
        let id = linked(user_id)?;
        let (fetched_for, payload) = self.shown.as_ref()?;
        if fetched_for != id {
            return None;
        }
        match payload.owner_id() {
            Some(owner) if owner != id => None,
            _ => Some(payload.clone()),
        }
    }

    /// The view went away: cancel the in-flight request and refuse later results.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.cancel_in_flight();
    }

    fn is_showing(&self, user_id: &str, entry: &Rc<T>) -> bool {
        matches!(&self.shown, Some((id, shown)) if id == user_id && Rc::ptr_eq(shown, entry))
    }

    fn is_active(&self, ticket: &Ticket) -> bool {
        matches!(&self.in_flight, Some(f) if f.ticket_id == ticket.id)
    }

    fn cancel_in_flight(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            debug!("cancelling superseded request #{}", prev.ticket_id);
            prev.handle.cancel();
        }
    }
}

/// Which topic cards of the sheet are open.
///
/// Seeded once from the first non-empty topic list; later loads keep whatever the
/// user toggled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicExpansion {
    open: HashMap<String, bool>,
}

impl TopicExpansion {
    pub fn seed<'a>(&mut self, mut topics: impl Iterator<Item = &'a str>) {
        if !self.open.is_empty() {
            return;
        }
        if let Some(first) = topics.next() {
            self.open.insert(first.to_owned(), true);
        }
    }

    pub fn toggle(&mut self, topic: &str) {
        let entry = self.open.entry(topic.to_owned()).or_insert(false);
        *entry = !*entry;
    }

    pub fn is_expanded(&self, topic: &str) -> bool {
        self.open.get(topic).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DashboardSnapshot;
    use std::cell::Cell;

    #[derive(Clone, Default)]
    struct Flag(Rc<Cell<bool>>);

    impl Cancel for Flag {
        fn cancel(&self) {
            self.0.set(true);
        }
    }

    impl Flag {
        fn cancelled(&self) -> bool {
            self.0.get()
        }
    }

    fn snap(owner: &str, rating: i64) -> DashboardSnapshot {
        DashboardSnapshot {
            codeforces_id: Some(owner.to_owned()),
            current_rating: Some(rating),
            ..Default::default()
        }
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "Unable to load dashboard (HTTP 500)".into(),
        }
    }

    #[test]
    fn cached_entry_for_same_user_is_adopted_without_fetch() {
        let mut ctl = FetchController::new();
        let cached = Rc::new(snap("U", 1900));

        assert_eq!(ctl.sync(Some("U"), Some(cached.clone())), SyncAction::Adopted);
        assert!(!ctl.has_request_in_flight());
        assert!(Rc::ptr_eq(&ctl.visible(Some("U")).unwrap(), &cached));
    }

    #[test]
    fn cached_entry_for_other_user_triggers_fetch() {
        let mut ctl = FetchController::new();
        let cached = Rc::new(snap("U", 1900));

        assert_eq!(ctl.sync(Some("U"), Some(cached.clone())), SyncAction::Adopted);
        assert_eq!(ctl.sync(Some("V"), Some(cached)), SyncAction::Fetch);
        assert!(ctl.visible(Some("V")).is_none());
    }

    #[test]
    fn missing_handle_skips_everything() {
        let mut ctl = FetchController::<DashboardSnapshot>::new();
        assert_eq!(ctl.sync(None, None), SyncAction::Skipped);
        assert_eq!(ctl.sync(Some(""), None), SyncAction::Skipped);
        assert!(ctl
            .begin(Some(" "), FetchMode::Foreground, Box::new(Flag::default()))
            .is_none());
        assert!(!ctl.is_loading());
        assert!(ctl.error().is_none());
    }

    #[test]
    fn superseded_request_cannot_commit() {
        let mut ctl = FetchController::new();
        let first = Flag::default();
        let second = Flag::default();

        let r1 = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(first.clone()))
            .unwrap();
        let r2 = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(second.clone()))
            .unwrap();
        assert!(first.cancelled());
        assert!(!second.cancelled());

        // R1 resolves late, either with data or as an abort.
        assert!(ctl.settle(&r1, Ok(Some(snap("U", 1000)))).is_none());
        assert!(ctl.settle(&r1, Err(ApiError::Aborted)).is_none());
        assert!(ctl.is_loading());
        assert!(ctl.visible(Some("U")).is_none());

        let written = ctl.settle(&r2, Ok(Some(snap("U", 2000)))).unwrap();
        assert_eq!(written.current_rating, Some(2000));
        assert_eq!(ctl.visible(Some("U")).unwrap().current_rating, Some(2000));
        assert!(!ctl.is_loading());
    }

    #[test]
    fn foreground_failure_sets_error_and_clears_loading() {
        let mut ctl = FetchController::<DashboardSnapshot>::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        assert!(ctl.is_loading());

        assert!(ctl.settle(&t, Err(server_error())).is_none());
        assert!(!ctl.is_loading());
        assert_eq!(ctl.error(), Some("Unable to load dashboard (HTTP 500)"));
    }

    #[test]
    fn silent_failure_keeps_data_and_error_untouched() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        ctl.settle(&t, Ok(Some(snap("U", 1500))));

        let t = ctl
            .begin(Some("U"), FetchMode::Silent, Box::new(Flag::default()))
            .unwrap();
        assert!(!ctl.is_loading());
        ctl.settle(&t, Err(ApiError::Network("Failed to fetch".into())));

        assert!(ctl.error().is_none());
        assert_eq!(ctl.visible(Some("U")).unwrap().current_rating, Some(1500));
    }

    #[test]
    fn foreground_fetch_clears_previous_error() {
        let mut ctl = FetchController::<DashboardSnapshot>::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        ctl.settle(&t, Err(server_error()));
        assert!(ctl.error().is_some());

        ctl.begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()));
        assert!(ctl.error().is_none());
    }

    #[test]
    fn absent_payload_clears_display() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        ctl.settle(&t, Ok(Some(snap("U", 1500))));

        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        assert!(ctl.settle(&t, Ok(None)).is_none());
        assert!(ctl.visible(Some("U")).is_none());
        assert!(ctl.error().is_none());
    }

    #[test]
    fn teardown_cancels_and_blocks_late_writes() {
        let mut ctl = FetchController::new();
        let flag = Flag::default();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(flag.clone()))
            .unwrap();

        ctl.teardown();
        assert!(flag.cancelled());
        assert!(ctl.settle(&t, Ok(Some(snap("U", 1)))).is_none());
        assert!(ctl.visible(Some("U")).is_none());
        assert!(ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .is_none());
    }

    #[test]
    fn payload_for_another_handle_is_never_shown() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        // Server answered with somebody else's snapshot.
        let written = ctl.settle(&t, Ok(Some(snap("W", 1))));
        assert!(written.is_some());
        assert!(ctl.visible(Some("U")).is_none());
        assert!(ctl.visible(Some("W")).is_none());
    }

    #[test]
    fn ownerless_payload_is_shown_for_requesting_user() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        ctl.settle(&t, Ok(Some(DashboardSnapshot::default())));
        assert!(ctl.visible(Some("U")).is_some());
        assert!(ctl.visible(Some("V")).is_none());
    }

    #[test]
    fn own_write_through_does_not_refetch() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        let written = ctl.settle(&t, Ok(Some(DashboardSnapshot::default()))).unwrap();

        // The cache hands the same ownerless entry back.
        assert_eq!(ctl.sync(Some("U"), Some(written)), SyncAction::Skipped);
        // A fresh controller cannot prove ownership and fetches.
        let mut fresh = FetchController::new();
        let stray = Rc::new(DashboardSnapshot::default());
        assert_eq!(fresh.sync(Some("U"), Some(stray)), SyncAction::Fetch);
    }

    #[test]
    fn request_that_cannot_start_reports_in_foreground_only() {
        let mut ctl = FetchController::new();
        let t = ctl
            .begin(Some("U"), FetchMode::Foreground, Box::new(Flag::default()))
            .unwrap();
        ctl.settle(&t, Ok(Some(snap("U", 1500))));

        let err = ApiError::Browser("AbortController is not defined".into());
        ctl.reject(FetchMode::Silent, &err);
        assert!(ctl.error().is_none());

        ctl.reject(FetchMode::Foreground, &err);
        assert_eq!(ctl.error(), Some("Browser error: AbortController is not defined"));
        assert_eq!(ctl.visible(Some("U")).unwrap().current_rating, Some(1500));

        let mut gone = FetchController::<DashboardSnapshot>::new();
        gone.teardown();
        gone.reject(FetchMode::Foreground, &err);
        assert!(gone.error().is_none());
    }

    #[test]
    fn first_topic_is_expanded_once() {
        let mut open = TopicExpansion::default();
        open.seed(["dp", "graphs"].into_iter());
        assert!(open.is_expanded("dp"));
        assert!(!open.is_expanded("graphs"));

        open.toggle("graphs");
        open.seed(["dp", "graphs"].into_iter());
        assert!(open.is_expanded("dp"));
        assert!(open.is_expanded("graphs"));
    }

    #[test]
    fn seed_respects_user_collapse() {
        let mut open = TopicExpansion::default();
        open.seed(["dp", "graphs"].into_iter());
        open.toggle("dp");
        open.seed(["dp", "graphs"].into_iter());
        assert!(!open.is_expanded("dp"));
    }

    #[test]
    fn empty_topic_list_does_not_seed() {
        let mut open = TopicExpansion::default();
        open.seed(std::iter::empty());
        open.seed(["graphs"].into_iter());
        assert!(open.is_expanded("graphs"));
    }
}
