//! Pending/active filter snapshots and stale-response protection.
//!
//! A [`FilterSession`] keeps the filters the user is editing separate from
//! the ones the current results were fetched with. Only `apply`, `clear`,
//! page changes and sort changes produce a [`FetchRequest`]; each request
//! carries a generation number, and [`ResultsView`] drops any response whose
//! generation has been superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use seoquery_api::{OrderBy, MAX_PAGE};

use crate::error::SeoQueryError;
use crate::executor::Fetched;
use crate::filter_state::FilterState;
use crate::pagination::Pagination;

/// Monotonically increasing request counter shared by everything that
/// fetches into the same view.
#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation number. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued generation, 0 before any request.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No unapplied edits.
    Idle,
    /// The pending snapshot differs from the active one, or edits are open.
    Editing,
}

/// Everything needed to fetch one page for the active filters.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub generation: u64,
    pub filters: FilterState,
    pub page: u32,
    pub sort: Option<OrderBy>,
}

/// Filter state of one report page.
#[derive(Debug)]
pub struct FilterSession {
    active: FilterState,
    pending: Option<FilterState>,
    page: u32,
    sort: Option<OrderBy>,
    generations: Arc<RequestGeneration>,
}

impl Default for FilterSession {
    fn default() -> Self {
        Self::new(Arc::new(RequestGeneration::new()))
    }
}

impl FilterSession {
    pub fn new(generations: Arc<RequestGeneration>) -> Self {
        Self {
            active: FilterState::default(),
            pending: None,
            page: 1,
            sort: None,
            generations,
        }
    }

    /// Starts a session from previously applied filters, e.g. a saved snapshot.
    pub fn with_active(generations: Arc<RequestGeneration>, active: FilterState) -> Self {
        Self {
            active,
            ..Self::new(generations)
        }
    }

    pub fn state(&self) -> SessionState {
        if self.pending.is_some() {
            SessionState::Editing
        } else {
            SessionState::Idle
        }
    }

    /// Filters the current results were fetched with.
    pub fn active(&self) -> &FilterState {
        &self.active
    }

    /// Filters being edited; the active ones when nothing is being edited.
    pub fn pending(&self) -> &FilterState {
        self.pending.as_ref().unwrap_or(&self.active)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn sort(&self) -> Option<&OrderBy> {
        self.sort.as_ref()
    }

    pub fn generations(&self) -> &Arc<RequestGeneration> {
        &self.generations
    }

    /// Edits the pending snapshot. Never triggers a fetch.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut FilterState),
    {
        let pending = self.pending.get_or_insert_with(|| self.active.clone());
        f(pending);
    }

    /// Drops pending edits and returns to the active snapshot.
    pub fn discard_edits(&mut self) {
        self.pending = None;
    }

    /// Promotes the pending snapshot to active and requests page 1.
    ///
    /// Invalid pending filters are rejected and both snapshots stay as they
    /// were. Applying with no pending edits re-fetches the active filters.
    pub fn apply(&mut self) -> Result<FetchRequest, SeoQueryError> {
        if let Some(pending) = &self.pending {
            pending.validate()?;
        }
        if let Some(pending) = self.pending.take() {
            self.active = pending;
        }
        self.page = 1;
        Ok(self.request())
    }

    /// Resets both snapshots to the default (no constraints) and requests page 1.
    pub fn clear(&mut self) -> FetchRequest {
        self.active = FilterState::default();
        self.pending = None;
        self.page = 1;
        self.request()
    }

    /// Moves to another page of the active results, clamped to
    /// `1..=MAX_PAGE`. Pending edits are kept.
    pub fn set_page(&mut self, page: u32) -> FetchRequest {
        self.page = page.clamp(1, MAX_PAGE);
        self.request()
    }

    /// Changes the sort order and returns to page 1. Pending edits are kept.
    pub fn set_sort(&mut self, sort: OrderBy) -> FetchRequest {
        self.sort = Some(sort);
        self.page = 1;
        self.request()
    }

    fn request(&self) -> FetchRequest {
        FetchRequest {
            generation: self.generations.next(),
            filters: self.active.clone(),
            page: self.page,
            sort: self.sort.clone(),
        }
    }
}

/// The rows currently on screen and the generation they came from.
#[derive(Debug)]
pub struct ResultsView<R> {
    generations: Arc<RequestGeneration>,
    generation: u64,
    rows: Vec<R>,
    pagination: Pagination,
}

impl<R> ResultsView<R> {
    pub fn new(generations: Arc<RequestGeneration>) -> Self {
        Self {
            generations,
            generation: 0,
            rows: Vec::new(),
            pagination: Pagination::new(1, 0),
        }
    }

    /// Replaces the rows with a fetched page unless a newer request has been
    /// issued since. Returns whether the page was accepted.
    pub fn accept(&mut self, fetched: Fetched<R>) -> bool {
        if !self.generations.is_current(fetched.generation) {
            tracing::debug!(
                "discarding stale response: generation {} (latest {})",
                fetched.generation,
                self.generations.current()
            );
            return false;
        }
        self.generation = fetched.generation;
        self.pagination = fetched.pagination();
        self.rows = fetched.rows;
        true
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_state::Range;
    use seoquery_api::{Query, SortDirection};

    fn fetched(generation: u64, rows: Vec<&'static str>) -> Fetched<&'static str> {
        Fetched {
            generation,
            page: 1,
            total_count: rows.len() as i64,
            rows,
        }
    }

    #[test]
    fn page_beyond_limit_is_clamped() {
        let mut session = FilterSession::default();
        let req = session.set_page(50_000_000);
        assert_eq!(req.page, MAX_PAGE);

        let body = seoquery_api::KeywordIdeasQuery::default()
            .with_keyword("coffee")
            .with_page(req.page)
            .to_body()
            .unwrap();
        assert_eq!(body[0]["offset"], (MAX_PAGE - 1) * seoquery_api::PAGE_SIZE);
    }

    #[test]
    fn generations_increase() {
        let g = RequestGeneration::new();
        assert_eq!(g.current(), 0);
        assert_eq!(g.next(), 1);
        assert_eq!(g.next(), 2);
        assert!(g.is_current(2));
        assert!(!g.is_current(1));
    }

    #[test]
    fn edits_do_not_touch_active() {
        let mut session = FilterSession::default();
        assert_eq!(session.state(), SessionState::Idle);

        session.edit(|f| f.volume = Range::new(Some(100), None));
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.active().is_empty());
        assert_eq!(session.pending().volume.min, Some(100));
        assert_eq!(session.generations().current(), 0);
    }

    #[test]
    fn apply_promotes_pending_and_resets_page() {
        let mut session = FilterSession::default();
        session.set_page(4);
        session.edit(|f| f.volume = Range::new(Some(100), Some(500)));

        let req = session.apply().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(req.page, 1);
        assert_eq!(req.filters.volume.max, Some(500));
        assert_eq!(session.active().volume.max, Some(500));
    }

    #[test]
    fn invalid_apply_leaves_state_untouched() {
        let mut session = FilterSession::default();
        session.edit(|f| f.volume = Range::new(Some(500), Some(100)));
        let before = session.generations().current();

        assert!(session.apply().is_err());
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.active().is_empty());
        assert_eq!(session.generations().current(), before);
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = FilterSession::default();
        session.edit(|f| f.dofollow = Some(true));
        session.apply().unwrap();
        session.edit(|f| f.rank = Range::new(None, Some(10)));

        let req = session.clear();
        assert!(req.filters.is_empty());
        assert!(session.active().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn page_change_uses_active_filters_and_keeps_edits() {
        let mut session = FilterSession::default();
        session.edit(|f| f.dofollow = Some(true));
        session.apply().unwrap();
        session.edit(|f| f.dofollow = Some(false));

        let req = session.set_page(3);
        assert_eq!(req.page, 3);
        assert_eq!(req.filters.dofollow, Some(true));
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[test]
    fn sort_change_returns_to_first_page() {
        let mut session = FilterSession::default();
        session.set_page(5);
        let req = session.set_sort(OrderBy::new("cpc", SortDirection::Asc));
        assert_eq!(req.page, 1);
        assert_eq!(req.sort.unwrap().field, "cpc");
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut session = FilterSession::default();
        let mut view = ResultsView::new(session.generations().clone());

        let slow = session.set_page(1);
        let fast = session.set_page(2);

        assert!(view.accept(fetched(fast.generation, vec!["new"])));
        assert!(!view.accept(fetched(slow.generation, vec!["old"])));
        assert_eq!(view.rows(), &["new"]);
        assert_eq!(view.generation(), fast.generation);
    }
}
