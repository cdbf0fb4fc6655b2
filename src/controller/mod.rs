//! List controller: page, filter and result state for one resource kind.
//!
//! The controller reconciles user edits with debounced free-text filters,
//! the shared page cache and the remote source. It never blocks: edits and
//! page changes return immediately, and the UI calls [`ListController::tick`]
//! on every event-loop tick to settle debouncers, start scheduled fetches and
//! pick up completed responses.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::catalog::{
  build_key, Entity, FetchError, FilterPatch, FilterSet, PageResult, PageSource, ResourceKind,
};
use crate::debounce::Debouncer;
use crate::prefs::Preferences;

/// Delays that shape the fetch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
  /// Quiet period for free-text filter fields
  pub debounce: Duration,
  /// Wait after the last field settles before fetching
  pub settle_guard: Duration,
  /// Minimum time `is_loading` stays up for a remote fetch, from its start
  pub min_loading: Duration,
}

impl Default for Timings {
  fn default() -> Self {
    Self {
      debounce: Duration::from_millis(300),
      settle_guard: Duration::from_millis(300),
      min_loading: Duration::from_millis(500),
    }
  }
}

/// Error shown in place of the list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  /// The source answered, but nothing matched the active filters
  #[error("No {0} found with current filters")]
  NoResults(ResourceKind),
}

/// Result of a spawned fetch, tagged with the generation that started it
struct Completion {
  generation: u64,
  key: String,
  started: Instant,
  result: Result<PageResult, FetchError>,
}

struct InFlight {
  generation: u64,
  task: JoinHandle<()>,
}

pub struct ListController {
  kind: ResourceKind,
  source: Arc<dyn PageSource>,
  cache: TtlCache,
  prefs: Preferences,
  timings: Timings,

  page: u32,
  filters: FilterSet,
  /// Trimmed, debounced value of every free-text field
  debounced: BTreeMap<&'static str, Debouncer<String>>,

  results: PageResult,
  is_loading: bool,
  is_searching: bool,
  error: Option<ListError>,

  /// Bumped for every pipeline run; completions from older runs are dropped
  generation: u64,
  in_flight: Option<InFlight>,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
  scheduled_fetch: Option<Instant>,
  loading_until: Option<Instant>,
  disposed: bool,
}

impl ListController {
  /// Create a controller seeded from stored preferences and start the first
  /// fetch. Must be called inside a tokio runtime.
  pub fn new(
    kind: ResourceKind,
    source: Arc<dyn PageSource>,
    cache: TtlCache,
    prefs: Preferences,
    timings: Timings,
  ) -> Self {
    let page = prefs
      .get_page()
      .and_then(|p| p.trim().parse::<u32>().ok())
      .filter(|p| *p >= 1)
      .unwrap_or(1);

    let mut filters = FilterSet::for_kind(kind);
    if let Some(stored) = prefs.get_filters() {
      filters.merge_known(kind, &stored);
    }

    let debounced = kind
      .fields()
      .iter()
      .filter(|f| f.is_debounced())
      .map(|f| {
        let initial = filters.get(f.name).trim().to_string();
        (f.name, Debouncer::new(initial, timings.debounce))
      })
      .collect();

    let (tx, rx) = mpsc::unbounded_channel();

    let mut controller = Self {
      kind,
      source,
      cache,
      prefs,
      timings,
      page,
      filters,
      debounced,
      results: PageResult::default(),
      is_loading: true,
      is_searching: false,
      error: None,
      generation: 0,
      in_flight: None,
      tx,
      rx,
      scheduled_fetch: None,
      loading_until: None,
      disposed: false,
    };

    debug!(kind = %kind, page, "list controller created");
    controller.run_pipeline(Instant::now());
    controller
  }

  pub fn kind(&self) -> ResourceKind {
    self.kind
  }

  pub fn items(&self) -> &[Entity] {
    &self.results.items
  }

  pub fn is_loading(&self) -> bool {
    self.is_loading
  }

  /// A free-text filter has not caught up with what was typed
  pub fn is_searching(&self) -> bool {
    self.is_searching
  }

  pub fn error(&self) -> Option<&ListError> {
    self.error.as_ref()
  }

  pub fn total_pages(&self) -> u32 {
    self.results.total_pages
  }

  pub fn total_results(&self) -> u32 {
    self.results.total_count
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  /// Live filter values, as typed
  pub fn filters(&self) -> &FilterSet {
    &self.filters
  }

  /// Filters used for fetching: free-text fields take their debounced value
  pub fn effective_filters(&self) -> FilterSet {
    let mut effective = self.filters.clone();
    for (field, debouncer) in &self.debounced {
      effective.set(field, debouncer.value().clone());
    }
    effective
  }

  /// Pagination is disabled while anything is pending
  pub fn can_change_page(&self) -> bool {
    !self.disposed && !self.is_loading && !self.is_searching
  }

  /// Apply a partial filter update.
  ///
  /// Page goes back to 1 and the error is cleared whenever a value actually
  /// changes. Free-text fields wait for their debouncer; select fields fetch
  /// right away unless a free-text field is still settling.
  pub fn set_filters(&mut self, patch: FilterPatch) {
    if self.disposed {
      return;
    }

    let now = Instant::now();
    let mut changed = false;

    for (field, value) in patch.iter() {
      let Some(spec) = self.kind.field(field) else {
        warn!(kind = %self.kind, field, "ignoring unknown filter field");
        continue;
      };

      if !self.filters.set(spec.name, value) {
        continue;
      }
      changed = true;

      if let Some(debouncer) = self.debounced.get_mut(spec.name) {
        debouncer.update(value.trim().to_string(), now);
      }
    }

    if !changed {
      return;
    }

    self.page = 1;
    self.error = None;
    self.prefs.set_page(self.page);
    self.prefs.set_filters(&self.filters);
    self.refresh_searching();

    if self.is_searching {
      // Settlement schedules the fetch
      self.cancel_in_flight();
      self.generation += 1;
      self.scheduled_fetch = None;
      self.loading_until = None;
      self.is_loading = true;
    } else {
      self.run_pipeline(now);
    }
  }

  /// Go to page `n`. Returns false when the change was rejected.
  pub fn set_page(&mut self, n: u32) -> bool {
    if !self.can_change_page() || n == 0 {
      return false;
    }
    if self.results.total_pages > 0 && n > self.results.total_pages {
      return false;
    }

    self.page = n;
    self.prefs.set_page(n);
    self.run_pipeline(Instant::now());
    true
  }

  /// Advance timers and collect finished fetches.
  /// Returns true if anything observable changed.
  pub fn tick(&mut self) -> bool {
    if self.disposed {
      return false;
    }

    let now = Instant::now();
    let mut changed = false;

    let mut settled = false;
    for debouncer in self.debounced.values_mut() {
      settled |= debouncer.poll(now);
    }
    if settled {
      let was_searching = self.is_searching;
      self.refresh_searching();
      if was_searching && !self.is_searching {
        debug!(kind = %self.kind, "filters settled");
        self.scheduled_fetch = Some(now + self.timings.settle_guard);
      }
      changed = true;
    }

    if self.scheduled_fetch.is_some_and(|at| now >= at) {
      self.run_pipeline(now);
      changed = true;
    }

    changed |= self.collect_completions();

    let pending = self.in_flight.is_some() || self.scheduled_fetch.is_some() || self.is_searching;
    if self.is_loading && !pending && self.loading_until.map_or(true, |at| now >= at) {
      self.is_loading = false;
      self.loading_until = None;
      self.check_empty();
      changed = true;
    }

    changed
  }

  /// Stop all timers and drop any in-flight request. Nothing changes after
  /// this.
  pub fn dispose(&mut self) {
    if self.disposed {
      return;
    }
    self.disposed = true;
    self.cancel_in_flight();
    self.scheduled_fetch = None;
    self.loading_until = None;
    for debouncer in self.debounced.values_mut() {
      debouncer.cancel();
    }
    debug!(kind = %self.kind, "list controller disposed");
  }

  fn refresh_searching(&mut self) {
    self.is_searching = self.debounced.values().any(Debouncer::is_pending);
  }

  fn cancel_in_flight(&mut self) {
    if let Some(flight) = self.in_flight.take() {
      debug!(kind = %self.kind, generation = flight.generation, "cancelling request");
      flight.task.abort();
    }
  }

  /// Serve the current page from cache or start a remote fetch
  fn run_pipeline(&mut self, now: Instant) {
    self.cancel_in_flight();
    self.generation += 1;
    self.scheduled_fetch = None;

    let filters = self.effective_filters();
    let key = build_key(self.kind, self.page, &filters);

    if !self.is_searching {
      if let Some(entry) = self.cache.get(&key) {
        debug!(key = %key, "cache hit");
        self.results = entry.data;
        self.error = None;
        self.is_loading = false;
        self.loading_until = None;
        self.check_empty();
        return;
      }
    }

    debug!(key = %key, generation = self.generation, "fetching");
    self.is_loading = true;
    self.error = None;
    self.loading_until = None;

    let generation = self.generation;
    let tx = self.tx.clone();
    let request = self.source.fetch_page(self.kind, self.page, &filters);
    let task = tokio::spawn(async move {
      let result = request.await;
      // Receiver is gone once the controller is dropped
      let _ = tx.send(Completion {
        generation,
        key,
        started: now,
        result,
      });
    });

    self.in_flight = Some(InFlight { generation, task });
  }

  fn collect_completions(&mut self) -> bool {
    // Checked before draining: a task that finished has already sent
    let finished = self
      .in_flight
      .as_ref()
      .is_some_and(|flight| flight.task.is_finished());

    let mut changed = false;
    while let Ok(completion) = self.rx.try_recv() {
      changed |= self.apply(completion);
    }

    // Finished without sending: the task panicked
    if finished {
      if let Some(flight) = self.in_flight.take() {
        warn!(kind = %self.kind, generation = flight.generation, "fetch task ended without a result");
        self.fail(FetchError::Cancelled, Instant::now());
        changed = true;
      }
    }

    changed
  }

  fn apply(&mut self, completion: Completion) -> bool {
    if completion.generation != self.generation {
      debug!(
        kind = %self.kind,
        generation = completion.generation,
        current = self.generation,
        "discarding superseded response"
      );
      return false;
    }
    self.in_flight = None;

    match completion.result {
      Ok(page) => {
        self.cache.set(completion.key, page.clone());
        self.results = page;
        self.error = None;
        self.loading_until = Some(completion.started + self.timings.min_loading);
      }
      Err(e) => self.fail(e, completion.started),
    }
    true
  }

  fn fail(&mut self, error: FetchError, started: Instant) {
    warn!(kind = %self.kind, page = self.page, "fetch failed: {}", error);
    self.results = PageResult::default();
    self.error = Some(ListError::Fetch(error));
    self.loading_until = Some(started + self.timings.min_loading);
  }

  fn check_empty(&mut self) {
    if self.error.is_none()
      && self.results.items.is_empty()
      && self.effective_filters().has_active()
    {
      self.error = Some(ListError::NoResults(self.kind));
    }
  }
}

impl Drop for ListController {
  fn drop(&mut self) {
    self.cancel_in_flight();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::fixtures;
  use crate::prefs::{KeyValueStore, MemoryStore};
  use futures::future::{BoxFuture, FutureExt};
  use std::collections::VecDeque;
  use std::sync::Mutex;

  type Call = (ResourceKind, u32, FilterSet);

  /// Source that replays queued responses after a delay and records calls
  #[derive(Default)]
  struct MockSource {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<(Duration, Result<PageResult, FetchError>)>>,
  }

  impl MockSource {
    fn respond(&self, delay: Duration, result: Result<PageResult, FetchError>) {
      self.responses.lock().unwrap().push_back((delay, result));
    }

    fn calls(&self) -> Vec<Call> {
      self.calls.lock().unwrap().clone()
    }
  }

  impl PageSource for MockSource {
    fn fetch_page(
      &self,
      kind: ResourceKind,
      page: u32,
      filters: &FilterSet,
    ) -> BoxFuture<'static, Result<PageResult, FetchError>> {
      self
        .calls
        .lock()
        .unwrap()
        .push((kind, page, filters.clone()));
      let (delay, result) = self
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((Duration::ZERO, Ok(PageResult::default())));

      async move {
        tokio::time::sleep(delay).await;
        result
      }
      .boxed()
    }
  }

  struct Harness {
    source: Arc<MockSource>,
    cache: TtlCache,
    store: Arc<MemoryStore>,
  }

  impl Harness {
    fn new() -> Self {
      Self {
        source: Arc::new(MockSource::default()),
        cache: TtlCache::default(),
        store: Arc::new(MemoryStore::new()),
      }
    }

    fn controller(&self, kind: ResourceKind) -> ListController {
      ListController::new(
        kind,
        self.source.clone(),
        self.cache.clone(),
        Preferences::new(self.store.clone(), kind),
        Timings::default(),
      )
    }
  }

  fn characters(n: u32) -> PageResult {
    fixtures::page(
      (1..=n).map(|i| fixtures::character(i, "Rick")).collect(),
      3,
    )
  }

  /// Let virtual time pass in 10 ms steps, ticking after each
  async fn advance(ctrl: &mut ListController, total: Duration) {
    let step = Duration::from_millis(10);
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
      tokio::time::sleep(step).await;
      ctrl.tick();
      elapsed += step;
    }
  }

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[tokio::test(start_paused = true)]
  async fn test_mount_fetches_first_page() {
    let h = Harness::new();
    h.source.respond(ms(50), Ok(characters(2)));

    let mut ctrl = h.controller(ResourceKind::Characters);
    assert!(ctrl.is_loading());
    assert!(ctrl.items().is_empty());

    // Response is in but the loading floor still holds
    advance(&mut ctrl, ms(300)).await;
    assert_eq!(ctrl.items().len(), 2);
    assert!(ctrl.is_loading());

    advance(&mut ctrl, ms(250)).await;
    assert!(!ctrl.is_loading());
    assert_eq!(ctrl.items().len(), 2);
    assert_eq!(ctrl.total_pages(), 3);
    assert!(ctrl.error().is_none());

    let calls = h.source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ResourceKind::Characters);
    assert_eq!(calls[0].1, 1);
    assert!(!calls[0].2.has_active());
  }

  #[tokio::test(start_paused = true)]
  async fn test_text_filter_debounces_then_fetches() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;
    assert!(ctrl.set_page(2));
    advance(&mut ctrl, ms(600)).await;
    assert_eq!(ctrl.page(), 2);

    h.source.respond(Duration::ZERO, Ok(characters(1)));
    ctrl.set_filters(FilterPatch::new().set("name", "Rick"));

    assert_eq!(ctrl.filters().get("name"), "Rick");
    assert_eq!(ctrl.page(), 1);
    assert!(ctrl.is_searching());
    assert!(ctrl.is_loading());
    assert!(!ctrl.can_change_page());

    // 300 ms quiet period + 300 ms guard + 500 ms floor
    advance(&mut ctrl, ms(1000)).await;
    assert!(!ctrl.is_searching());
    assert!(ctrl.is_loading());

    advance(&mut ctrl, ms(200)).await;
    assert!(!ctrl.is_loading());
    assert_eq!(ctrl.items().len(), 1);

    let calls = h.source.calls();
    assert_eq!(calls.len(), 3);
    let (_, page, filters) = &calls[2];
    assert_eq!(*page, 1);
    assert_eq!(filters.get("name"), "Rick");
  }

  #[tokio::test(start_paused = true)]
  async fn test_quick_edits_fetch_once_with_last_value() {
    let h = Harness::new();
    let mut ctrl = h.controller(ResourceKind::Locations);
    advance(&mut ctrl, ms(600)).await;

    for (i, text) in ["E", "Ea", "Eart", "Earth"].into_iter().enumerate() {
      ctrl.set_filters(FilterPatch::new().set("name", text));
      if i < 3 {
        advance(&mut ctrl, ms(100)).await;
      }
    }
    advance(&mut ctrl, ms(1500)).await;

    let calls = h.source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].2.get("name"), "Earth");
  }

  #[tokio::test(start_paused = true)]
  async fn test_network_failure_empties_results() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;
    assert_eq!(ctrl.items().len(), 2);

    h.source.respond(Duration::ZERO, Err(FetchError::Network));
    assert!(ctrl.set_page(2));
    advance(&mut ctrl, ms(600)).await;

    assert!(!ctrl.is_loading());
    assert!(ctrl.items().is_empty());
    assert_eq!(ctrl.total_pages(), 0);
    assert_eq!(ctrl.error(), Some(&ListError::Fetch(FetchError::Network)));
    assert!(ctrl
      .error()
      .unwrap()
      .to_string()
      .contains("Network error"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_empty_result_with_filters_is_an_error() {
    let h = Harness::new();
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;
    // No filters: an empty page is just empty
    assert!(ctrl.error().is_none());

    ctrl.set_filters(FilterPatch::new().set("name", "Zzyzx"));
    advance(&mut ctrl, ms(1500)).await;

    assert!(!ctrl.is_loading());
    assert_eq!(
      ctrl.error(),
      Some(&ListError::NoResults(ResourceKind::Characters))
    );
    assert_eq!(
      ctrl.error().unwrap().to_string(),
      "No characters found with current filters"
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_select_filter_fetches_immediately() {
    let h = Harness::new();
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    h.source.respond(Duration::ZERO, Ok(characters(1)));
    ctrl.set_filters(FilterPatch::new().set("status", "dead"));

    assert!(!ctrl.is_searching());
    assert!(ctrl.is_loading());
    let calls = h.source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].2.get("status"), "dead");
  }

  #[tokio::test(start_paused = true)]
  async fn test_filter_edit_resets_page_and_error() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    h.source.respond(Duration::ZERO, Err(FetchError::RateLimited));
    assert!(ctrl.set_page(3));
    advance(&mut ctrl, ms(600)).await;
    assert_eq!(ctrl.page(), 3);
    assert!(ctrl.error().is_some());

    ctrl.set_filters(FilterPatch::new().set("species", "Alien"));
    assert_eq!(ctrl.page(), 1);
    assert!(ctrl.error().is_none());
    assert_eq!(h.store.get("charactersPage").unwrap().as_deref(), Some("1"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_unchanged_value_is_a_no_op() {
    let h = Harness::new();
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    ctrl.set_filters(FilterPatch::new().set("name", "").set("planet", "Earth"));
    assert!(!ctrl.is_loading());
    assert!(!ctrl.is_searching());
    assert_eq!(h.source.calls().len(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_reverting_text_edit_serves_settled_page_from_cache() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    ctrl.set_filters(FilterPatch::new().set("name", "Rick"));
    assert!(ctrl.is_searching());
    advance(&mut ctrl, ms(100)).await;

    // Back to the settled value inside the quiet period
    ctrl.set_filters(FilterPatch::new().set("name", ""));
    assert!(!ctrl.is_searching());
    assert!(!ctrl.is_loading());
    assert_eq!(ctrl.items().len(), 2);

    advance(&mut ctrl, ms(1500)).await;
    assert_eq!(h.source.calls().len(), 1);
    assert!(ctrl.error().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_separator_in_typed_filter_is_not_a_cache_hit() {
    let h = Harness::new();
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    h.source.respond(Duration::ZERO, Ok(characters(1)));
    ctrl.set_filters(FilterPatch::new().set("name", "rick").set("status", "dead"));
    advance(&mut ctrl, ms(1500)).await;
    assert_eq!(ctrl.items().len(), 1);

    ctrl.set_filters(
      FilterPatch::new()
        .set("name", "rick,status=dead")
        .set("status", ""),
    );
    advance(&mut ctrl, ms(1500)).await;

    let calls = h.source.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].2.get("name"), "rick,status=dead");
    assert_eq!(calls[2].2.get("status"), "");
    assert!(ctrl.items().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_kinds_keep_independent_state() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    h.source.respond(
      Duration::ZERO,
      Ok(fixtures::page(vec![fixtures::location(1, "Earth")], 7)),
    );

    let mut chars = h.controller(ResourceKind::Characters);
    let mut locs = h.controller(ResourceKind::Locations);
    advance(&mut chars, ms(600)).await;
    locs.tick();

    assert_eq!(chars.total_pages(), 3);
    assert_eq!(locs.total_pages(), 7);
    assert!(matches!(locs.items()[0], Entity::Location(_)));
    assert!(h.cache.get("characters_1").is_some());
    assert!(h.cache.get("locations_1").is_some());

    assert!(locs.set_page(4));
    assert_eq!(chars.page(), 1);
    assert_eq!(h.store.get("locationsPage").unwrap().as_deref(), Some("4"));
    assert_eq!(h.store.get("charactersPage").unwrap(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_cache_hit_skips_source_and_floor() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut first = h.controller(ResourceKind::Characters);
    advance(&mut first, ms(600)).await;
    drop(first);

    let second = h.controller(ResourceKind::Characters);
    assert!(!second.is_loading());
    assert_eq!(second.items().len(), 2);
    assert_eq!(h.source.calls().len(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_page_change_guard() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);

    // Still loading
    assert!(!ctrl.can_change_page());
    assert!(!ctrl.set_page(2));

    advance(&mut ctrl, ms(600)).await;
    assert!(ctrl.can_change_page());
    assert!(!ctrl.set_page(0));
    assert!(!ctrl.set_page(4));
    assert!(ctrl.set_page(3));
    assert_eq!(ctrl.page(), 3);
    assert!(ctrl.is_loading());
  }

  #[tokio::test(start_paused = true)]
  async fn test_superseded_response_is_discarded() {
    let h = Harness::new();
    h.source.respond(Duration::ZERO, Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);
    advance(&mut ctrl, ms(600)).await;

    // Slow select-filter request, then a fast one replaces it
    h.source.respond(ms(400), Ok(characters(3)));
    h.source.respond(ms(50), Ok(characters(1)));
    ctrl.set_filters(FilterPatch::new().set("status", "alive"));
    ctrl.set_filters(FilterPatch::new().set("status", "dead"));

    advance(&mut ctrl, ms(1000)).await;
    assert_eq!(ctrl.items().len(), 1);
    assert!(h.cache.get("characters_1_status=alive").is_none());
    assert!(h.cache.get("characters_1_status=dead").is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_dispose_suppresses_late_response() {
    let h = Harness::new();
    h.source.respond(ms(100), Ok(characters(2)));
    let mut ctrl = h.controller(ResourceKind::Characters);

    ctrl.dispose();
    advance(&mut ctrl, ms(600)).await;

    assert!(ctrl.items().is_empty());
    assert!(h.cache.is_empty());
    assert!(!ctrl.tick());
  }

  #[tokio::test(start_paused = true)]
  async fn test_seeds_page_and_filters_from_preferences() {
    let h = Harness::new();
    h.store.set("locationsPage", "5").unwrap();
    h.store
      .set("locationFilters", r#"{"dimension":"C-137","bogus":"x"}"#)
      .unwrap();

    let ctrl = h.controller(ResourceKind::Locations);
    assert_eq!(ctrl.page(), 5);
    assert_eq!(ctrl.filters().get("dimension"), "C-137");
    assert_eq!(ctrl.filters().get("bogus"), "");
    assert!(!ctrl.is_searching());

    let calls = h.source.calls();
    assert_eq!(calls[0].1, 5);
    assert_eq!(calls[0].2.get("dimension"), "C-137");
  }

  #[tokio::test(start_paused = true)]
  async fn test_invalid_stored_page_falls_back_to_first() {
    let h = Harness::new();
    h.store.set("charactersPage", "0").unwrap();
    let ctrl = h.controller(ResourceKind::Characters);
    assert_eq!(ctrl.page(), 1);
  }
}
