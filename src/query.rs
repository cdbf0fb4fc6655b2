//! One-shot async query for views that load a single value.
//!
//! A `Query<T, E>` owns a fetcher closure, spawns it on `fetch()` and hands
//! the result back through a channel that the view drains from its tick
//! handler:
//!
//! ```ignore
//! let client = client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.fetch_characters(&ids).await }
//! });
//! query.fetch();
//!
//! // In the event loop tick
//! if query.poll() {
//!     // State changed, redraw
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::FetchError;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T, E> {
  /// Query has not been started
  Idle,
  Loading,
  Success(T),
  Error(E),
}

impl<T, E> QueryState<T, E> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&E> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

type FetcherFn<T, E> = Box<dyn Fn() -> BoxFuture<T, E> + Send + Sync>;

pub struct Query<T, E = FetchError> {
  state: QueryState<T, E>,
  fetcher: FetcherFn<T, E>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, E>>>,
  task: Option<JoinHandle<()>>,
}

impl<T, E> Query<T, E>
where
  T: Send + 'static,
  E: From<FetchError> + Send + 'static,
{
  /// Create a query. The fetcher runs once per `fetch()`/`refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      task: None,
    }
  }

  pub fn state(&self) -> &QueryState<T, E> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&E> {
    self.state.error()
  }

  /// Start fetching unless a fetch is already running
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Abort any running fetch and start over
  pub fn refetch(&mut self) {
    self.cancel();
    self.start_fetch();
  }

  /// Collect a finished fetch. Returns true if the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      // Sender dropped without sending: the task panicked
      Err(mpsc::error::TryRecvError::Disconnected) => Err(FetchError::Cancelled.into()),
    };

    self.receiver = None;
    self.task = None;
    self.state = match result {
      Ok(data) => QueryState::Success(data),
      Err(e) => QueryState::Error(e),
    };
    true
  }

  fn cancel(&mut self) {
    self.receiver = None;
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    self.task = Some(tokio::spawn(async move {
      // Receiver is gone if the query was refetched or dropped
      let _ = tx.send(future.await);
    }));
  }
}

impl<T, E> Drop for Query<T, E> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Query<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
