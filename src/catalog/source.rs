use futures::future::BoxFuture;

use super::error::FetchError;
use super::filters::FilterSet;
use super::types::{PageResult, ResourceKind};

/// Anything that can produce a page of a resource kind.
///
/// The returned future owns its inputs so it can be spawned; list
/// controllers never hold a borrow across the await.
pub trait PageSource: Send + Sync {
  fn fetch_page(
    &self,
    kind: ResourceKind,
    page: u32,
    filters: &FilterSet,
  ) -> BoxFuture<'static, Result<PageResult, FetchError>>;
}
