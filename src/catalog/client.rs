use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Response;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;

use super::api_types::{ApiPage, OneOrMany};
use super::error::FetchError;
use super::filters::FilterSet;
use super::source::PageSource;
use super::types::{Character, Entity, Location, PageResult, ResourceKind};

/// HTTP client for the catalog API.
/// Clone is cheap, the reqwest client shares its connection pool.
#[derive(Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base: Url,
}

impl CatalogClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let mut base = Url::parse(&config.api_url)
      .map_err(|e| eyre!("Invalid api_url {}: {}", config.api_url, e))?;

    // Url::join replaces the last segment unless the path ends with '/'
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    Ok(Self { http, base })
  }

  /// URL for one page: `page=<n>` then every non-blank filter, lowercased
  pub fn page_url(
    &self,
    kind: ResourceKind,
    page: u32,
    filters: &FilterSet,
  ) -> Result<Url, FetchError> {
    let mut url = self.endpoint(kind.endpoint())?;
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("page", &page.to_string());
      for (field, value) in filters.active() {
        query.append_pair(field, &value.to_lowercase());
      }
    }
    Ok(url)
  }

  fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
    self
      .base
      .join(path)
      .map_err(|e| FetchError::RequestSetup(e.to_string()))
  }

  /// Fetch one page of `kind`
  pub async fn get_page(
    &self,
    kind: ResourceKind,
    page: u32,
    filters: &FilterSet,
  ) -> Result<PageResult, FetchError> {
    let url = self.page_url(kind, page, filters)?;
    debug!(%url, "fetching page");

    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(FetchError::from_transport)?;
    let response = check_status(kind, response).await?;

    let result = match kind {
      ResourceKind::Characters => response
        .json::<ApiPage<Character>>()
        .await
        .map_err(FetchError::from_transport)?
        .into_page_result(Entity::Character),
      ResourceKind::Locations => response
        .json::<ApiPage<Location>>()
        .await
        .map_err(FetchError::from_transport)?
        .into_page_result(Entity::Location),
    };

    Ok(result)
  }

  /// Fetch several characters by id in one request
  pub async fn fetch_characters(&self, ids: &[u32]) -> Result<Vec<Character>, FetchError> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let joined = ids
      .iter()
      .map(u32::to_string)
      .collect::<Vec<_>>()
      .join(",");
    let url = self.endpoint(&format!("character/{}", joined))?;
    debug!(%url, count = ids.len(), "fetching characters by id");

    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(FetchError::from_transport)?;
    let response = check_status(ResourceKind::Characters, response).await?;

    let body: OneOrMany<Character> = response.json().await.map_err(FetchError::from_transport)?;
    Ok(body.into_vec())
  }
}

async fn check_status(kind: ResourceKind, response: Response) -> Result<Response, FetchError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().await.unwrap_or_default();
  Err(FetchError::from_status(kind, status.as_u16(), &body))
}

impl PageSource for CatalogClient {
  fn fetch_page(
    &self,
    kind: ResourceKind,
    page: u32,
    filters: &FilterSet,
  ) -> BoxFuture<'static, Result<PageResult, FetchError>> {
    let client = self.clone();
    let filters = filters.clone();
    async move { client.get_page(kind, page, &filters).await }.boxed()
  }
}
