use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::catalog::CatalogProduct;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductCatalog;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::UpstreamUnavailable(e.to_string())
    }
}

/// Appends percent-encoded path segments to a service base URL.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, DomainError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DomainError::UpstreamUnavailable(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Catalog service over HTTP: `GET {base}/products?ids=a&ids=b` answering
/// with the products it knows. Each id is its own query parameter, so ids may
/// contain any character.
pub struct HttpProductCatalog {
    client: Client,
    base_url: Url,
}

impl HttpProductCatalog {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn products_url(&self, ids: &[String]) -> Result<Url, DomainError> {
        let mut url = endpoint(&self.base_url, &["products"])?;
        url.query_pairs_mut()
            .extend_pairs(ids.iter().map(|id| ("ids", id)));
        Ok(url)
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn get_by_ids(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CatalogProduct>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = self.products_url(ids)?;
        let products = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CatalogProduct>>()
            .await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}
