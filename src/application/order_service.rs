use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::catalog::CatalogProduct;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    freeze_line_items, requested_quantities, Order, OrderPlacement, RequestedItem,
};
use crate::domain::ports::{AccountDirectory, OrderRepository, ProductCatalog};

/// Composes orders from the account directory, the product catalog and the
/// order store.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    accounts: Arc<dyn AccountDirectory>,
    catalog: Arc<dyn ProductCatalog>,
    upstream_timeout: Duration,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        accounts: Arc<dyn AccountDirectory>,
        catalog: Arc<dyn ProductCatalog>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            accounts,
            catalog,
            upstream_timeout,
        }
    }

    /// Places an order for `account_id`, stored under the id as given.
    ///
    /// Quantities are validated before either upstream service is asked.
    /// The account check and the catalog lookup run concurrently; the first
    /// failure cancels the other and nothing is written. Requested products
    /// the catalog does not resolve are left out and reported in the
    /// placement. Prices are frozen at the values the catalog returned.
    pub async fn post_order(
        &self,
        account_id: &str,
        items: &[RequestedItem],
    ) -> Result<OrderPlacement, DomainError> {
        let requested = requested_quantities(items)?;
        let ids: Vec<String> = requested.keys().cloned().collect();

        let ((), products) =
            tokio::try_join!(self.ensure_account(account_id), self.lookup_products(&ids))?;

        let (line_items, unavailable_product_ids) = freeze_line_items(&requested, &products);
        if !unavailable_product_ids.is_empty() {
            log::warn!(
                "Dropping products unknown to the catalog from order for account {}: {:?}",
                account_id,
                unavailable_product_ids
            );
        }

        let order = Order::place(account_id.to_string(), line_items)?;

        let stored = order.clone();
        self.run_blocking(move |repo| repo.put(&stored))
            .await
            .inspect_err(|e| log::error!("Failed to store order {}: {}", order.id, e))?;

        log::info!(
            "Created order {} for account {} ({} lines, total {})",
            order.id,
            order.account_id,
            order.line_items.len(),
            order.total_price
        );

        Ok(OrderPlacement {
            order,
            unavailable_product_ids,
        })
    }

    /// Returns a stored order with current catalog names and descriptions.
    pub async fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        let order = self
            .run_blocking(move |repo| repo.find_by_id(id))
            .await?
            .ok_or(DomainError::OrderNotFound(id))?;

        let mut orders = [order];
        self.enrich(&mut orders).await;
        let [order] = orders;
        Ok(order)
    }

    /// Returns every order of `account_id`, sorted by order id. An unknown
    /// account simply has no orders.
    pub async fn get_account_orders(&self, account_id: &str) -> Result<Vec<Order>, DomainError> {
        let account_id = account_id.to_string();
        let mut orders = self
            .run_blocking(move |repo| repo.find_by_account(&account_id))
            .await?;

        self.enrich(&mut orders).await;
        Ok(orders)
    }

    async fn ensure_account(&self, account_id: &str) -> Result<(), DomainError> {
        self.with_deadline("account service", self.accounts.get(account_id))
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::AccountNotFound(account_id.to_string()))
    }

    async fn lookup_products(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CatalogProduct>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.with_deadline("catalog service", self.catalog.get_by_ids(ids))
            .await
    }

    /// Overlays live catalog text on stored orders. A failing or slow catalog
    /// leaves the descriptive fields blank instead of failing the read.
    async fn enrich(&self, orders: &mut [Order]) {
        let ids: Vec<String> = orders
            .iter()
            .flat_map(|o| o.product_ids())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let products = match self.lookup_products(&ids).await {
            Ok(products) => products,
            Err(e) => {
                log::warn!("Serving orders without catalog details: {}", e);
                HashMap::new()
            }
        };

        for order in orders.iter_mut() {
            order.apply_catalog(&products);
        }
    }

    async fn with_deadline<T>(
        &self,
        upstream: &str,
        call: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.upstream_timeout, call)
            .await
            .map_err(|_| {
                DomainError::UpstreamUnavailable(format!(
                    "{} did not answer within {:?}",
                    upstream, self.upstream_timeout
                ))
            })?
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn OrderRepository) -> Result<T, DomainError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(repo.as_ref()))
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
    }
}
