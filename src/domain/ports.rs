use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::catalog::{Account, CatalogProduct};
use super::errors::DomainError;
use super::order::Order;

/// Durable storage for orders. Blocking; callers run it off the async
/// executor.
pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the header and every line in one transaction.
    fn put(&self, order: &Order) -> Result<(), DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Orders of one account, sorted by order id.
    fn find_by_account(&self, account_id: &str) -> Result<Vec<Order>, DomainError>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// `Ok(None)` when the account does not exist.
    async fn get(&self, account_id: &str) -> Result<Option<Account>, DomainError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    /// Current data for each id the catalog knows. Unknown ids are simply
    /// missing from the map.
    async fn get_by_ids(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CatalogProduct>, DomainError>;
}
