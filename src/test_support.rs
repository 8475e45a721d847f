//! In-memory stand-ins for the store and the two upstream services.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::catalog::{Account, CatalogProduct};
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{AccountDirectory, OrderRepository, ProductCatalog};
use crate::infrastructure::grouping::assemble_orders;
use crate::infrastructure::models::{OrderLineRow, OrderRow};
use crate::infrastructure::order_repo::rows_of;

pub fn product(id: &str, name: &str, price: &str) -> CatalogProduct {
    CatalogProduct {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        price: BigDecimal::from_str(price).expect("valid decimal"),
    }
}

/// Keeps the same flat header/line rows the database would.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    rows: Mutex<Vec<(OrderRow, OrderLineRow)>>,
    fail_writes: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        let rows = self.rows.lock().expect("lock");
        rows.iter().map(|(h, _)| h.id).collect::<HashSet<_>>().len()
    }

    fn select(&self, keep: impl Fn(&OrderRow) -> bool) -> Vec<(OrderRow, OrderLineRow)> {
        let rows = self.rows.lock().expect("lock");
        let mut selected: Vec<_> = rows.iter().filter(|(h, _)| keep(h)).cloned().collect();
        selected.sort_by(|(ha, la), (hb, lb)| {
            (ha.id, &la.product_id).cmp(&(hb.id, &lb.product_id))
        });
        selected
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn put(&self, order: &Order) -> Result<(), DomainError> {
        if order.line_items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("write rejected".to_string()));
        }
        let (header, lines) = rows_of(order)?;
        let mut rows = self.rows.lock().expect("lock");
        rows.extend(lines.into_iter().map(|line| (header.clone(), line)));
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(assemble_orders(self.select(|h| h.id == id))?.into_iter().next())
    }

    fn find_by_account(&self, account_id: &str) -> Result<Vec<Order>, DomainError> {
        assemble_orders(self.select(|h| h.account_id == account_id))
    }
}

pub struct FakeAccounts {
    known: HashSet<String>,
    delay: Option<Duration>,
    canonical_id: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeAccounts {
    pub fn with(ids: &[&str]) -> Self {
        Self {
            known: ids.iter().map(|id| id.to_string()).collect(),
            delay: None,
            canonical_id: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answers for known accounts with `id` instead of the requested id.
    pub fn answering_as(mut self, id: &str) -> Self {
        self.canonical_id = Some(id.to_string());
        self
    }
}

#[async_trait]
impl AccountDirectory for FakeAccounts {
    async fn get(&self, account_id: &str) -> Result<Option<Account>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.known.contains(account_id).then(|| Account {
            id: self
                .canonical_id
                .clone()
                .unwrap_or_else(|| account_id.to_string()),
            name: format!("{account_id} name"),
        }))
    }
}

pub struct FakeCatalog {
    products: Mutex<HashMap<String, CatalogProduct>>,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with(products: Vec<CatalogProduct>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id.clone(), p)).collect()),
            failing: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let catalog = Self::with(vec![]);
        catalog.set_failing(true);
        catalog
    }

    pub fn delayed(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn upsert(&self, product: CatalogProduct) {
        let mut products = self.products.lock().expect("lock");
        products.insert(product.id.clone(), product);
    }

    pub fn remove(&self, id: &str) {
        self.products.lock().expect("lock").remove(id);
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn get_by_ids(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CatalogProduct>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::UpstreamUnavailable("catalog is down".to_string()));
        }
        let products = self.products.lock().expect("lock");
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}
