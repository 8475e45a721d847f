use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use super::catalog::CatalogProduct;
use super::errors::DomainError;

/// One `(product, quantity)` pair as the caller asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub description: String,
    /// Catalog price observed when the order was placed. Never refreshed.
    pub price: BigDecimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub account_id: String,
    pub total_price: BigDecimal,
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Starts a new order from already frozen line items.
    ///
    /// The id is a UUIDv7, so ids sort in creation order. The timestamp is
    /// truncated to the microsecond precision the store keeps.
    pub fn place(account_id: String, line_items: Vec<LineItem>) -> Result<Self, DomainError> {
        if line_items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let total_price = line_total(&line_items);
        Ok(Self {
            id: Uuid::now_v7(),
            created_at: Utc::now().trunc_subsecs(6),
            account_id,
            total_price,
            line_items,
        })
    }

    /// Sum of the frozen line prices. Equals `total_price` for every order
    /// this crate has written.
    pub fn line_total(&self) -> BigDecimal {
        line_total(&self.line_items)
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.line_items.iter().map(|l| l.product_id.as_str())
    }

    /// Overlays current catalog names and descriptions for display.
    ///
    /// Price and quantity are left alone. Products the catalog no longer
    /// knows get blank descriptive fields.
    pub fn apply_catalog(&mut self, catalog: &HashMap<String, CatalogProduct>) {
        for line in &mut self.line_items {
            match catalog.get(&line.product_id) {
                Some(product) => {
                    line.name.clone_from(&product.name);
                    line.description.clone_from(&product.description);
                }
                None => {
                    line.name.clear();
                    line.description.clear();
                }
            }
        }
    }
}

/// Result of a successful creation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlacement {
    pub order: Order,
    /// Requested products the catalog could not resolve. They were left out
    /// of the order; this is informational, not a failure.
    pub unavailable_product_ids: Vec<String>,
}

pub fn line_total(items: &[LineItem]) -> BigDecimal {
    items.iter().map(LineItem::subtotal).sum()
}

/// Largest quantity a single line can hold in the store.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

/// Collapses the request to one quantity per product id.
///
/// Repeated ids have their quantities summed. Products whose quantity ends
/// up zero are not ordered and are dropped here. A product whose summed
/// quantity exceeds [`MAX_LINE_QUANTITY`] rejects the whole request.
pub fn requested_quantities(
    items: &[RequestedItem],
) -> Result<BTreeMap<String, u32>, DomainError> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for item in items {
        *totals.entry(item.product_id.clone()).or_default() += u64::from(item.quantity);
    }
    let mut quantities = BTreeMap::new();
    for (product_id, quantity) in totals {
        if quantity == 0 {
            continue;
        }
        match u32::try_from(quantity) {
            Ok(q) if q <= MAX_LINE_QUANTITY => {
                quantities.insert(product_id, q);
            }
            _ => return Err(DomainError::InvalidQuantity { product_id, quantity }),
        }
    }
    Ok(quantities)
}

/// Freezes catalog prices into line items.
///
/// Returns the line items for every requested product the catalog resolved,
/// plus the ids it did not resolve.
pub fn freeze_line_items(
    requested: &BTreeMap<String, u32>,
    catalog: &HashMap<String, CatalogProduct>,
) -> (Vec<LineItem>, Vec<String>) {
    let mut line_items = Vec::with_capacity(requested.len());
    let mut unavailable = Vec::new();
    for (product_id, &quantity) in requested {
        match catalog.get(product_id) {
            Some(product) => line_items.push(LineItem {
                product_id: product_id.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price.clone(),
                quantity,
            }),
            None => unavailable.push(product_id.clone()),
        }
    }
    (line_items, unavailable)
}
