use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Order has no orderable products")]
    EmptyOrder,
    #[error("Quantity {quantity} of product {product_id} exceeds the largest orderable quantity")]
    InvalidQuantity { product_id: String, quantity: u64 },
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),
    /// A collaborator was unreachable, answered unexpectedly or timed out.
    /// Nothing was written, so the caller may retry.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The store failed; a failed write was rolled back entirely.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}
