use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders};

use super::grouping::assemble_orders;
use super::models::{OrderLineRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn rows_of(order: &Order) -> Result<(OrderRow, Vec<OrderLineRow>), DomainError> {
    let header = OrderRow {
        id: order.id,
        created_at: order.created_at,
        account_id: order.account_id.clone(),
        total_price: order.total_price.clone(),
    };
    let lines = order
        .line_items
        .iter()
        .map(|l| {
            let quantity = i32::try_from(l.quantity).map_err(|_| {
                DomainError::Persistence(format!(
                    "quantity {} of product {} does not fit the store",
                    l.quantity, l.product_id
                ))
            })?;
            Ok(OrderLineRow {
                order_id: order.id,
                product_id: l.product_id.clone(),
                quantity,
                price: l.price.clone(),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok((header, lines))
}

impl OrderRepository for DieselOrderRepository {
    fn put(&self, order: &Order) -> Result<(), DomainError> {
        if order.line_items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let (header, lines) = rows_of(order)?;
        let mut conn = self.pool.get()?;

        // Header and lines commit together; any failure rolls back both.
        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(orders::table)
                .values(&header)
                .execute(conn)?;
            diesel::insert_into(order_lines::table)
                .values(&lines)
                .execute(conn)?;
            Ok(())
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .inner_join(order_lines::table)
            .filter(orders::id.eq(id))
            .order(order_lines::product_id.asc())
            .select((OrderRow::as_select(), OrderLineRow::as_select()))
            .load::<(OrderRow, OrderLineRow)>(&mut conn)?;

        Ok(assemble_orders(rows)?.into_iter().next())
    }

    fn find_by_account(&self, account_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        // Grouping relies on the rows of one order being adjacent.
        let rows = orders::table
            .inner_join(order_lines::table)
            .filter(orders::account_id.eq(account_id))
            .order((orders::id.asc(), order_lines::product_id.asc()))
            .select((OrderRow::as_select(), OrderLineRow::as_select()))
            .load::<(OrderRow, OrderLineRow)>(&mut conn)?;

        assemble_orders(rows)
    }
}
