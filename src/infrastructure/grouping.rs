//! Rebuilds nested orders from the flat rows of the header/line join.
//!
//! Rows of one order must arrive next to each other, which the store
//! guarantees by sorting on the order id. Every change of order id closes
//! the order being built and starts the next one.

use std::collections::HashSet;
use std::mem;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{LineItem, Order};

use super::models::{OrderLineRow, OrderRow};

#[derive(Debug, Default)]
enum Accumulator {
    #[default]
    Empty,
    Accumulating(Order),
}

#[derive(Debug, Default)]
pub struct OrderAssembler {
    current: Accumulator,
    finished: Vec<Order>,
    seen: HashSet<Uuid>,
}

impl OrderAssembler {
    pub fn push(&mut self, header: OrderRow, line: OrderLineRow) -> Result<(), DomainError> {
        let line = line_item(line)?;

        if let Accumulator::Accumulating(order) = &mut self.current {
            if order.id == header.id {
                order.line_items.push(line);
                return Ok(());
            }
        }

        if !self.seen.insert(header.id) {
            return Err(DomainError::Persistence(format!(
                "rows of order {} are not contiguous",
                header.id
            )));
        }

        let next = Accumulator::Accumulating(Order {
            id: header.id,
            created_at: header.created_at,
            account_id: header.account_id,
            total_price: header.total_price,
            line_items: vec![line],
        });
        if let Accumulator::Accumulating(done) = mem::replace(&mut self.current, next) {
            self.flush(done);
        }
        Ok(())
    }

    pub fn finish(mut self) -> Vec<Order> {
        if let Accumulator::Accumulating(done) = mem::take(&mut self.current) {
            self.flush(done);
        }
        self.finished
    }

    fn flush(&mut self, order: Order) {
        let line_total = order.line_total();
        if order.total_price != line_total {
            log::error!(
                "Order {} stores total {} but its lines sum to {}",
                order.id,
                order.total_price,
                line_total
            );
        }
        self.finished.push(order);
    }
}

/// Groups rows sorted by order id into orders, preserving that order.
pub fn assemble_orders<I>(rows: I) -> Result<Vec<Order>, DomainError>
where
    I: IntoIterator<Item = (OrderRow, OrderLineRow)>,
{
    let mut assembler = OrderAssembler::default();
    for (header, line) in rows {
        assembler.push(header, line)?;
    }
    Ok(assembler.finish())
}

fn line_item(row: OrderLineRow) -> Result<LineItem, DomainError> {
    let quantity = u32::try_from(row.quantity).map_err(|_| {
        DomainError::Persistence(format!(
            "order {} stores invalid quantity {} for product {}",
            row.order_id, row.quantity, row.product_id
        ))
    })?;
    Ok(LineItem {
        product_id: row.product_id,
        name: String::new(),
        description: String::new(),
        price: row.price,
        quantity,
    })
}
