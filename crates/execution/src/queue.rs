//! The per-bar order queue.

use ashare_types::{Order, OrderQuantity, OrderSide};

/// Orders enqueued by the strategy during one bar callback.
///
/// The sequence counter is monotonic across the whole run; within a bar it
/// establishes the tie-break order inside each side.
#[derive(Debug, Default)]
pub struct OrderQueue {
    orders: Vec<Order>,
    next_seq: u64,
}

impl OrderQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an order with a fresh sequence number.
    pub fn push(&mut self, symbol: impl Into<String>, side: OrderSide, quantity: OrderQuantity) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.orders.push(Order {
            symbol: symbol.into(),
            side,
            quantity,
            seq,
        });
    }

    /// Number of queued orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Takes every queued order, sorted sells-first and by sequence within
    /// each side. The queue is left empty.
    #[must_use]
    pub fn drain_sorted(&mut self) -> Vec<Order> {
        let mut orders = std::mem::take(&mut self.orders);
        orders.sort_by_key(|order| (order.side == OrderSide::Buy, order.seq));
        orders
    }
}
