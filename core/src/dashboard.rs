//! Dashboard overview counters.
//!
//! Each counter is the length of an `orderHistory` listing. The overview
//! holds subscriptions to all four queries, so an order status update
//! refreshes them.

use crate::endpoints::Query;
use crate::error::ApiError;
use crate::store::{ApiStore, Subscription};
use crate::transport::Transport;
use crate::types::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounters {
    pub all: usize,
    pub delivered: usize,
    pub shipped: usize,
    pub pending: usize,
}

pub struct DashboardOverview<'a, T: Transport> {
    all: Subscription<'a, T>,
    delivered: Subscription<'a, T>,
    shipped: Subscription<'a, T>,
    pending: Subscription<'a, T>,
}

impl<'a, T: Transport> DashboardOverview<'a, T> {
    pub fn open(store: &'a ApiStore<T>) -> Self {
        Self {
            all: store.subscribe(Query::OrderHistory(None)),
            delivered: store.subscribe(Query::OrderHistory(Some(OrderStatus::Delivered))),
            shipped: store.subscribe(Query::OrderHistory(Some(OrderStatus::Shipped))),
            pending: store.subscribe(Query::OrderHistory(Some(OrderStatus::Pending))),
        }
    }

    pub async fn counters(&self) -> Result<OrderCounters, ApiError> {
        Ok(OrderCounters {
            all: count(&self.all).await?,
            delivered: count(&self.delivered).await?,
            shipped: count(&self.shipped).await?,
            pending: count(&self.pending).await?,
        })
    }
}

async fn count<T: Transport>(subscription: &Subscription<'_, T>) -> Result<usize, ApiError> {
    let orders: Vec<Order> = subscription.data_as().await?;
    Ok(orders.len())
}
