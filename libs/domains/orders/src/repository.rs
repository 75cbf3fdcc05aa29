use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderStatus};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order. Fails with `DuplicateClientRef` when the user already
    /// has an order with the same `client_ref`.
    async fn create(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>>;

    async fn find_by_client_ref(&self, user_id: Uuid, client_ref: &str)
    -> OrderResult<Option<Order>>;

    /// A user's orders, newest first
    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>>;

    /// All orders, newest first
    async fn list(&self, status: Option<OrderStatus>) -> OrderResult<Vec<Order>>;

    /// Set `to` only if the order is still in `from`. Returns `None` when the
    /// order is missing or its status changed in the meantime.
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        let mut orders = self.orders.write().await;
        if let Some(ref client_ref) = order.client_ref {
            let taken = orders
                .values()
                .any(|o| o.user == order.user && o.client_ref.as_ref() == Some(client_ref));
            if taken {
                return Err(OrderError::DuplicateClientRef);
            }
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_client_ref(
        &self,
        user_id: Uuid,
        client_ref: &str,
    ) -> OrderResult<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.user == user_id && o.client_ref.as_deref() == Some(client_ref))
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list(&self, status: Option<OrderStatus>) -> OrderResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == from => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateOrder, Order};
    use domain_pricing::{LineItem, Money, checkout};

    fn order(user: Uuid, client_ref: Option<&str>) -> Order {
        let totals = checkout(&[LineItem::new(Money::from_major(1000), 1).unwrap()]).unwrap();
        let input = CreateOrder {
            items: vec![],
            shipping_address: None,
            payment_method: Some("cash".to_string()),
            delivery_date: None,
            time_slot: None,
            total: None,
            client_ref: client_ref.map(str::to_string),
        };
        Order::new(user, vec![], totals, &input)
    }

    #[tokio::test]
    async fn test_client_ref_unique_per_user() {
        let repo = InMemoryOrderRepository::new();
        let user = Uuid::now_v7();

        repo.create(order(user, Some("ref-1"))).await.unwrap();
        let again = repo.create(order(user, Some("ref-1"))).await;
        assert!(matches!(again, Err(OrderError::DuplicateClientRef)));

        repo.create(order(Uuid::now_v7(), Some("ref-1"))).await.unwrap();
        repo.create(order(user, None)).await.unwrap();
        repo.create(order(user, None)).await.unwrap();

        let found = repo.find_by_client_ref(user, "ref-1").await.unwrap();
        assert!(found.is_some());
        assert_eq!(repo.list_by_user(user).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create(order(Uuid::now_v7(), None)).await.unwrap();

        let moved = repo
            .transition(created.id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(moved.unwrap().status, OrderStatus::Confirmed);

        let stale = repo
            .transition(created.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert!(stale.is_none());
    }
}
