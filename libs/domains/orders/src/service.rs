use domain_pricing::{LineItem, Money, checkout};
use domain_products::ProductRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Actor, CreateOrder, Order, OrderItem, OrderStatus};
use crate::repository::OrderRepository;

/// Outcome of a create: `created` is false when an order with the same
/// `clientRef` already existed and was returned instead
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub created: bool,
    pub order: Order,
}

pub struct OrderService<R: OrderRepository, P: ProductRepository> {
    orders: Arc<R>,
    products: Arc<P>,
}

impl<R: OrderRepository, P: ProductRepository> Clone for OrderService<R, P> {
    fn clone(&self) -> Self {
        Self {
            orders: Arc::clone(&self.orders),
            products: Arc::clone(&self.products),
        }
    }
}

impl<R: OrderRepository, P: ProductRepository> OrderService<R, P> {
    pub fn new(orders: Arc<R>, products: Arc<P>) -> Self {
        Self { orders, products }
    }

    /// Price the order from current catalog prices and store it.
    ///
    /// A client-submitted total is only compared and logged.
    #[instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create(&self, user_id: Uuid, input: CreateOrder) -> OrderResult<PlacedOrder> {
        if let Some(ref client_ref) = input.client_ref {
            if let Some(order) = self.orders.find_by_client_ref(user_id, client_ref).await? {
                tracing::info!(order_id = %order.id, %client_ref, "Returning existing order for client reference");
                return Ok(PlacedOrder {
                    created: false,
                    order,
                });
            }
        }

        let items = self.price_items(&input).await?;
        let lines = items
            .iter()
            .map(|item| LineItem::new(Money::from_decimal(item.price)?, item.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = checkout(&lines)?;

        if let Some(client_total) = input.total {
            if totals.differs_from(client_total) {
                tracing::warn!(
                    client_total,
                    server_total = totals.total.to_decimal(),
                    "Client total differs from server pricing; using server total"
                );
            }
        }

        let order = Order::new(user_id, items, totals, &input);
        match self.orders.create(order).await {
            Ok(order) => Ok(PlacedOrder {
                created: true,
                order,
            }),
            Err(OrderError::DuplicateClientRef) => {
                // Lost a race with a concurrent request carrying the same reference
                let client_ref = input.client_ref.as_deref().unwrap_or_default();
                let order = self
                    .orders
                    .find_by_client_ref(user_id, client_ref)
                    .await?
                    .ok_or(OrderError::DuplicateClientRef)?;
                Ok(PlacedOrder {
                    created: false,
                    order,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn price_items(&self, input: &CreateOrder) -> OrderResult<Vec<OrderItem>> {
        let ids: Vec<Uuid> = input.items.iter().map(|line| line.product).collect();
        let products: HashMap<Uuid, _> = self
            .products
            .get_many(ids)
            .await?
            .into_iter()
            .filter(|p| p.is_active())
            .map(|p| (p.id, p))
            .collect();

        input
            .items
            .iter()
            .map(|line| {
                let product = products
                    .get(&line.product)
                    .ok_or(OrderError::ProductNotFound(line.product))?;
                let quantity = u32::try_from(line.quantity)
                    .ok()
                    .filter(|q| *q >= 1)
                    .ok_or_else(|| {
                        OrderError::Validation("Quantity must be at least 1".to_string())
                    })?;
                Ok(OrderItem::from_product(product, quantity))
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn my_orders(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        self.orders.list_by_user(user_id).await
    }

    /// All orders, for admin and delivery staff
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<OrderStatus>) -> OrderResult<Vec<Order>> {
        self.orders.list(status).await
    }

    /// Visible to the owner and to staff
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn get(&self, actor: Actor<'_>, id: Uuid) -> OrderResult<Order> {
        let order = self.find(id).await?;
        if order.is_owned_by(actor.id) || actor.is_staff() {
            Ok(order)
        } else {
            Err(OrderError::Forbidden)
        }
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, to: OrderStatus) -> OrderResult<Order> {
        let order = self.find(id).await?;
        if !order.status.can_advance_to(to) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to,
            });
        }
        self.orders
            .transition(id, order.status, to)
            .await?
            .ok_or(OrderError::Conflict)
    }

    /// Owner or admin, while the order has not shipped
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn cancel(&self, actor: Actor<'_>, id: Uuid) -> OrderResult<Order> {
        let order = self.find(id).await?;
        if !order.is_owned_by(actor.id) && !actor.is_admin() {
            return Err(OrderError::Forbidden);
        }
        if !order.status.is_cancellable() {
            return Err(OrderError::NotCancellable(order.status));
        }
        self.orders
            .transition(id, order.status, OrderStatus::Cancelled)
            .await?
            .ok_or(OrderError::Conflict)
    }

    async fn find(&self, id: Uuid) -> OrderResult<Order> {
        self.orders
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }
}
