use chrono::Utc;
use domain_pricing::{LineItem, Money, checkout};
use reqwest::StatusCode;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Checkout, LOCAL_CANCELLED, LOCAL_CONFIRMED, LOCAL_ORDER_PREFIX, Order, OrderEnvelope,
    OrderLine,
};
use crate::store::{LocalStoreExt, ORDERS_KEY};

/// Result of pushing local orders to the server
#[derive(Debug, Default)]
pub struct OrderSyncReport {
    pub synced: usize,
    pub remaining: usize,
    /// Local orders the server refused; they are no longer kept
    pub rejected: Vec<(Order, ClientError)>,
    pub error: Option<ClientError>,
}

/// Placed order plus whether the server created it now or returned an
/// earlier one with the same client reference
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub created: bool,
}

#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn local_orders(&self) -> Vec<Order> {
        self.api.store().get_list(ORDERS_KEY).await
    }

    async fn save_local(&self, orders: &[Order]) -> ClientResult<()> {
        self.api.store().set_json(ORDERS_KEY, &orders).await
    }

    /// Place an order. Signed out or offline, the order is kept locally as
    /// `local_<millis>_<uuid>` and pushed by [`sync_local_orders`](Self::sync_local_orders).
    #[instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create(&self, input: &Checkout) -> ClientResult<PlacedOrder> {
        if input.items.is_empty() {
            return Err(ClientError::Api {
                status: 400,
                message: "Order must contain at least one item".to_string(),
            });
        }
        let local = local_order(input)?;

        if self.api.is_authenticated().await {
            match self.submit(&local, &local.id).await {
                Ok(placed) => return Ok(placed),
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Keeping order locally");
                }
                Err(e) => return Err(e),
            }
        }

        let mut orders = self.local_orders().await;
        orders.push(local.clone());
        self.save_local(&orders).await?;
        tracing::info!(order_id = %local.id, total = local.total, "Saved local order");

        Ok(PlacedOrder {
            order: local,
            created: true,
        })
    }

    async fn submit(&self, order: &Order, client_ref: &str) -> ClientResult<PlacedOrder> {
        let items: Vec<_> = order
            .items
            .iter()
            .map(|line| json!({ "productId": line.product_id, "quantity": line.quantity }))
            .collect();
        let body = json!({
            "items": items,
            "shippingAddress": order.shipping_address,
            "paymentMethod": order.payment_method,
            "deliveryDate": order.delivery_date,
            "timeSlot": order.time_slot,
            "total": order.total,
            "clientRef": client_ref,
        });

        let (status, envelope): (StatusCode, OrderEnvelope) =
            self.api.post_with_status("/orders", &body).await?;
        Ok(PlacedOrder {
            order: envelope.order,
            created: status == StatusCode::CREATED,
        })
    }

    /// Server orders (when signed in) followed by orders not yet synced
    pub async fn my_orders(&self) -> ClientResult<Vec<Order>> {
        let mut orders = Vec::new();
        if self.api.is_authenticated().await {
            match self.api.get::<Vec<Order>>("/orders/my-orders").await {
                Ok(server) => orders = server,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Orders unavailable, showing local orders");
                }
                Err(e) => return Err(e),
            }
        }
        orders.extend(self.local_orders().await);
        Ok(orders)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Order> {
        if id.starts_with(LOCAL_ORDER_PREFIX) {
            return self
                .local_orders()
                .await
                .into_iter()
                .find(|order| order.id == id)
                .ok_or_else(|| ClientError::NotFound(format!("Order {}", id)));
        }
        self.api.get(&format!("/orders/{}", id)).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> ClientResult<Order> {
        if !id.starts_with(LOCAL_ORDER_PREFIX) {
            let envelope: OrderEnvelope =
                self.api.put_empty(&format!("/orders/{}/cancel", id)).await?;
            return Ok(envelope.order);
        }

        let mut orders = self.local_orders().await;
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Order {}", id)))?;
        if order.status == LOCAL_CANCELLED {
            return Err(ClientError::Api {
                status: 400,
                message: "Order is already cancelled".to_string(),
            });
        }
        order.status = LOCAL_CANCELLED.to_string();
        let cancelled = order.clone();
        self.save_local(&orders).await?;
        Ok(cancelled)
    }

    /// Submit local orders in placement order using their local id as the
    /// client reference, so a retried submission never creates a duplicate.
    /// Cancelled local orders are dropped without being sent, and so are
    /// orders the server rejects (a 4xx such as a product deleted since).
    pub async fn sync_local_orders(&self) -> ClientResult<OrderSyncReport> {
        let mut pending = self.local_orders().await;
        let mut report = OrderSyncReport::default();

        pending.retain(|order| order.status != LOCAL_CANCELLED);
        self.save_local(&pending).await?;

        while let Some(order) = pending.first() {
            match self.submit(order, &order.id).await {
                Ok(placed) => {
                    tracing::info!(
                        local_id = %order.id,
                        order_id = %placed.order.id,
                        "Synced local order"
                    );
                    pending.remove(0);
                    self.save_local(&pending).await?;
                    report.synced += 1;
                }
                Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                Err(e) if e.is_rejected() => {
                    tracing::warn!(error = %e, local_id = %order.id, "Local order rejected, dropping it");
                    let order = pending.remove(0);
                    self.save_local(&pending).await?;
                    report.rejected.push((order, e));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Order sync stopped");
                    report.error = Some(e);
                    break;
                }
            }
        }

        report.remaining = pending.len();
        Ok(report)
    }
}

/// Price a checkout locally with the same arithmetic the server uses
fn local_order(input: &Checkout) -> ClientResult<Order> {
    let lines = input
        .items
        .iter()
        .map(|line| LineItem::new(Money::from_decimal(line.price)?, line.quantity))
        .collect::<Result<Vec<_>, _>>()?;
    let totals = checkout(&lines)?;
    let now = Utc::now();

    Ok(Order {
        // Doubles as the server's clientRef, so it must be unique per order
        id: format!(
            "{}{}_{}",
            LOCAL_ORDER_PREFIX,
            now.timestamp_millis(),
            Uuid::now_v7().simple()
        ),
        items: input
            .items
            .iter()
            .map(|line| OrderLine {
                product_id: line.id,
                quantity: line.quantity,
                price: line.price,
                name: line.name.clone(),
                image: line.image.clone(),
            })
            .collect(),
        subtotal: totals.subtotal.to_decimal(),
        tax: totals.tax.to_decimal(),
        discount: totals.discount.to_decimal(),
        delivery: totals.delivery.to_decimal(),
        total: totals.total.to_decimal(),
        status: LOCAL_CONFIRMED.to_string(),
        shipping_address: input.shipping_address.clone(),
        payment_method: input.payment_method.clone(),
        delivery_date: input.delivery_date,
        time_slot: input.time_slot.clone(),
        created_at: now,
    })
}
