//! Orders Domain
//!
//! Orders snapshot product name, price and image at purchase time. Totals are
//! always computed server side with [`domain_pricing::checkout`]; a total sent
//! by the client is compared and logged, never stored.
//!
//! Placement is idempotent per user through an optional `clientRef`, so a
//! client retrying a checkout gets the original order back.
//!
//! Status moves forward only:
//!
//! ```text
//! pending -> confirmed -> processing -> in-transit -> delivered
//!
//! pending | confirmed | processing -> cancelled   (owner or admin)
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::{ApiDoc, orders_router};
pub use models::{
    Actor, CreateOrder, Order, OrderEnvelope, OrderItem, OrderLineInput, OrderStatus,
    ShippingAddress, UpdateOrderStatus,
};
pub use self::mongodb::MongoOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::{OrderService, PlacedOrder};
