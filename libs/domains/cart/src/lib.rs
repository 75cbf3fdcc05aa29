//! Cart Domain
//!
//! One cart document per user. Lines carry a snapshot of the product's name,
//! price and first image taken when the line was last touched.
//!
//! Adds accept an optional client-generated `mutationId`; the last
//! [`MUTATION_HISTORY`] ids are remembered on the cart so a replayed add is
//! acknowledged without being applied twice.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CartError, CartResult};
pub use handlers::{ApiDoc, cart_router};
pub use models::{
    AddToCart, Cart, CartItem, CartMutationResponse, CartView, MUTATION_HISTORY,
    SetCartQuantity,
};
pub use self::mongodb::MongoCartRepository;
pub use repository::{CartRepository, InMemoryCartRepository};
pub use service::CartService;
