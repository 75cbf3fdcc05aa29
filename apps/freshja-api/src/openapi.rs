//! OpenAPI documentation configuration

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FreshJA API",
        version = "0.1.0",
        description = "Farm-to-customer grocery marketplace for Jamaican produce",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/api/auth", api = domain_users::AuthApiDoc),
        (path = "/api/likes", api = domain_users::LikesApiDoc),
        (path = "/api/reset", api = domain_users::ResetApiDoc),
        (path = "/api/products", api = domain_products::ApiDoc),
        (path = "/api/user", api = domain_catalog::StorefrontApiDoc),
        (path = "/api/categories", api = domain_catalog::CategoriesApiDoc),
        (path = "/api/banners", api = domain_catalog::BannersApiDoc),
        (path = "/api/cart", api = domain_cart::ApiDoc),
        (path = "/api/orders", api = domain_orders::ApiDoc)
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
