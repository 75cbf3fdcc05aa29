//! HTTP handlers for categories, banners and the storefront

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, CurrentUser, JwtAuth, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use domain_products::{PageQuery, ProductRepository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    Banner, BannerEnvelope, BannerList, Category, CategoryEnvelope, CategoryList, CreateBanner,
    CreateCategory, DisplayStatus, Envelope, FeaturedData, HomeData, HomePagination, HomeQuery,
    PageInfo, ProductResults, SearchQuery,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;
use crate::storefront::StorefrontService;

pub const ADMIN_ROLE: &str = "admin";

#[derive(OpenApi)]
#[openapi(
    paths(list_categories, create_category),
    components(
        schemas(Category, CreateCategory, CategoryList, CategoryEnvelope, DisplayStatus),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Categories", description = "Storefront categories"))
)]
pub struct CategoriesApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(list_banners, create_banner),
    components(
        schemas(Banner, CreateBanner, BannerList, BannerEnvelope, DisplayStatus),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Banners", description = "Home page banners"))
)]
pub struct BannersApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(home, search, by_category, featured),
    components(
        schemas(HomeData, HomePagination, ProductResults, PageInfo, FeaturedData),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = "Storefront", description = "Customer home, search and browse"))
)]
pub struct StorefrontApiDoc;

/// `/categories`: public list, admin-only create
pub fn categories_router<C: CatalogRepository + 'static>(
    service: CatalogService<C>,
    auth: JwtAuth,
) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// `/banners`: public list, admin-only create
pub fn banners_router<C: CatalogRepository + 'static>(
    service: CatalogService<C>,
    auth: JwtAuth,
) -> Router {
    Router::new()
        .route("/", get(list_banners).post(create_banner))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// `/user` storefront, public
pub fn storefront_router<C, P>(service: StorefrontService<C, P>) -> Router
where
    C: CatalogRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
        .route("/category/{categoryId}", get(by_category))
        .route("/featured", get(featured))
        .with_state(Arc::new(service))
}

/// Active categories by display order
#[utoipa::path(
    get,
    path = "",
    tag = "Categories",
    responses(
        (status = 200, description = "Active categories", body = Envelope<CategoryList>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<C: CatalogRepository>(
    State(service): State<Arc<CatalogService<C>>>,
) -> CatalogResult<Json<Envelope<CategoryList>>> {
    let categories = service.list_categories().await?;
    Ok(Json(Envelope::ok(CategoryList { categories })))
}

/// Create a category (admin only)
#[utoipa::path(
    post,
    path = "",
    tag = "Categories",
    request_body = CreateCategory,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = Envelope<CategoryEnvelope>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<C: CatalogRepository>(
    State(service): State<Arc<CatalogService<C>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> Result<impl IntoResponse, AppError> {
    user.require_any_role(&[ADMIN_ROLE], "Only admins can manage categories")?;
    let category = service.create_category(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(CategoryEnvelope { category })),
    ))
}

/// Active banners by display order
#[utoipa::path(
    get,
    path = "",
    tag = "Banners",
    responses(
        (status = 200, description = "Active banners", body = Envelope<BannerList>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_banners<C: CatalogRepository>(
    State(service): State<Arc<CatalogService<C>>>,
) -> CatalogResult<Json<Envelope<BannerList>>> {
    let banners = service.list_banners().await?;
    Ok(Json(Envelope::ok(BannerList { banners })))
}

/// Create a banner (admin only)
#[utoipa::path(
    post,
    path = "",
    tag = "Banners",
    request_body = CreateBanner,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Banner created", body = Envelope<BannerEnvelope>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_banner<C: CatalogRepository>(
    State(service): State<Arc<CatalogService<C>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateBanner>,
) -> Result<impl IntoResponse, AppError> {
    user.require_any_role(&[ADMIN_ROLE], "Only admins can manage banners")?;
    let banner = service.create_banner(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(BannerEnvelope { banner })),
    ))
}

/// Home page: products, categories, banners and featured products
#[utoipa::path(
    get,
    path = "",
    tag = "Storefront",
    params(HomeQuery),
    responses(
        (status = 200, description = "Home page data", body = Envelope<HomeData>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn home<C: CatalogRepository, P: ProductRepository>(
    State(service): State<Arc<StorefrontService<C, P>>>,
    Query(query): Query<HomeQuery>,
) -> CatalogResult<Json<Envelope<HomeData>>> {
    Ok(Json(Envelope::ok(service.home(query).await?)))
}

/// Search active products
#[utoipa::path(
    get,
    path = "/search",
    tag = "Storefront",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = Envelope<ProductResults>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search<C: CatalogRepository, P: ProductRepository>(
    State(service): State<Arc<StorefrontService<C, P>>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Json<Envelope<ProductResults>>> {
    Ok(Json(Envelope::ok(service.search(query).await?)))
}

/// Active products in one category
#[utoipa::path(
    get,
    path = "/category/{categoryId}",
    tag = "Storefront",
    params(("categoryId" = String, Path, description = "Category name"), PageQuery),
    responses(
        (status = 200, description = "Products in the category", body = Envelope<ProductResults>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn by_category<C: CatalogRepository, P: ProductRepository>(
    State(service): State<Arc<StorefrontService<C, P>>>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> CatalogResult<Json<Envelope<ProductResults>>> {
    let results = service.by_category(&category, query.pagination()).await?;
    Ok(Json(Envelope::ok(results)))
}

/// Featured active products
#[utoipa::path(
    get,
    path = "/featured",
    tag = "Storefront",
    responses(
        (status = 200, description = "Featured products", body = Envelope<FeaturedData>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured<C: CatalogRepository, P: ProductRepository>(
    State(service): State<Arc<StorefrontService<C, P>>>,
) -> CatalogResult<Json<Envelope<FeaturedData>>> {
    Ok(Json(Envelope::ok(service.featured().await?)))
}
