//! Customer-facing product views: home page, search, category and featured

use domain_products::{Pagination, ProductFilter, ProductRepository, SearchScope};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    FEATURED_LIMIT, FeaturedData, HOME_FEATURED_LIMIT, HomeData, HomePagination, HomeQuery,
    PageInfo, ProductResults, SearchQuery,
};
use crate::repository::CatalogRepository;

pub struct StorefrontService<C: CatalogRepository, P: ProductRepository> {
    catalog: Arc<C>,
    products: Arc<P>,
}

impl<C: CatalogRepository, P: ProductRepository> Clone for StorefrontService<C, P> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            products: Arc::clone(&self.products),
        }
    }
}

impl<C: CatalogRepository, P: ProductRepository> StorefrontService<C, P> {
    pub fn new(catalog: Arc<C>, products: Arc<P>) -> Self {
        Self { catalog, products }
    }

    #[instrument(skip(self))]
    pub async fn home(&self, query: HomeQuery) -> CatalogResult<HomeData> {
        let pagination = query.pagination();
        let filter = ProductFilter::active()
            .with_category(query.category.as_deref())
            .with_search(query.search.as_deref(), SearchScope::Storefront);

        let total = self.products.count(filter.clone()).await?;
        let products = self.products.list(filter.paged(pagination)).await?;
        let featured_products = self.featured_products(HOME_FEATURED_LIMIT).await?;

        Ok(HomeData {
            products,
            categories: self.catalog.list_categories().await?,
            banners: self.catalog.list_banners().await?,
            featured_products,
            pagination: HomePagination {
                current_page: pagination.page,
                total_pages: pagination.total_pages(total),
                total_products: total,
            },
        })
    }

    /// Blank or missing `q` is rejected
    #[instrument(skip(self))]
    pub async fn search(&self, query: SearchQuery) -> CatalogResult<ProductResults> {
        let term = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(CatalogError::SearchQueryRequired)?;

        let filter = ProductFilter::active()
            .with_search(Some(term), SearchScope::Storefront)
            .with_category(query.category.as_deref());

        self.results(filter, query.pagination()).await
    }

    #[instrument(skip(self))]
    pub async fn by_category(
        &self,
        category: &str,
        pagination: Pagination,
    ) -> CatalogResult<ProductResults> {
        let filter = ProductFilter {
            category: Some(category.to_string()),
            ..ProductFilter::active()
        };
        self.results(filter, pagination).await
    }

    #[instrument(skip(self))]
    pub async fn featured(&self) -> CatalogResult<FeaturedData> {
        Ok(FeaturedData {
            featured_products: self.featured_products(FEATURED_LIMIT).await?,
        })
    }

    async fn featured_products(
        &self,
        limit: i64,
    ) -> CatalogResult<Vec<domain_products::Product>> {
        let filter = ProductFilter {
            featured: Some(true),
            limit,
            ..ProductFilter::active()
        };
        Ok(self.products.list(filter).await?)
    }

    async fn results(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<ProductResults> {
        let total = self.products.count(filter.clone()).await?;
        let products = self.products.list(filter.paged(pagination)).await?;
        Ok(ProductResults {
            products,
            pagination: PageInfo::new(total, pagination),
        })
    }
}
