use serde_json::json;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{Envelope, Featured, Home, Product, ProductPage, ProductQuery, ProductResults};

/// Read-only catalog access; works signed in or out
#[derive(Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ProductQuery) -> ClientResult<ProductPage> {
        self.api.get_query("/products", query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<Product> {
        self.api.get(&format!("/products/{}", id)).await
    }

    pub async fn search(&self, term: &str) -> ClientResult<ProductResults> {
        let envelope: Envelope<ProductResults> = self
            .api
            .get_query("/user/search", &json!({ "q": term }))
            .await?;
        Ok(envelope.data)
    }

    pub async fn featured(&self) -> ClientResult<Vec<Product>> {
        let envelope: Envelope<Featured> = self.api.get("/user/featured").await?;
        Ok(envelope.data.featured_products)
    }

    pub async fn by_category(&self, category: &str) -> ClientResult<ProductResults> {
        let envelope: Envelope<ProductResults> = self
            .api
            .get(&format!("/user/category/{}", category))
            .await?;
        Ok(envelope.data)
    }

    pub async fn home(&self) -> ClientResult<Home> {
        let envelope: Envelope<Home> = self.api.get("/user").await?;
        Ok(envelope.data)
    }
}
