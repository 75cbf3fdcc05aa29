//! HTTP transport shared by all client services

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::store::{AUTH_TOKEN_KEY, LocalStoreExt, SharedStore, USER_DATA_KEY};

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin wrapper over `reqwest::Client`.
///
/// Every request carries `Authorization: Bearer <authToken>` when a token is
/// stored. A 401 response clears the stored session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: SharedStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: SharedStore) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("freshja-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            store,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn token(&self) -> ClientResult<Option<String>> {
        self.store.get_json::<String>(AUTH_TOKEN_KEY).await
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.token().await, Ok(Some(_)))
    }

    pub async fn clear_session(&self) -> ClientResult<()> {
        self.store.remove(AUTH_TOKEN_KEY).await?;
        self.store.remove(USER_DATA_KEY).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let (_, body) = self.send(self.request(Method::GET, path)).await?;
        Ok(body)
    }

    pub async fn get_query<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let (_, body) = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Ok(body)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let (_, body) = self.post_with_status(path, body).await?;
        Ok(body)
    }

    /// Like [`post`](Self::post), also returning the status code
    pub async fn post_with_status<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<(StatusCode, T)> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let (_, body) = self
            .send(self.request(Method::PUT, path).json(body))
            .await?;
        Ok(body)
    }

    /// PUT without a body
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let (_, body) = self.send(self.request(Method::PUT, path)).await?;
        Ok(body)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let (_, body) = self.send(self.request(Method::DELETE, path)).await?;
        Ok(body)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ClientResult<(StatusCode, T)> {
        let builder = match self.token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("Token expired or invalid, clearing auth data");
            self.clear_session().await?;
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<T>().await?;
        Ok((status, body))
    }
}
