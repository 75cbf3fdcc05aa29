//! Shared test utilities for the FreshJA domain crates
//!
//! - `TestDataBuilder`: deterministic ids, names and emails per test
//! - `auth`: a fixed JWT issuer and bearer tokens for any role
//! - `http`: request builders and body readers for `oneshot` handler tests
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//!
//! # Handler tests
//!
//! ```rust,ignore
//! use test_utils::{auth, http};
//! use tower::ServiceExt;
//!
//! let token = auth::bearer_for("farmer");
//! let response = app
//!     .oneshot(http::json_request("POST", "/", Some(&token), &body))
//!     .await
//!     .unwrap();
//! let created: serde_json::Value = http::json_body(response.into_body()).await;
//! ```
//!
//! # MongoDB tests
//!
//! Add `features = ["mongo"]` to the dev-dependency. These tests need Docker
//! and are marked `#[ignore]`.
//!
//! ```rust,ignore
//! let mongo = test_utils::TestMongo::new().await;
//! let repo = MongoProductRepository::new(&mongo.database());
//! ```

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name so every test gets its own stable data
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// `test-{prefix}-{seed}-{suffix}`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// `{local}-{seed}@freshja.test`
    pub fn email(&self, local: &str) -> String {
        format!("{}-{}@freshja.test", local, self.seed)
    }
}

/// JWT helpers for authenticated handler tests
pub mod auth {
    use axum_helpers::{JwtAuth, JwtConfig, TokenSubject};
    use uuid::Uuid;

    pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-characters";

    pub fn jwt_auth() -> JwtAuth {
        let config = JwtConfig::new(TEST_JWT_SECRET).expect("test secret is long enough");
        JwtAuth::new(&config)
    }

    /// Signed token for an arbitrary user
    pub fn token(user_id: Uuid, name: &str, role: &str) -> String {
        let user_id = user_id.to_string();
        let email = format!("{}@freshja.test", role);
        jwt_auth()
            .create_token(TokenSubject {
                user_id: &user_id,
                email: &email,
                name,
                role,
            })
            .expect("token encodes")
    }

    /// Token for a fresh user id with the given role
    pub fn bearer_for(role: &str) -> String {
        token(Uuid::now_v7(), "Test User", role)
    }
}

/// Request/response helpers for `tower::ServiceExt::oneshot`
pub mod http {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde::Serialize;
    use serde::de::DeserializeOwned;

    /// JSON request, optionally with `Authorization: Bearer`
    pub fn json_request<T: Serialize>(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &T,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder
            .body(Body::from(serde_json::to_vec(body).expect("body serializes")))
            .expect("request builds")
    }

    /// Body-less request, optionally with `Authorization: Bearer`
    pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).expect("request builds")
    }

    pub async fn json_body<T: DeserializeOwned>(body: Body) -> T {
        let bytes = body.collect().await.expect("body reads").to_bytes();
        serde_json::from_slice(&bytes).expect("body is JSON")
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.email("farmer"), builder2.email("farmer"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");
        assert_ne!(builder1.user_id(), builder2.user_id());
    }

    #[test]
    fn test_token_roundtrips_through_issuer() {
        let id = Uuid::now_v7();
        let token = auth::token(id, "John Brown", "farmer");
        let claims = auth::jwt_auth().verify_token(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, "farmer");
    }
}
