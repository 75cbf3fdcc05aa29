//! Readiness and root banner

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use mongodb::Client;
use serde_json::Value;

pub const ROOT_MESSAGE: &str = "FreshJA API is running!";

/// `/ready` pings MongoDB; `/` answers with a plain banner
pub fn router(mongo_client: Client) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ready", get(readiness_check))
        .with_state(mongo_client)
}

async fn root() -> &'static str {
    ROOT_MESSAGE
}

async fn readiness_check(
    State(client): State<Client>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async move {
            if database::mongodb::check_health(&client).await {
                Ok(())
            } else {
                Err("ping failed".to_string())
            }
        }),
    )];
    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_banner() {
        // Client construction is lazy, nothing listens here
        let client = Client::with_uri_str("mongodb://127.0.0.1:1").await.unwrap();

        let response = router(client)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], ROOT_MESSAGE.as_bytes());
    }
}
