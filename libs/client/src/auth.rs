use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthSession, ForgotPassword, Message, Registration, User};
use crate::store::{AUTH_TOKEN_KEY, LocalStoreExt, USER_DATA_KEY};

#[derive(serde::Deserialize)]
struct MeBody {
    user: User,
}

/// Session management against `/auth` and `/reset`
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn store_session(&self, session: &AuthSession) -> ClientResult<()> {
        let store = self.api.store();
        store.set_json(AUTH_TOKEN_KEY, &session.token).await?;
        store.set_json(USER_DATA_KEY, &session.user).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let session: AuthSession = self
            .api
            .post(
                "/auth/login",
                &json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        self.store_session(&session).await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> ClientResult<AuthSession> {
        let session: AuthSession = self.api.post("/auth/register", registration).await?;
        self.store_session(&session).await?;
        tracing::info!(user_id = %session.user.id, "Registered");
        Ok(session)
    }

    /// Refresh the stored user from the server
    pub async fn me(&self) -> ClientResult<User> {
        let body: MeBody = self.api.get("/auth/me").await?;
        self.api.store().set_json(USER_DATA_KEY, &body.user).await?;
        Ok(body.user)
    }

    /// User saved by the last login, without a network call
    pub async fn current_user(&self) -> ClientResult<Option<User>> {
        self.api.store().get_json(USER_DATA_KEY).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.is_authenticated().await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.api.clear_session().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<ForgotPassword> {
        self.api
            .post("/reset/forgot", &json!({ "email": email.trim() }))
            .await
    }

    pub async fn verify_code(&self, user_id: Uuid, code: &str) -> ClientResult<Message> {
        self.api
            .post(
                "/reset/verify-code",
                &json!({ "userId": user_id, "code": code }),
            )
            .await
    }

    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        user_id: Uuid,
        code: &str,
        new_password: &str,
    ) -> ClientResult<Message> {
        if new_password.len() < 6 {
            return Err(ClientError::Api {
                status: 400,
                message: "Password must be at least 6 characters".to_string(),
            });
        }
        self.api
            .post(
                "/reset/reset",
                &json!({ "userId": user_id, "code": code, "newPassword": new_password }),
            )
            .await
    }
}
