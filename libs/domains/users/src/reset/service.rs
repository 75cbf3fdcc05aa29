use chrono::Utc;
use email::Mailer;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::store::{CODE_TTL_MINUTES, ResetCodeStore, ResetEntry};
use crate::error::{UserError, UserResult};
use crate::models::{
    ForgotPasswordResponse, MessageResponse, ResetPasswordRequest, VerifyCodeRequest,
    normalize_email,
};
use crate::repository::UserRepository;
use crate::service::hash_password;

/// Six decimal digits, zero padded
pub fn generate_code() -> String {
    format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)
}

/// Forgot / verify / reset flow backed by a [`ResetCodeStore`]
pub struct ResetService<R: UserRepository, S: ResetCodeStore> {
    users: Arc<R>,
    store: Arc<S>,
    mailer: Mailer,
}

impl<R: UserRepository, S: ResetCodeStore> Clone for ResetService<R, S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            store: Arc::clone(&self.store),
            mailer: self.mailer.clone(),
        }
    }
}

impl<R: UserRepository, S: ResetCodeStore> ResetService<R, S> {
    pub fn new(users: Arc<R>, store: Arc<S>, mailer: Mailer) -> Self {
        Self {
            users,
            store,
            mailer,
        }
    }

    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Issue a code and email it. A new request replaces any earlier code.
    #[instrument(skip(self))]
    pub async fn forgot(&self, email: &str) -> UserResult<ForgotPasswordResponse> {
        let email = normalize_email(email);
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.clone()))?;

        let code = generate_code();
        self.store
            .issue(user.id, ResetEntry::new(code.clone(), Utc::now()))
            .await;

        if let Err(e) = self
            .mailer
            .send_reset_code(&user.email, &code, CODE_TTL_MINUTES)
            .await
        {
            self.store.remove(user.id).await;
            return Err(e.into());
        }

        tracing::info!(user_id = %user.id, "Password reset code issued");
        Ok(ForgotPasswordResponse {
            message: "Verification code sent to your email".to_string(),
            user_id: user.id,
        })
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn verify_code(&self, input: VerifyCodeRequest) -> UserResult<MessageResponse> {
        self.ensure_user(input.user_id).await?;

        let entry = self
            .store
            .get(input.user_id)
            .await
            .filter(|entry| entry.matches(&input.code))
            .ok_or(UserError::InvalidCode)?;

        if entry.is_expired(Utc::now()) {
            self.store.remove(input.user_id).await;
            return Err(UserError::CodeExpired);
        }

        self.store.mark_verified(input.user_id).await;
        Ok(MessageResponse::new("Code verified successfully"))
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn reset_password(&self, input: ResetPasswordRequest) -> UserResult<MessageResponse> {
        self.ensure_user(input.user_id).await?;

        let entry = self
            .store
            .get(input.user_id)
            .await
            .filter(|entry| entry.verified && entry.matches(&input.code))
            .ok_or(UserError::CodeNotVerified)?;

        if entry.is_expired(Utc::now()) {
            self.store.remove(input.user_id).await;
            return Err(UserError::CodeExpired);
        }

        let password_hash = hash_password(&input.new_password)?;
        if !self
            .users
            .update_password(input.user_id, password_hash)
            .await?
        {
            return Err(UserError::NotFound(input.user_id));
        }
        self.store.remove(input.user_id).await;

        tracing::info!(user_id = %input.user_id, "Password reset");
        Ok(MessageResponse::new("Password reset successfully"))
    }

    async fn ensure_user(&self, user_id: Uuid) -> UserResult<()> {
        match self.users.get_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(UserError::NotFound(user_id)),
        }
    }
}
