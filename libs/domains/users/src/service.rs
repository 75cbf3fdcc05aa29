use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{JwtAuth, TokenSubject};
use email::Mailer;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, Role, User, UserProfile, UserStatus,
    normalize_email,
};
use crate::repository::UserRepository;

/// Registration, login and profile lookup
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    auth: JwtAuth,
    mailer: Mailer,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            auth: self.auth.clone(),
            mailer: self.mailer.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, auth: JwtAuth, mailer: Mailer) -> Self {
        Self::from_shared(Arc::new(repository), auth, mailer)
    }

    pub fn from_shared(repository: Arc<R>, auth: JwtAuth, mailer: Mailer) -> Self {
        Self {
            repository,
            auth,
            mailer,
        }
    }

    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    pub fn auth(&self) -> &JwtAuth {
        &self.auth
    }

    /// Create an account and sign the caller in.
    ///
    /// Admin accounts cannot be self-registered, farmers must supply all
    /// three documents. The welcome email is best effort.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        let role = input.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(UserError::RoleNotAllowed(role.to_string()));
        }
        if role == Role::Farmer
            && !input
                .documents
                .as_ref()
                .is_some_and(|docs| docs.is_complete())
        {
            return Err(UserError::MissingDocuments);
        }

        let email = normalize_email(&input.email);
        if self.repository.email_exists(&email).await? {
            return Err(UserError::AlreadyExists(email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(input, password_hash))
            .await?;

        if let Err(e) = self.mailer.send_welcome(&user.email, &user.full_name).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send welcome email");
        }

        self.auth_response(user)
    }

    /// Exchange credentials for a token
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);
        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Rejected login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        if user.status == UserStatus::Suspended {
            return Err(UserError::Suspended);
        }

        self.auth_response(user)
    }

    #[instrument(skip(self))]
    pub async fn me(&self, id: Uuid) -> UserResult<UserProfile> {
        self.repository
            .get_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or(UserError::NotFound(id))
    }

    fn auth_response(&self, user: User) -> UserResult<AuthResponse> {
        let user_id = user.id.to_string();
        let token = self
            .auth
            .create_token(TokenSubject {
                user_id: &user_id,
                email: &user.email,
                name: &user.full_name,
                role: user.role.as_str(),
            })
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Documents;
    use crate::repository::MockUserRepository;
    use email::MockSmtpProvider;
    use mockall::predicate::*;

    fn mailer() -> (Arc<MockSmtpProvider>, Mailer) {
        let provider = Arc::new(MockSmtpProvider::new());
        let mailer = Mailer::new(provider.clone()).unwrap();
        (provider, mailer)
    }

    fn register(role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            full_name: "Marcus Brown".to_string(),
            email: "Farmer@FreshJA.com".to_string(),
            phone: "876-555-0001".to_string(),
            password: "password123".to_string(),
            role,
            address: None,
            documents: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_email_exists()
            .with(eq("farmer@freshja.com"))
            .times(1)
            .returning(|_| Ok(true));
        mock_repo.expect_create().times(0);

        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service.register(register(None)).await;
        assert!(matches!(result, Err(UserError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_farmer_requires_documents() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_email_exists().times(0);

        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service.register(register(Some(Role::Farmer))).await;
        assert!(matches!(result, Err(UserError::MissingDocuments)));
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let mock_repo = MockUserRepository::new();
        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service.register(register(Some(Role::Admin))).await;
        assert!(matches!(result, Err(UserError::RoleNotAllowed(_))));
    }

    #[tokio::test]
    async fn test_register_farmer_sends_welcome_and_signs_token() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_email_exists().returning(|_| Ok(false));
        mock_repo.expect_create().times(1).returning(Ok);

        let (provider, mailer) = mailer();
        let auth = test_utils::auth::jwt_auth();
        let service = UserService::new(mock_repo, auth.clone(), mailer);

        let mut input = register(Some(Role::Farmer));
        input.documents = Some(Documents {
            license: "L-1".to_string(),
            trn: "123-456-789".to_string(),
            permit: "P-9".to_string(),
        });

        let response = service.register(input).await.unwrap();
        assert_eq!(response.user.email, "farmer@freshja.com");
        assert_eq!(response.user.status, UserStatus::Pending);

        let claims = auth.verify_token(&response.token).unwrap();
        assert_eq!(claims.role, "farmer");
        assert_eq!(claims.sub, response.user.id.to_string());
        assert!(provider.was_sent_to("farmer@freshja.com").await);
    }

    #[tokio::test]
    async fn test_register_succeeds_when_welcome_email_fails() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_email_exists().returning(|_| Ok(false));
        mock_repo.expect_create().returning(Ok);

        let mailer = Mailer::new(Arc::new(MockSmtpProvider::failing("smtp down"))).unwrap();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        assert!(service.register(register(None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let hash = hash_password("password123").unwrap();
        let user = User::new(register(None), hash);

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_email()
            .with(eq("farmer@freshja.com"))
            .returning(move |_| Ok(Some(user.clone())));

        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service
            .login(LoginRequest {
                email: "farmer@freshja.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_suspended_user() {
        let hash = hash_password("password123").unwrap();
        let mut user = User::new(register(None), hash);
        user.status = UserStatus::Suspended;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service
            .login(LoginRequest {
                email: "farmer@freshja.com".to_string(),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(result, Err(UserError::Suspended)));
    }

    #[tokio::test]
    async fn test_me_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let (_, mailer) = mailer();
        let service = UserService::new(mock_repo, test_utils::auth::jwt_auth(), mailer);

        let result = service.me(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
