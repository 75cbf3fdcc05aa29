use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_products::ProductError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("No user with email '{0}'")]
    EmailNotFound(String),

    #[error("User with email '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("All documents are required for farmer registration")]
    MissingDocuments,

    #[error("Role '{0}' cannot be self-registered")]
    RoleNotAllowed(String),

    #[error("Account suspended")]
    Suspended,

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Invalid code")]
    InvalidCode,

    #[error("Code has expired")]
    CodeExpired,

    #[error("Invalid or unverified code")]
    CodeNotVerified,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Product(#[from] ProductError),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::EmailNotFound(_) => {
                AppError::NotFound("User not found".to_string())
            }
            UserError::AlreadyExists(_) => AppError::BadRequest("User already exists".to_string()),
            UserError::InvalidCredentials => {
                AppError::BadRequest("Invalid credentials".to_string())
            }
            UserError::MissingDocuments => AppError::BadRequest(
                "All documents are required for farmer registration".to_string(),
            ),
            UserError::RoleNotAllowed(role) => {
                AppError::BadRequest(format!("Role '{}' cannot be self-registered", role))
            }
            UserError::Suspended => AppError::Forbidden("Account suspended".to_string()),
            UserError::ProductNotFound(_) => AppError::NotFound("Product not found".to_string()),
            UserError::InvalidCode => AppError::BadRequest("Invalid code".to_string()),
            UserError::CodeExpired => AppError::BadRequest("Code has expired".to_string()),
            UserError::CodeNotVerified => {
                AppError::BadRequest("Invalid or unverified code".to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::PasswordHash(msg)
            | UserError::Token(msg)
            | UserError::Email(msg)
            | UserError::Database(msg) => AppError::InternalServerError(msg),
            UserError::Product(err) => err.into(),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<email::NotificationError> for UserError {
    fn from(err: email::NotificationError) -> Self {
        UserError::Email(err.to_string())
    }
}
