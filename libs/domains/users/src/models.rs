use chrono::{DateTime, Utc};
use domain_products::Product;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const MIN_PASSWORD_LEN: u64 = 6;

/// User roles
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Customer,
    Farmer,
    Admin,
    Delivery,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Farmer => "farmer",
            Role::Admin => "admin",
            Role::Delivery => "delivery",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Membership {
    #[default]
    Basic,
    Premium,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    Pending,
    #[default]
    Active,
    Suspended,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub parish: Option<String>,
}

/// Farmer verification documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Documents {
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub trn: String,
    #[serde(default)]
    pub permit: String,
}

impl Documents {
    pub fn is_complete(&self) -> bool {
        [&self.license, &self.trn, &self.permit]
            .iter()
            .all(|d| !d.trim().is_empty())
    }
}

/// User document in the `users` collection. Never returned over HTTP; see [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub full_name: String,
    /// Lower-cased and trimmed, unique
    pub email: String,
    pub phone: String,
    /// Argon2 PHC string
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub membership: Membership,
    #[serde(default)]
    pub documents: Documents,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub liked_products: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New account; farmers start pending approval, everyone else active
    pub fn new(input: RegisterRequest, password_hash: String) -> Self {
        let now = Utc::now();
        let role = input.role.unwrap_or_default();
        Self {
            id: Uuid::now_v7(),
            full_name: input.full_name.trim().to_string(),
            email: normalize_email(&input.email),
            phone: input.phone,
            password_hash,
            address: input.address.unwrap_or_default(),
            profile_image: String::new(),
            role,
            membership: Membership::Basic,
            documents: input.documents.unwrap_or_default(),
            status: if role == Role::Farmer {
                UserStatus::Pending
            } else {
                UserStatus::Active
            },
            is_verified: false,
            liked_products: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub membership: Membership,
    pub status: UserStatus,
    pub address: Address,
    pub profile_image: String,
    pub is_verified: bool,
    pub liked_products: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            membership: user.membership,
            status: user.status,
            address: user.address,
            profile_image: user.profile_image,
            is_verified: user.is_verified,
            liked_products: user.liked_products,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 30, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub documents: Option<Documents>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token plus profile, returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub product_id: Uuid,
}

/// Set membership explicitly; replaying the same request is a no-op
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetLikeRequest {
    pub product_id: Uuid,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub liked_products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStateResponse {
    pub product_id: Uuid,
    pub liked: bool,
    pub liked_products: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    pub product_ids: Vec<Uuid>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
