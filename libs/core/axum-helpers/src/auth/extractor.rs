use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Authenticated caller, read from claims left by [`jwt_auth_middleware`](super::jwt_auth_middleware).
///
/// Handlers behind the middleware take this instead of digging into extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub claims: JwtClaims,
}

impl CurrentUser {
    pub fn role(&self) -> &str {
        &self.claims.role
    }

    /// Fail with 403 unless the caller has one of `roles`
    pub fn require_any_role(&self, roles: &[&str], message: &str) -> Result<(), AppError> {
        if self.claims.has_any_role(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

impl TryFrom<JwtClaims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Token is not valid".to_string()))?;
        Ok(Self { id, claims })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".to_string()))?;
        CurrentUser::try_from(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> JwtClaims {
        JwtClaims {
            sub: sub.to_string(),
            email: "admin@freshja.com".to_string(),
            name: "Admin".to_string(),
            role: role.to_string(),
            exp: 0,
            iat: 0,
            jti: "j".to_string(),
        }
    }

    #[test]
    fn test_non_uuid_subject_is_unauthorized() {
        let err = CurrentUser::try_from(claims("not-a-uuid", "admin")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_require_any_role() {
        let user =
            CurrentUser::try_from(claims(&Uuid::now_v7().to_string(), "delivery")).unwrap();
        assert!(user.require_any_role(&["admin", "delivery"], "nope").is_ok());
        assert!(matches!(
            user.require_any_role(&["admin"], "Admins only"),
            Err(AppError::Forbidden(msg)) if msg == "Admins only"
        ));
    }
}
