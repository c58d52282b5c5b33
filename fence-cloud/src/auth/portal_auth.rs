//! Portal JWT authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

/// JWT claims for portal sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct PortalClaims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// Admin flag
    #[serde(default)]
    pub admin: bool,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a portal user
pub fn create_token(
    user_id: &str,
    email: &str,
    is_admin: bool,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = PortalClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        admin: is_admin,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn decode_identity(token: &str, secret: &str) -> Option<UserIdentity> {
    let token_data = jsonwebtoken::decode::<PortalClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| tracing::debug!("JWT validation failed: {e}"))
    .ok()?;

    Some(UserIdentity {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        is_admin: token_data.claims.admin,
    })
}

/// Middleware that extracts and verifies the portal JWT from the
/// Authorization header and inserts a [`UserIdentity`] extension.
pub async fn portal_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated).into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated).into_response())?;

    let identity = decode_identity(token, &state.jwt_secret)
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid).into_response())?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Middleware gating the admin API; runs after [`portal_auth_middleware`]
pub async fn admin_gate_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let is_admin = request
        .extensions()
        .get::<UserIdentity>()
        .map(|id| id.is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(AppError::new(ErrorCode::PermissionDenied).into_response());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_token("usr_1", "kunde@example.de", false, SECRET).unwrap();
        let id = decode_identity(&token, SECRET).unwrap();
        assert_eq!(id.user_id, "usr_1");
        assert_eq!(id.email, "kunde@example.de");
        assert!(!id.is_admin);
    }

    #[test]
    fn test_admin_flag_survives() {
        let token = create_token("usr_2", "admin@germanfence.de", true, SECRET).unwrap();
        assert!(decode_identity(&token, SECRET).unwrap().is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("usr_1", "kunde@example.de", false, SECRET).unwrap();
        assert!(decode_identity(&token, "other-secret").is_none());
        assert!(decode_identity("not.a.jwt", SECRET).is_none());
    }
}
