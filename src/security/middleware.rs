//! Bearer-token middleware for the JSON API.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Claims carried in an API bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    /// User ID (subject).
    pub sub: String,
    pub name: Option<String>,
    /// Expiration time (UNIX timestamp).
    pub exp: usize,
}

/// Verified identity injected into request extensions.
#[derive(Clone, Debug)]
pub struct UserContext {
    pub user_id: String,
    pub claims: UserClaims,
}

/// Verify the bearer token and inject a [`UserContext`].
///
/// When `security.jwt_required` is off, requests without a token pass
/// through unauthenticated; a presented token is still verified.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(bearer)) = bearer else {
        if !state.config.security.jwt_required {
            return Ok(next.run(request).await);
        }
        return Err(StatusCode::UNAUTHORIZED);
    };

    // Note: In production, cache the DecodingKey
    let key = DecodingKey::from_secret(state.config.security.jwt_secret.as_bytes());
    let validation = Validation::default();

    match decode::<UserClaims>(bearer.token(), &key, &validation) {
        Ok(token_data) => {
            let claims = token_data.claims;
            let context = UserContext {
                user_id: claims.sub.clone(),
                claims,
            };
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}
