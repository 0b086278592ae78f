use crate::common::{Actor, MemberId};
use crate::domains::auth::{JwtService, SessionIdentity};
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Authenticated member information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub member_id: MemberId,
    pub display_name: String,
    /// What the identity provider says about the role. Advisory only.
    pub claims_steward: bool,
}

impl From<SessionIdentity> for AuthUser {
    fn from(identity: SessionIdentity) -> Self {
        Self {
            member_id: identity.member_id,
            display_name: identity.display_name,
            claims_steward: identity.claims_steward,
        }
    }
}

impl AuthUser {
    /// The identity passed to every governance operation
    pub fn actor(&self) -> Actor {
        Actor::new(self.member_id, self.claims_steward)
    }
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(
            member_id = %user.member_id,
            claims_steward = user.claims_steward,
            "Authenticated member"
        );
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    match jwt_service.verify(token) {
        Ok(identity) => Some(identity.into()),
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            None
        }
    }
}
