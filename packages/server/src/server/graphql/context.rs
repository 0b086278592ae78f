use std::sync::Arc;

use juniper::FieldResult;

use crate::common::{Actor, GovernanceError};
use crate::kernel::ServerDeps;
use crate::server::graphql::schema::to_field_error;
use crate::server::middleware::AuthUser;

/// GraphQL request context
///
/// Built per request from the shared dependencies and the verified session.
#[derive(Clone)]
pub struct GraphQLContext {
    pub server_deps: Arc<ServerDeps>,
    pub auth_user: Option<AuthUser>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(server_deps: Arc<ServerDeps>, auth_user: Option<AuthUser>) -> Self {
        Self {
            server_deps,
            auth_user,
        }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.server_deps
    }

    /// The caller, if the request carried a valid token
    pub fn actor(&self) -> Option<Actor> {
        self.auth_user.as_ref().map(AuthUser::actor)
    }

    /// The caller, or `permission_denied` for anonymous requests
    pub fn require_actor(&self) -> FieldResult<Actor> {
        self.actor().ok_or_else(|| {
            to_field_error(GovernanceError::permission_denied("authentication required"))
        })
    }
}
