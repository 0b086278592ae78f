use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use juniper::http::GraphQLRequest;
use tracing::debug;

use crate::server::graphql::{GraphQLContext, Schema};

/// GraphQL POST endpoint
///
/// Field errors still produce a 200 with an `errors` array; only requests
/// that fail as a whole (parse, validation) return 400.
pub async fn graphql_handler(
    State(schema): State<Arc<Schema>>,
    Extension(context): Extension<GraphQLContext>,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    debug!(
        operation = request.operation_name().unwrap_or("anonymous"),
        authenticated = context.auth_user.is_some(),
        "GraphQL request"
    );

    let response = request.execute(&schema, &context).await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, Json(response)).into_response()
}
