//! GraphQL test client that executes queries against the schema directly.

use std::sync::Arc;

use juniper::Variables;
use serde_json::Value;
use server_core::kernel::ServerDeps;
use server_core::server::graphql::{create_schema, GraphQLContext, Schema};
use server_core::server::middleware::AuthUser;

/// One GraphQL error with its `extensions.code`
#[derive(Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    pub code: Option<String>,
}

/// Result of a GraphQL execution.
#[derive(Debug)]
pub struct GraphQLResult {
    pub data: Option<Value>,
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Code of the first error, if any
    pub fn error_code(&self) -> Option<&str> {
        self.errors.first().and_then(|e| e.code.as_deref())
    }

    /// Unwrap the data, panicking if there were errors.
    pub fn unwrap(self) -> Value {
        if !self.errors.is_empty() {
            panic!("GraphQL errors: {:?}", self.errors);
        }
        self.data.expect("No data in GraphQL response")
    }
}

pub struct GraphQLClient {
    schema: Schema,
    context: GraphQLContext,
}

impl GraphQLClient {
    pub fn new(server_deps: Arc<ServerDeps>, auth_user: Option<AuthUser>) -> Self {
        Self {
            schema: create_schema(),
            context: GraphQLContext::new(server_deps, auth_user),
        }
    }

    pub async fn execute(&self, query: &str) -> GraphQLResult {
        self.execute_with_vars(query, Variables::new()).await
    }

    pub async fn execute_with_vars(&self, query: &str, variables: Variables) -> GraphQLResult {
        let (result, errors) =
            juniper::execute(query, None, &self.schema, &variables, &self.context)
                .await
                .expect("GraphQL execution failed");

        let data = Some(serde_json::to_value(&result).expect("Failed to serialize GraphQL result"));

        let errors = errors
            .iter()
            .map(|e| {
                let error = e.error();
                let code = error
                    .extensions()
                    .as_object_value()
                    .and_then(|o| o.get_field_value("code"))
                    .and_then(|v| v.as_string_value())
                    .map(str::to_string);
                GraphQLError {
                    message: error.message().to_string(),
                    code,
                }
            })
            .collect();

        GraphQLResult { data, errors }
    }

    pub async fn query(&self, query: &str) -> Value {
        self.execute(query).await.unwrap()
    }

    pub async fn query_with_vars(&self, query: &str, variables: Variables) -> Value {
        self.execute_with_vars(query, variables).await.unwrap()
    }
}
