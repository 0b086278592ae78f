// Shared helpers for the integration tests

pub mod fixtures;
pub mod graphql;
pub mod harness;

pub use fixtures::*;
pub use graphql::*;
pub use harness::*;

/// Build GraphQL variables from `name => value` pairs.
///
/// Values go through `Display`, so ids and enums can be passed as-is; every
/// argument in the schema that takes an id or enum is a String or UUID scalar.
#[macro_export]
macro_rules! vars {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut variables = juniper::Variables::new();
        $(
            variables.insert(
                String::from($name),
                juniper::InputValue::scalar(($value).to_string()),
            );
        )*
        variables
    }};
}
