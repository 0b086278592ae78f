// Business domains
pub mod audit;
pub mod auth;
pub mod contact;
pub mod contributions;
pub mod journeys;
pub mod stewards;
