pub mod steward_grant;

pub use steward_grant::*;
