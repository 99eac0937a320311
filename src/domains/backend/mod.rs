//! ERP backend access.
//!
//! The [`RequestExecutor`] turns one logical call into at most
//! `max_attempts` HTTP requests against the ERP and reports the outcome as an
//! [`ExecutionResult`]. GET responses go through the cache.

pub mod executor;
pub mod identity;
pub mod method;
pub mod result;
pub mod retry;

pub use executor::RequestExecutor;
pub use identity::{
    BASE_URL_HEADER, BackendIdentity, ERP_TOKEN_HEADER, IdentityHeaders, USER_ID_HEADER,
};
pub use method::HttpMethod;
pub use result::{ExecutionResult, Failure, FailureKind};
pub use retry::RetryPolicy;
