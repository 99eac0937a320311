//! Domains module containing the gateway's business logic.
//!
//! - **cache**: cache-aside store for backend GET responses (Redis or memory)
//! - **backend**: identity resolution and the retrying request executor
//! - **tools**: tool catalog, validation and invocation

pub mod backend;
pub mod cache;
pub mod tools;
