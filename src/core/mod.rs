// Core layer: domain types, errors, ports, and use-case services.
// No infrastructure: storage, SQL, crypto, and HTTP live in adapters.

pub mod audit;
pub mod error;
pub mod oauth;
pub mod rbac;
pub mod session;
pub mod tenant;
pub mod token;
pub mod usecases;
