//! Token claim sets for the issuer.
//!
//! This module defines the claim vocabulary for the two token shapes the
//! issuer mints (user access tokens and M2M tokens), plus the revocation
//! deny-list record. It intentionally avoids cryptography, serialization
//! beyond serde, and key management; signing and verification belong to the
//! crypto adapter.

pub mod access;
pub mod m2m;
pub mod revoked;

pub use access::{AccessClaims, ACCESS_TTL_SECONDS, REFRESH_TTL_SECONDS};
pub use m2m::{M2mClaims, M2mConfig, M2M_TTL_SECONDS};
pub use revoked::{RevokedAccessToken, REVOCATION_TTL_SECONDS};
