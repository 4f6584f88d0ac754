//! # banter-auth
//!
//! JWT token handling for the Banter chat backend.
//!
//! ## Modules
//!
//! - `jwt` — JWT token creation, validation, and the normalized
//!   [`jwt::Identity`] produced at the verification boundary
//!
//! Token issuance endpoints (guest login, OAuth exchange) live outside
//! this backend; the encoder here exists for operational tooling and
//! tests.

pub mod jwt;

pub use jwt::{Claims, Identity, JwtDecoder, JwtEncoder};
