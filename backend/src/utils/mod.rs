//! Collection of general utility functions and common traits.
//!
//! Token signing, the time source used for expiry, and password checks.

pub mod clock;
pub mod jwt;
pub mod password;
