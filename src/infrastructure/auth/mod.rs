//! Session gateway: token issuance and validation

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtService, TokenIssuer, TokenPair};
