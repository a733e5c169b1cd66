//! Authentication infrastructure module
//!
//! Signed token issuing and the configured login accounts.

mod jwt;
mod users;

pub use jwt::{JwtConfig, TokenClaims, TokenError, TokenIssuer};
pub use users::{UserAccount, UserDirectory};
