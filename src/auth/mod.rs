//! Authentication module

pub mod cookie;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use guard::{AuthContext, AuthFailure, AuthGuard};
pub use jwt::{TokenClaims, TokenCodec, TokenError};
pub use middleware::{extract_token, require_auth_middleware};
pub use password::CredentialHasher;

/// Access token lifetime: 15 minutes
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 30 days
pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 86_400;
