//! Authentication-related models

use super::user::UserResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
}

/// Sign-in request (same shape as sign-up)
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 1024, message = "Old password is required"))]
    pub old_password: String,
    #[validate(length(min = 1, max = 1024, message = "New password is required"))]
    pub new_password: String,
}

/// Access/refresh token pair, also the data of a refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign-in response data
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// "Who am I" response data
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: UserResponse,
}
