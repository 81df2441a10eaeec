//! auth.rs
//! Autenticación por bearer token y rol Admin como extractores de actix.

use actix_web::{dev::Payload, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{ready, Ready};
use thiserror::Error;

use crate::models::api_response::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

/// Tokens válidos, registrados como `web::Data<AuthTokens>`.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    admin_token: Option<String>,
    user_token: Option<String>,
}

impl AuthTokens {
    pub fn new(admin_token: Option<String>, user_token: Option<String>) -> Self {
        Self {
            admin_token,
            user_token,
        }
    }

    pub fn role_for(&self, token: &str) -> Option<Role> {
        if matches_token(self.admin_token.as_deref(), token) {
            Some(Role::Admin)
        } else if matches_token(self.user_token.as_deref(), token) {
            Some(Role::User)
        } else {
            None
        }
    }
}

fn matches_token(expected: Option<&str>, given: &str) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    if expected.len() != given.len() {
        return false;
    }
    // Comparación sin cortocircuito
    expected
        .bytes()
        .zip(given.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid bearer token")]
    InvalidToken,
    #[error("Admin role required")]
    Forbidden,
}

impl actix_web::ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.to_string()))
    }
}

/// Cualquier usuario autenticado.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub role: Role,
}

/// Usuario con rol Admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let Some(tokens) = req.app_data::<web::Data<AuthTokens>>() else {
        log::error!("AuthTokens no registrado en app_data; se rechaza la petición");
        return Err(AuthError::InvalidToken);
    };

    tokens
        .role_for(token)
        .map(|role| AuthenticatedUser { role })
        .ok_or(AuthError::InvalidToken)
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| match user.role {
            Role::Admin => Ok(AdminUser),
            Role::User => Err(AuthError::Forbidden),
        }))
    }
}
