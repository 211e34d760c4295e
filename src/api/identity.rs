//! Caller identity supplied by the session/auth layer in front of the API.
//!
//! The shopper is named by `x-user-id`, which also keys their session cart. Vendor endpoints
//! additionally read `x-vendor-id`.

use crate::errors::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

pub const USER_HEADER: &str = "x-user-id";
pub const VENDOR_HEADER: &str = "x-vendor-id";

/// The authenticated shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// The vendor the caller acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentVendor(pub i64);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(parts, USER_HEADER)
            .map(|user| Self(user.to_string()))
            .ok_or_else(|| Error::PermissionDenied {
                message: "Please sign in to continue".to_string(),
            })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentVendor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(parts, VENDOR_HEADER)
            .and_then(|raw| raw.parse().ok())
            .map(Self)
            .ok_or_else(|| Error::PermissionDenied {
                message: "Vendor account required".to_string(),
            })
    }
}
