pub mod capability;
pub mod engine;

use std::collections::HashMap;
use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, HeaderName, HeaderValue},
};
use axum_extra::headers::{self, Header};
use axum_extra::TypedHeader;
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::ChatState};

pub use capability::Capability;
pub use engine::PermissionEngine;

static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// The `X-User-ID` header carrying the already authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XUserId(pub Uuid);

impl Header for XUserId {
    fn name() -> &'static HeaderName {
        &X_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let raw = value.to_str().map_err(|_| headers::Error::invalid())?;
        Uuid::parse_str(raw.trim())
            .map(XUserId)
            .map_err(|_| headers::Error::invalid())
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Caller identity for routes that are not permission gated.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(XUserId(user_id)) =
            TypedHeader::<XUserId>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::bad_request("missing or invalid X-User-ID header"))?;
        Ok(CallerId(user_id))
    }
}

/// Rejects the request unless the caller holds `C` in the chat named by the
/// `chat_id` path parameter.
pub struct RequirePermission<C> {
    pub user_id: Uuid,
    pub chat_id: Uuid,
    _capability: PhantomData<C>,
}

#[async_trait]
impl<C: Capability> FromRequestParts<ChatState> for RequirePermission<C> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ChatState,
    ) -> Result<Self, Self::Rejection> {
        let CallerId(user_id) = CallerId::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("invalid path parameters"))?;
        let chat_id = params
            .get("chat_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| AppError::bad_request("invalid chat id"))?;

        match state.permissions.has_permission(user_id, chat_id, C::NAME) {
            Ok(true) => Ok(Self {
                user_id,
                chat_id,
                _capability: PhantomData,
            }),
            Ok(false) => Err(AppError::forbidden("forbidden: insufficient permissions")),
            Err(err) => {
                warn!(
                    %user_id,
                    %chat_id,
                    permission = C::NAME,
                    error = %err,
                    "permission check failed"
                );
                Err(AppError::forbidden("could not verify permission"))
            }
        }
    }
}
