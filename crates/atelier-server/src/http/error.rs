use atelier_core::ShareError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    requires_login: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            requires_login: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", resource))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 401 telling an anonymous caller the link is viewable once they
    /// log in. The body carries `requiresLogin: true` so clients can
    /// redirect instead of surfacing an error.
    pub fn login_required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "login required to view this link".to_string(),
            requires_login: true,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": {
                "code": self.status.as_u16(),
                "message": self.message,
            }
        });
        if self.requires_login {
            body["requiresLogin"] = json!(true);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::Validation(message) => Self::bad_request(message),
            ShareError::AlreadyShared => {
                Self::conflict("workspace is already shared with this user")
            }
            ShareError::AccessDenied => Self::forbidden("access denied"),
            ShareError::Unauthenticated => Self::unauthorized("authentication required"),
            ShareError::LoginRequired => Self::login_required(),
            ShareError::NotFound(resource) => Self::not_found(resource),
            ShareError::Db(err) => {
                tracing::error!(error = %err, "database error");
                Self::internal("internal error")
            }
            ShareError::Internal(message) => {
                tracing::error!(error = %message, "internal error");
                Self::internal("internal error")
            }
        }
    }
}

impl From<atelier_db::DbError> for ApiError {
    fn from(err: atelier_db::DbError) -> Self {
        ShareError::from(err).into()
    }
}
