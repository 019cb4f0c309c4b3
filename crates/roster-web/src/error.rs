//! Error types for the roster HTTP API.
//!
//! [`ApiError`] wraps every failure a handler can hit and converts it into
//! a JSON response carrying an Arabic message for the user and the
//! technical detail for the logs.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_store::StoreError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A data-layer failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body, path, or query string could not be read.
    #[error("invalid request: {detail}")]
    InvalidRequest {
        /// Status chosen by the extractor that rejected the request.
        status: StatusCode,
        /// What was wrong with the request.
        detail: String,
    },

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidRequest { status, .. } => *status,
            Self::Store(StoreError::Storage { .. }) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Store(StoreError::Storage { .. }) => "storage_error",
            Self::Store(StoreError::NotFound { .. }) => "not_found",
            Self::Store(StoreError::Validation(_)) => "validation_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message shown to the user.
    pub fn message_ar(&self) -> String {
        match self {
            Self::Store(StoreError::Storage { .. }) => {
                String::from("حدث خطأ في قراءة البيانات أو حفظها")
            }
            Self::Store(StoreError::NotFound { collection, .. }) => {
                format!("السجل المطلوب غير موجود في {}", collection.label_ar())
            }
            Self::Store(StoreError::Validation(err)) => {
                format!("يرجى التحقق من الحقل: {}", err.field)
            }
            Self::InvalidRequest { .. } => String::from("تعذرت قراءة الطلب، يرجى التحقق من البيانات المرسلة"),
            Self::Internal(_) => String::from("حدث خطأ داخلي في الخادم"),
        }
    }

    /// The offending field for validation failures.
    pub fn field_name(&self) -> Option<String> {
        match self {
            Self::Store(err) => err.field().map(str::to_owned),
            Self::InvalidRequest { .. } | Self::Internal(_) => None,
        }
    }
}

macro_rules! from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::InvalidRequest {
                        status: rejection.status(),
                        detail: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        } else {
            tracing::warn!(error = %self, kind = self.kind(), "Request rejected");
        }

        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.message_ar(),
            "detail": self.to_string(),
            "status": status.as_u16(),
        });
        if let (Some(field), Some(map)) = (self.field_name(), body.as_object_mut()) {
            map.insert(String::from("field"), serde_json::Value::String(field));
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::ValidationError;
    use roster_types::CollectionKind;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found = ApiError::from(StoreError::NotFound {
            collection: CollectionKind::Shifts,
            id: 4,
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.kind(), "not_found");

        let invalid = ApiError::from(StoreError::from(ValidationError::missing("name")));
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.field_name().as_deref(), Some("name"));

        let broken = ApiError::from(StoreError::storage(
            std::path::Path::new("data/tasks.json"),
            "corrupt document",
        ));
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(broken.to_string().contains("tasks.json"));
    }

    #[test]
    fn unreadable_requests_keep_the_extractor_status() {
        let err = ApiError::InvalidRequest {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            detail: String::from("Expected request with `Content-Type: application/json`"),
        };
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.kind(), "invalid_request");
        assert!(err.field_name().is_none());
    }
}
