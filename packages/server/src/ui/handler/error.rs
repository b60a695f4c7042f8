//! Mapping of usecase errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::ValueObjectError,
    infrastructure::dto::http::ErrorResponse,
    usecase::{ConnectError, RoomAdminError, SendMessageError},
};

/// An error response with a JSON body `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(error: ValueObjectError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error.to_string())
    }
}

impl From<RoomAdminError> for ApiError {
    fn from(error: RoomAdminError) -> Self {
        let status = match &error {
            RoomAdminError::InvalidName(_) => StatusCode::BAD_REQUEST,
            RoomAdminError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            RoomAdminError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl From<ConnectError> for ApiError {
    fn from(error: ConnectError) -> Self {
        let status = match &error {
            ConnectError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            ConnectError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConnectError::HubUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, error.to_string())
    }
}

impl From<SendMessageError> for ApiError {
    fn from(error: SendMessageError) -> Self {
        let status = match &error {
            SendMessageError::HubUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SendMessageError::Persistence(_) | SendMessageError::Publish { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RepositoryError, RoomId},
        hub::HubError,
    };

    #[test]
    fn test_status_mapping() {
        // テスト項目: ユースケースのエラーが適切なステータスコードに変換される
        // given (前提条件):
        let room = RoomId::new(1).unwrap();
        let unavailable = RepositoryError::Unavailable("down".to_string());

        // when (操作) / then (期待する結果):
        assert_eq!(
            ApiError::from(RoomAdminError::InvalidName("name is empty")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RoomAdminError::RoomNotFound(room)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ConnectError::RoomNotFound(room)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ConnectError::HubUnavailable(HubError::Closed)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ConnectError::Repository(unavailable.clone())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(SendMessageError::Persistence(unavailable)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ValueObjectError::EmptyContent).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
