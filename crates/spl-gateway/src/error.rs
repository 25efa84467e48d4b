use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use spl_chaincode::ChaincodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Chaincode(#[from] ChaincodeError),

    #[error("store error: {0}")]
    Store(#[from] spl_store::StoreError),

    #[error("no profile for user id: {0}")]
    ProfileNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Chaincode(e) => match e {
                ChaincodeError::NotFound(_) => StatusCode::NOT_FOUND,
                ChaincodeError::AlreadyExists(_) => StatusCode::CONFLICT,
                ChaincodeError::BadArgumentCount { .. }
                | ChaincodeError::MalformedInput(_)
                | ChaincodeError::UnknownFunction(_) => StatusCode::BAD_REQUEST,
                ChaincodeError::Decode { .. }
                | ChaincodeError::Encode(_)
                | ChaincodeError::BackingStore(_)
                | ChaincodeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaincode_errors_map_to_http_status() {
        let cases = [
            (ChaincodeError::NotFound("u".into()), StatusCode::NOT_FOUND),
            (ChaincodeError::AlreadyExists("u".into()), StatusCode::CONFLICT),
            (ChaincodeError::MalformedInput("x".into()), StatusCode::BAD_REQUEST),
            (ChaincodeError::UnknownFunction("f".into()), StatusCode::BAD_REQUEST),
            (
                ChaincodeError::Decode { id: "u".into(), reason: "r".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(GatewayError::from(err).status(), status);
        }
    }

    #[test]
    fn chaincode_message_is_passed_through() {
        let err = GatewayError::from(ChaincodeError::NotFound("u7".into()));
        assert_eq!(err.to_string(), "profile does not exist: u7");
    }
}
