use serde::{Deserialize, Serialize};

/// Status code of a successful invocation.
pub const OK: i32 = 200;
/// Status code of a failed invocation.
pub const ERROR: i32 = 500;

/// Outcome of one chaincode invocation, as handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}
