use spl_store::StoreError;

/// Errors surfaced by chaincode operations.
///
/// Every variant becomes a failed transaction response carrying its
/// `Display` text. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ChaincodeError {
    /// The operation received the wrong number of positional arguments.
    #[error("incorrect number of arguments for {function}: expected {expected}, got {actual}")]
    BadArgumentCount {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// `initProfile` on a user id that already has a record.
    #[error("profile already exists: {0}")]
    AlreadyExists(String),

    /// Update or delete on a user id with no record.
    #[error("profile does not exist: {0}")]
    NotFound(String),

    /// Stored bytes do not decode as a profile record.
    #[error("failed to decode stored profile {id}: {reason}")]
    Decode { id: String, reason: String },

    /// A profile could not be serialized for writing.
    #[error("failed to encode profile: {0}")]
    Encode(String),

    /// The host world state failed.
    #[error("backing store error: {0}")]
    BackingStore(#[from] StoreError),

    /// A delimited argument did not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The invoked function name is not part of this chaincode.
    #[error("invalid invoke function name {0:?}; expecting one of initProfile, updateProfile, deleteProfile, getProfileByID")]
    UnknownFunction(String),

    /// Delimiter configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for chaincode operations.
pub type ChaincodeResult<T> = Result<T, ChaincodeError>;
