use thiserror::Error;

/// Fieldless classification of a [`PaymentError`], convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    AlreadyInitialized,
    NotInitialized,
    Paused,
    MintMismatch,
    ReceiverMintMismatch,
    InvalidReceiver,
    InvalidAmount,
    AccountNotFound,
    TransferFailed,
    InvalidAddress,
    InvalidInstruction,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Caller is not authorized to perform this operation")]
    Unauthorized,
    #[error("PaymentProcessor is already initialized")]
    AlreadyInitialized,
    #[error("PaymentProcessor is not initialized")]
    NotInitialized,
    #[error("PaymentProcessor is paused")]
    Paused,
    #[error("The mint of the provided token account does not match the PaymentProcessor")]
    MintMismatch,
    #[error("The receiver token account mint does not match the PaymentProcessor mint")]
    ReceiverMintMismatch,
    #[error("The receiver token account is not owned by the PaymentProcessor receiver")]
    InvalidReceiver,
    #[error("Payment amount must be greater than zero")]
    InvalidAmount,
    #[error("Token account not found: {0}")]
    AccountNotFound(String),
    #[error("Token transfer failed: {0}")]
    TransferFailed(String),
    #[error("Invalid Base58 Address: {0}")]
    InvalidAddress(String),
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Paused => ErrorKind::Paused,
            Self::MintMismatch => ErrorKind::MintMismatch,
            Self::ReceiverMintMismatch => ErrorKind::ReceiverMintMismatch,
            Self::InvalidReceiver => ErrorKind::InvalidReceiver,
            Self::InvalidAmount => ErrorKind::InvalidAmount,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::TransferFailed(_) => ErrorKind::TransferFailed,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::InvalidInstruction(_) => ErrorKind::InvalidInstruction,
            _ => ErrorKind::Infrastructure,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(e: rocksdb::Error) -> Self {
        Self::StorageError(format!("RocksDB error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
