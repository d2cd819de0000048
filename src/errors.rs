use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("INVALID_PATH: {0}")]
    InvalidPath(String),
    #[error("ALREADY_EXISTS: {0}")]
    AlreadyExists(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("NOT_A_FILE: {0}")]
    NotAFile(String),
    #[error("BACKUP_FAILED: {0}")]
    BackupFailed(String),
    #[error("ENCODING_FAILED: {0}")]
    EncodingFailed(String),
    #[error("METADATA_PARSE_FAILED: {0}")]
    MetadataParse(String),
    #[error("METADATA_SERIALIZE_FAILED: {0}")]
    MetadataSerialize(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
}

impl From<std::io::Error> for VaultError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
