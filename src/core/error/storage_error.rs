/// Errors surfaced by the key-value and SQL storage seams.

/*
 Storage errors are infrastructure failures, not domain outcomes. How a
caller reacts is path-dependent: authorization reads fail closed, the
revocation deny list fails open, audit writes swallow them entirely.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation
    Unavailable { reason: String },
    /// A stored value could not be serialized or deserialized
    Serialization { reason: String },
    /// A table identifier failed allow-list validation
    InvalidTable { table: String },
}

impl StorageError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    pub fn invalid_table(table: impl Into<String>) -> Self {
        Self::InvalidTable {
            table: table.into(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "Storage unavailable: {}", reason),
            Self::Serialization { reason } => {
                write!(f, "Storage serialization failed: {}", reason)
            }
            Self::InvalidTable { table } => {
                write!(f, "Table identifier rejected: {}", table)
            }
        }
    }
}

impl std::error::Error for StorageError {}
