//! Error type shared by wrapper rendering, scopes and the CRUD façade.

use thiserror::Error;
use tokio_postgres::error::SqlState;

pub type OrmResult<T> = Result<T, OrmError>;

#[derive(Debug, Error)]
pub enum OrmError {
    /// Any driver error not classified below.
    #[error("database error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// `first`-style lookup matched no row.
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("unique constraint {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint {0}")]
    CheckViolation(String),

    /// A row column could not be converted into the requested Rust type.
    #[error("cannot decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    /// UPDATE or DELETE without any WHERE condition and without an opt-in.
    #[error("global {0} not permitted: add a condition or opt in explicitly")]
    GlobalMutation(MutationKind),

    /// The statement cannot be rendered as requested, e.g. an UPDATE with
    /// nothing to SET.
    #[error("invalid statement: {0}")]
    Validation(String),

    #[error("settings: {0}")]
    Config(String),

    #[cfg(feature = "pool")]
    #[error("connection pool: {0}")]
    Pool(String),
}

/// Statement kind guarded against table-wide mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

impl OrmError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    pub fn is_global_mutation(&self) -> bool {
        matches!(self, Self::GlobalMutation(_))
    }

    /// Classify a driver error by SQLSTATE. Constraint violations get their own
    /// variants carrying `constraint: message`; everything else stays `Query`.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db) = err.as_db_error() else {
            return Self::Query(err);
        };
        let detail = format!(
            "{}: {}",
            db.constraint().unwrap_or("<unnamed>"),
            db.message()
        );
        let code = db.code();
        if *code == SqlState::UNIQUE_VIOLATION {
            Self::UniqueViolation(detail)
        } else if *code == SqlState::FOREIGN_KEY_VIOLATION {
            Self::ForeignKeyViolation(detail)
        } else if *code == SqlState::CHECK_VIOLATION {
            Self::CheckViolation(detail)
        } else {
            Self::Query(err)
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
