//! Storage error surface shared by the SQLite and in-memory backends.
//!
//! Each error carries an [`ErrorContext`] naming the operation that failed and,
//! for rejected input, which entity was rejected. `with_conn` in the SQLite
//! backend consults [`RepositoryError::is_retryable`] to decide whether to
//! back off and try again.

use std::fmt;

use crate::models::cycle::CycleValidationError;
use crate::models::prediction::PredictionInvariantError;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a storage error happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Repository operation, e.g. `insert_cycle` or `latest_prediction`.
    pub operation: Option<String>,
    /// `cycle` or `prediction` for rejected input.
    pub entity: Option<&'static str>,
    pub details: Option<String>,
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            self.operation.as_deref().map(|op| format!("op={op}")),
            self.entity.map(|e| format!("entity={e}")),
            self.details.as_deref().map(|d| format!("details={d}")),
            self.retryable.then(|| "retryable".to_string()),
        ];
        let fields: Vec<String> = fields.into_iter().flatten().collect();
        write!(f, "[{}]", fields.join(" "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Pool exhausted, database locked, or the in-memory store marked down.
    #[error("storage unavailable: {message} {context}")]
    Unavailable {
        message: String,
        context: ErrorContext,
    },

    #[error("query failed: {message} {context}")]
    Query {
        message: String,
        context: ErrorContext,
    },

    #[error("not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Rejected cycle or prediction; never retried.
    #[error("invalid input: {message} {context}")]
    Invalid {
        message: String,
        context: ErrorContext,
    },

    #[error("misconfigured repository: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("internal storage error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    /// Storage could not be reached. Always retryable.
    pub fn unavailable(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Unavailable {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
            context: ErrorContext::default().with_entity(entity),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable { context, .. } | Self::Query { context, .. } => context.retryable,
            _ => false,
        }
    }

    /// Whether the caller supplied bad input (as opposed to a storage fault).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Invalid { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Tag the error with the repository operation that produced it.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }
}

impl From<CycleValidationError> for RepositoryError {
    fn from(err: CycleValidationError) -> Self {
        RepositoryError::invalid("cycle", err.to_string())
    }
}

impl From<PredictionInvariantError> for RepositoryError {
    fn from(err: PredictionInvariantError) -> Self {
        RepositoryError::invalid("prediction", err.to_string())
    }
}

#[cfg(feature = "sqlite-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error as DieselError;

        match err {
            DieselError::NotFound => RepositoryError::not_found("no matching row"),
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                let lowered = message.to_lowercase();
                let mut context = ErrorContext::default().with_details(format!("{kind:?}"));

                // SQLITE_BUSY / SQLITE_LOCKED surface as unknown-kind errors.
                if lowered.contains("locked") || lowered.contains("busy") {
                    context = context.retryable();
                }

                if lowered.contains("constraint") {
                    RepositoryError::Invalid { message, context }
                } else {
                    RepositoryError::Query { message, context }
                }
            }
            DieselError::DeserializationError(e) | DieselError::SerializationError(e) => {
                RepositoryError::internal(format!("row conversion failed: {e}"))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}
