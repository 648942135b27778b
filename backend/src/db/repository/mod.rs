//! Repository trait definitions for database operations.
//!
//! Storage is split into two focused traits, one per persisted entity, and
//! combined through [`FullRepository`] for callers that need both.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`cycle`]: Recorded cycle history
//! - [`prediction`]: Append-only prediction log
//!
//! # Convenience Trait Bound
//!
//! ```ignore
//! async fn refresh(repo: &dyn FullRepository) -> RepositoryResult<()> {
//!     let history = repo.list_cycles().await?;
//!     let prediction = build(&history);
//!     repo.insert_prediction(&prediction).await?;
//!     Ok(())
//! }
//! ```

pub mod cycle;
pub mod error;
pub mod prediction;

pub use cycle::CycleRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use prediction::PredictionRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type implementing both entity traits.
pub trait FullRepository: CycleRepository + PredictionRepository {}

impl<T> FullRepository for T where T: CycleRepository + PredictionRepository {}
