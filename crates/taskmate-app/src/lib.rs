//! Application layer logic for taskmate.
//!
//! This crate provides the owner-scoped repositories, the task service that
//! writes every change through to storage, configuration loading and input
//! validation shared by the command-line front end.

pub mod config;
pub mod error;
pub mod profile;
pub mod service;
pub mod task_patch;
pub mod task_repository;
pub mod validation;

// Re-exports for convenience
pub use config::{AppConfig, DefaultsConfig};
pub use error::{RepositoryError, RepositoryResult};
pub use profile::{AuthIdentity, ProfileRepository, ThemeRepository};
pub use service::{Applied, PersistOutcome, TaskService};
pub use task_patch::{TaskDraft, TaskPatch, push_unique_tag};
pub use task_repository::{OwnerId, TaskRepository};
pub use validation::{
    SignUpForm, ValidationError, validate_email, validate_password, validate_profile, validate_title,
};
