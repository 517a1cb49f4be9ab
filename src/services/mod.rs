//! Service layer for business logic
//!
//! This module contains service abstractions that separate business logic
//! from HTTP handlers, making the code more modular and testable.

pub mod artifacts;
pub mod detail;
pub mod directory;
pub mod limits;

pub use artifacts::{Artifact, ArtifactBody, ArtifactResolver};
pub use detail::{DetailService, EmployeeDetail};
pub use directory::DirectoryService;
