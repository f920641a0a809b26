//! Infrastructure layer for MindSketch.
//!
//! File-backed implementations of the domain's storage and secret seams:
//! path management, the secret service, the application config service, and
//! the JSON archive repository.

pub mod archive_repository;
pub mod config_service;
pub mod paths;
pub mod secret_service;

pub use archive_repository::JsonArchiveRepository;
pub use config_service::ConfigService;
pub use paths::{PathError, SketchPaths};
pub use secret_service::SecretServiceImpl;
