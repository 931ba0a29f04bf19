//! academy-client — collaborator implementations for the progress engine.
//!
//! HTTP clients for the server record store and certificate issuance
//! endpoints, in-memory reference implementations carrying the same
//! contracts for tests and offline use, and the client configuration
//! layer.

pub mod config;
pub mod error;
pub mod issuer;
pub mod memory;
pub mod store;

pub use config::{load_config, load_config_from, AcademyConfig};
pub use error::ApiError;
pub use issuer::HttpCertificateIssuer;
pub use memory::{InMemoryCertificateIssuer, InMemoryProgressStore, RecordingNotifier};
pub use store::HttpProgressStore;
