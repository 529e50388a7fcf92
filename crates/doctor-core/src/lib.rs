pub mod analysis;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod render;
pub mod store;

// Re-export main types for convenience
pub use analysis::{AgentType, AnalysisResult, PatientSubmission};
pub use client::{AnalysisClient, Analyzer};
pub use config::Config;
pub use controller::{FormController, SubmitControl, UiState};
pub use error::{RequestError, StoreError, SubmitRejected};
pub use form::{FieldId, PatientForm};
pub use render::{Block, ErrorPanel, Panel};
pub use store::{FieldStore, JsonFileStore, MemoryStore};
