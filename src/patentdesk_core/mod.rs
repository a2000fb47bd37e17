//! Core domain types and state for patentdesk.

pub mod catalog;
pub mod controller;
pub mod filters;
pub mod log;
pub mod session;
pub mod types;

pub use catalog::{Catalog, CatalogError};
pub use controller::{
    ActionId, ControllerError, ControllerOptions, Credentials, FieldId, PortfolioController,
    UiEvent, ViewModel,
};
pub use filters::{visible_records, CatalogInsights, DetailView, FilterSpec, MinRelevance};
pub use log::{DraftField, FormState, LogEntry, LogError, LogMutator, PatentDraft};
pub use session::{AuthError, AuthMode, SessionManager};
pub use types::{Identity, PatentRecord, PatentStatus, Username, MAX_RELEVANCE};
