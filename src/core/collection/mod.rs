// Collection preparation and crash cleanup

pub mod orchestrator;

pub use orchestrator::{
    CollectionOrchestrator, PrepareOptions, DEFAULT_METADATA_DOCUMENT, EMAIL_ATTRIBUTE,
};
