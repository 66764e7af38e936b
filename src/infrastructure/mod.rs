pub mod document_service;
pub mod record_store;

pub use document_service::{DocumentService, ExternalDocumentTools, SpliceDirective};
pub use record_store::{MySqlRecordStore, RecordStore};
