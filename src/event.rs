use crate::document::ConvertedDocument;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum AppEvent {
    DocumentLoaded(Box<ConvertedDocument>),
    DocumentFailed {
        path: PathBuf,
        message: String,
    },
    SubmitSucceeded {
        status: u16,
        body: String,
    },
    SubmitFailed(String),
}
