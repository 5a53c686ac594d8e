use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("no root term labelled: {0}")]
    RootNotFound(String),

    #[error("unknown ontology: {0}")]
    UnknownOntology(String),

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type OntologyResult<T> = Result<T, OntologyError>;
