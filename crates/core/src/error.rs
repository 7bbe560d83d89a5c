use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("two uploads would be staged as {0}")]
    DuplicateFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("no document in the batch could be read")]
    NoDocuments,

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("embedding dimension {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("embedding count {embeddings} doesn't match chunk count {chunks}")]
    CountMismatch { chunks: usize, embeddings: usize },

    #[error("index was built with embedding model {index_model}, queries use {query_model}")]
    ModelMismatch {
        index_model: String,
        query_model: String,
    },

    #[error("unsupported index format version {0}")]
    UnsupportedFormat(u32),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model endpoint unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid model endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one pdf file is required")]
    NoFiles,

    #[error("{count} files were uploaded, at most {max} are allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("more than one uploaded file is named {0}")]
    DuplicateFileName(String),

    #[error("no documents have been processed yet")]
    NoActiveIndex,

    #[error("question is empty")]
    EmptyQuestion,
}

#[derive(Debug, Error)]
pub enum CopilotError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T, E = CopilotError> = std::result::Result<T, E>;
