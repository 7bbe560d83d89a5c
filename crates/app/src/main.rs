use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use pdf_copilot_core::{
    discover_pdf_files, CharacterNgramEmbedder, ChunkingConfig, Copilot, CopilotConfig,
    CopilotError, IngestionPolicy, ModelConfig, OllamaClient, ProcessedBatch, Role, Session,
    ValidationError,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-copilot", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model server base URL
    #[arg(long, env = "PDF_COPILOT_MODEL_URL", default_value = "http://localhost:11434")]
    model_url: String,

    /// Embedding backend
    #[arg(long, value_enum, env = "PDF_COPILOT_EMBEDDER", default_value = "ollama")]
    embedder: EmbedderKind,

    /// Embedding model served by the model server
    #[arg(long, env = "PDF_COPILOT_EMBEDDING_MODEL", default_value = "all-minilm")]
    embedding_model: String,

    /// Dimension of the embedding model's vectors
    #[arg(long, env = "PDF_COPILOT_EMBEDDING_DIMENSIONS", default_value = "384")]
    embedding_dimensions: usize,

    /// Language model used for answers and summaries
    #[arg(long, env = "PDF_COPILOT_LANGUAGE_MODEL", default_value = "llama3.2")]
    language_model: String,

    /// Sampling temperature passed to the language model
    #[arg(long, env = "PDF_COPILOT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Per-request timeout in seconds for model calls
    #[arg(long, env = "PDF_COPILOT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Maximum chunk length in characters
    #[arg(long, env = "PDF_COPILOT_CHUNK_SIZE", default_value = "1000")]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "PDF_COPILOT_CHUNK_OVERLAP", default_value = "200")]
    chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[arg(long, env = "PDF_COPILOT_RETRIEVAL_K", default_value = "4")]
    retrieval_k: usize,

    /// Only send the most recent N conversation turns to the model
    #[arg(long, env = "PDF_COPILOT_HISTORY_TURNS")]
    history_turns: Option<usize>,

    /// Maximum number of PDFs per batch
    #[arg(long, env = "PDF_COPILOT_MAX_FILES", default_value = "5")]
    max_files: usize,

    /// Skip unreadable PDFs instead of failing the whole batch
    #[arg(long, env = "PDF_COPILOT_SKIP_UNREADABLE", default_value_t = false)]
    skip_unreadable: bool,

    /// Directory holding the persisted vector index
    #[arg(long, env = "PDF_COPILOT_PERSIST_DIR", default_value = "data/vector_index")]
    persist_dir: PathBuf,

    /// Scratch directory for staged uploads
    #[arg(long, env = "PDF_COPILOT_UPLOAD_DIR", default_value = "data/uploaded_pdfs")]
    upload_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderKind {
    /// Embeddings from the model server.
    Ollama,
    /// Offline character-trigram embeddings.
    Ngram,
}

#[derive(Subcommand)]
enum Command {
    /// Process PDFs into a fresh vector index.
    Process {
        /// PDF file to process; repeat for several files.
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Folder whose PDFs are processed recursively.
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Ask one question against the processed documents.
    Ask {
        /// Question text
        #[arg(long)]
        question: String,
        /// Print the retrieved chunks before the answer.
        #[arg(long, default_value_t = false)]
        show_context: bool,
    },
    /// Summarize every processed document.
    Summarize,
    /// Interactive conversation on stdin.
    Chat {
        /// PDFs to process before the conversation starts.
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn copilot_config(&self) -> CopilotConfig {
        CopilotConfig {
            chunking: ChunkingConfig {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
            },
            models: ModelConfig {
                endpoint: self.model_url.clone(),
                embedding_model: self.embedding_model.clone(),
                embedding_dimensions: self.embedding_dimensions,
                language_model: self.language_model.clone(),
                temperature: self.temperature,
                request_timeout_secs: self.timeout_secs,
            },
            retrieval_k: self.retrieval_k,
            max_upload_files: self.max_files,
            history_max_turns: self.history_turns,
            ingestion_policy: if self.skip_unreadable {
                IngestionPolicy::SkipFailed
            } else {
                IngestionPolicy::AbortBatch
            },
            persist_directory: self.persist_dir.clone(),
            upload_directory: self.upload_dir.clone(),
        }
    }

    fn build_copilot(&self) -> Result<Copilot, CopilotError> {
        let config = self.copilot_config();
        match self.embedder {
            EmbedderKind::Ollama => Copilot::with_ollama(config),
            EmbedderKind::Ngram => {
                let client = Arc::new(OllamaClient::from_config(&config.models)?);
                Copilot::with_embedder(config, Arc::new(CharacterNgramEmbedder::default()), client)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let copilot = cli.build_copilot()?;
    let mut session = Session::new();

    info!(
        version = app_version,
        session_id = %session.id(),
        started_at = %Utc::now().to_rfc3339(),
        "pdf-copilot boot"
    );

    match cli.command {
        Command::Process { files, folder } => {
            let mut files = files;
            if let Some(folder) = folder {
                files.extend(discover_pdf_files(&folder));
            }

            let batch = copilot.process_uploads(&mut session, &files).await?;
            print_batch(&batch);
        }
        Command::Ask {
            question,
            show_context,
        } => {
            restore_or_fail(&copilot, &mut session)?;

            if show_context {
                for hit in copilot.retrieve(&session, &question).await? {
                    println!(
                        "[{}#{}] score={:.4}",
                        hit.chunk.source_id, hit.chunk.chunk_index, hit.score
                    );
                }
            }

            let answer = copilot.ask(&mut session, &question).await?;
            println!("{answer}");
        }
        Command::Summarize => {
            restore_or_fail(&copilot, &mut session)?;
            let report = copilot.summarize(&mut session).await?;
            println!("{report}");
        }
        Command::Chat { files } => {
            if files.is_empty() {
                if !copilot.restore(&mut session)? {
                    println!("Process your documents with /process <file.pdf>... to start chatting.");
                }
            } else {
                let batch = copilot.process_uploads(&mut session, &files).await?;
                print_batch(&batch);
            }

            run_chat(&copilot, &mut session).await?;
            session.end();
        }
    }

    Ok(())
}

fn restore_or_fail(copilot: &Copilot, session: &mut Session) -> Result<(), CopilotError> {
    if copilot.restore(session)? {
        Ok(())
    } else {
        Err(ValidationError::NoActiveIndex.into())
    }
}

fn print_batch(batch: &ProcessedBatch) {
    for document in &batch.documents {
        println!(
            "{} pages={} chunks={} sha256={}",
            document.title, document.pages, document.chunks, document.checksum
        );
    }

    for skipped in &batch.skipped_files {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
    }

    println!(
        "{} chunks indexed at {}",
        batch.chunk_count,
        Utc::now().to_rfc3339()
    );
}

async fn run_chat(copilot: &Copilot, session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) | ("/exit", _) => break,
            ("/process", rest) => {
                let files: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                copilot
                    .process_uploads(session, &files)
                    .await
                    .map(|batch| print_batch(&batch))
            }
            ("/summarize", _) => copilot
                .summarize(session)
                .await
                .map(|report| println!("{report}\n---")),
            ("/history", _) => {
                for turn in session.conversation().turns() {
                    let speaker = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "copilot",
                    };
                    println!("{speaker}: {}", turn.message);
                }
                Ok(())
            }
            _ => copilot
                .ask(session, line)
                .await
                .map(|answer| println!("{answer}")),
        };

        // The session stays usable after a failure; the user decides whether to retry.
        if let Err(error) = outcome {
            eprintln!("error: {error}");
        }
    }

    Ok(())
}
