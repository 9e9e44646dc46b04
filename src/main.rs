use clap::{Parser, Subcommand};
use std::path::PathBuf;
use student_assist::{
    config::Config,
    documents::{extract_upload, ExtractorRegistry, UploadedFile},
    session::{LoadOutcome, StudySession},
    tui,
    utils::{format_count, init_logger, LogTarget},
};
use tracing::info;

/// Student Assist: ask questions about your course documents.
#[derive(Parser, Debug)]
#[command(name = "student-assist", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Ask one question, optionally grounded in a document
    Ask {
        /// PDF, DOCX or image file to use as context
        #[arg(short, long)]
        file: Option<PathBuf>,
        question: String,
    },
    /// Print the text extracted from a document
    Extract { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let command = cli.command.unwrap_or(Command::Chat);

    // The TUI owns the terminal, so its logs go to a file
    let target = match command {
        Command::Chat => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _guard = init_logger(&config.logging, target)?;
    info!(model = %config.llm.model, "Configuration loaded: {:?}", config.extraction);

    match command {
        Command::Chat => tui::run(start_session(&config)).await,
        Command::Ask { file, question } => ask(&config, file, &question).await,
        Command::Extract { path } => extract(&config, path).await,
    }
}

/// Start a session or exit with the configuration message.
fn start_session(config: &Config) -> StudySession {
    match StudySession::start(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!(
                "Configuration Error: {}. Please ensure your GEMINI_API_KEY is set in the .env file.",
                e
            );
            std::process::exit(1);
        }
    }
}

async fn ask(config: &Config, file: Option<PathBuf>, question: &str) -> anyhow::Result<()> {
    let mut session = start_session(config);

    if let Some(path) = file {
        let upload = UploadedFile::from_path(&path).await?;
        match session.load_document(&upload).await {
            Ok(LoadOutcome::Loaded {
                filename,
                char_count,
            }) => eprintln!(
                "Successfully loaded context from: {} (approx. {} characters).",
                filename,
                format_count(char_count)
            ),
            Ok(LoadOutcome::AlreadyLoaded { .. }) => {}
            Err(e) => anyhow::bail!("Document processing failed: {}", e),
        }
    }

    let Some(reply) = session.ask(question).await else {
        anyhow::bail!("Question is empty");
    };
    println!("{}", reply.text);
    if reply.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

async fn extract(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let upload = UploadedFile::from_path(&path).await?;
    let registry = ExtractorRegistry::with_defaults(&config.extraction);

    match extract_upload(&registry, &upload).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}
