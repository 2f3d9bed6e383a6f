//! # finqa CLI
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `finqa extract <file>` | Print the text a document contributes as context |
//! | `finqa ask <file> "<question>"` | Upload a document and ask one question |
//! | `finqa chat [--file <file>]` | Interactive conversation |
//! | `finqa serve` | Start the HTTP front-end |
//!
//! ## Examples
//!
//! ```bash
//! finqa extract ./reports/q3.pdf
//! finqa ask ./reports/budget.xlsx "What was the total revenue?"
//! finqa chat --file ./reports/q3.pdf --config ./config/finqa.toml
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use finqa::config::{self, Config};
use finqa::extract::{self, Preview};
use finqa::inference::OllamaClient;
use finqa::models::Role;
use finqa::server;
use finqa::session::{Session, UploadReport, EXAMPLE_QUESTIONS};

/// finqa — ask questions about a financial document using a local model.
#[derive(Parser)]
#[command(
    name = "finqa",
    about = "finqa — grounded Q&A over a financial PDF or spreadsheet using a local model",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a document and print its context text.
    Extract {
        /// PDF, XLSX, or XLS file.
        file: PathBuf,
        /// Declared media type. Derived from the file extension when omitted.
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Upload a document and ask a single question.
    Ask {
        file: PathBuf,
        question: String,
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Start an interactive chat session.
    ///
    /// Commands inside the session: `/upload <path>`, `/clear`, `/status`,
    /// `/history`, `/examples`, `/quit`. Any other line is a question.
    Chat {
        /// Document to load before the first question.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Start the HTTP front-end on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finqa=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Extract { file, media_type } => {
            let mut session = new_session(&cfg)?;
            let report = upload_file(&mut session, &file, media_type.as_deref())?;
            print_report(&report);
            println!("--- Text ---");
            if let Some(ctx) = session.snapshot().active_context {
                print!("{}", ctx.text);
            }
        }
        Commands::Ask {
            file,
            question,
            media_type,
        } => {
            let mut session = new_session(&cfg)?;
            upload_file(&mut session, &file, media_type.as_deref())?;
            let answer = session.ask(&question).await?;
            println!("{}", answer);
        }
        Commands::Chat { file, media_type } => {
            let mut session = new_session(&cfg)?;
            if let Some(file) = file {
                match upload_file(&mut session, &file, media_type.as_deref()) {
                    Ok(report) => print_report(&report),
                    Err(e) => eprintln!("{:#}", e),
                }
            }
            run_chat(&mut session).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

fn new_session(cfg: &Config) -> Result<Session> {
    let client = OllamaClient::new(&cfg.llm)?;
    Ok(Session::new(Box::new(client), cfg.upload.clone()))
}

/// Declared media type for a file, from its extension.
fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => extract::MIME_PDF,
        Some("xlsx") => extract::MIME_XLSX,
        Some("xls") => extract::MIME_XLS,
        _ => "application/octet-stream",
    }
}

fn upload_file(
    session: &mut Session,
    path: &Path,
    media_type: Option<&str>,
) -> Result<UploadReport> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let media_type = media_type.unwrap_or_else(|| media_type_for_path(path));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match session.upload(&bytes, media_type, &file_name) {
        Ok(report) => Ok(report),
        Err(e) => bail!("{}: {}", file_name, e),
    }
}

fn print_report(report: &UploadReport) {
    println!("{} document processed successfully!", report.kind);
    println!("file:        {}", report.file_name);
    println!("characters:  {}", report.char_count);
    for w in &report.warnings {
        println!("warning:     sheet '{}' skipped: {}", w.sheet, w.message);
    }
    println!("--- Preview ---");
    match &report.preview {
        Preview::Text { text } => println!("{}", text),
        Preview::Table { sheet, rows } => {
            println!("Sheet: {}", sheet);
            println!("{}", extract::render_table(rows));
        }
    }
}

async fn run_chat(session: &mut Session) -> Result<()> {
    println!("Ask a question about your financial document (/quit to exit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };
        match command {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("Conversation cleared.");
            }
            "/upload" if !arg.is_empty() => match upload_file(session, Path::new(arg), None) {
                Ok(report) => print_report(&report),
                Err(e) => println!("{:#}", e),
            },
            "/upload" => println!("usage: /upload <path>"),
            "/status" => {
                let status = session.status();
                match status.document {
                    Some(doc) => {
                        println!("{} document loaded: {}", doc.kind, doc.file_name);
                        println!("Extracted Text Length: {} characters", doc.char_count);
                    }
                    None => println!("No document uploaded"),
                }
                println!("model: {}  turns: {}", status.model, status.turns);
            }
            "/history" => {
                for turn in session.snapshot().turns {
                    let who = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    println!("[{}] {}: {}", turn.at.format("%H:%M:%S"), who, turn.content);
                }
            }
            "/examples" => {
                for q in EXAMPLE_QUESTIONS {
                    println!("- {}", q);
                }
            }
            _ => {
                let reply = session.reply(line).await;
                println!("{}", reply);
            }
        }
    }
    Ok(())
}
