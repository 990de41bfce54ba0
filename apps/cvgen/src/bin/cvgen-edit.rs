use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cvgen::client::{ApiClient, DEFAULT_API_URL};
use cvgen::editor::{FieldEdit, FileSurface, SyncController, SyncHandle, SyncStatus, QUIET_PERIOD};
use cvgen::generation::keywords::keyword_report;
use cvgen::models::{Document, ResumeDocument};
use cvgen::storage::{
    ExpiringStore, FileBackend, API_KEY_KEY, CV_DATA_KEY, DEFAULT_TTL, JOB_DESCRIPTION_KEY,
};

/// cvgen-edit: generate, edit and download CVs against a cvgen server.
#[derive(Parser)]
#[command(name = "cvgen-edit", version, about)]
struct Cli {
    /// Base URL of the cvgen API.
    #[arg(long, env = "CVGEN_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Directory holding the saved job description, API key and CV draft.
    #[arg(long, env = "CVGEN_STORE_DIR", default_value = ".cvgen", global = true)]
    store_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct JobArgs {
    /// Job description text.
    #[arg(long, conflicts_with = "job_file")]
    job_description: Option<String>,

    /// Read the job description from a file.
    #[arg(long, value_name = "FILE")]
    job_file: Option<PathBuf>,

    /// Gemini API key (falls back to the saved key).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a CV for a job description and save it as the current draft.
    Generate {
        #[command(flatten)]
        job: JobArgs,

        /// Existing CV (PDF) to base the new one on.
        #[arg(long, value_name = "PDF")]
        cv: Option<PathBuf>,
    },

    /// Edit the saved draft interactively with a live PDF preview.
    Edit {
        /// Where preview PDFs are written (default: <store-dir>/previews).
        #[arg(long, value_name = "DIR")]
        preview_dir: Option<PathBuf>,

        /// Quiet period before the preview is regenerated, in milliseconds.
        #[arg(long, default_value_t = QUIET_PERIOD.as_millis() as u64)]
        quiet_ms: u64,
    },

    /// Render the saved draft to a PDF file.
    Download {
        /// Output path (default: cv.pdf).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which recommended keywords the saved draft covers.
    Keywords,

    /// Generate a cover letter for the saved draft and render it.
    CoverLetter {
        #[command(flatten)]
        job: JobArgs,

        /// Output path (default: cover-letter.pdf).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

const EDIT_HELP: &str = "\
commands:
  <field> <value>             name, title, email, location, phone, github, linkedin, age, summary
  remoteWork yes|no
  experience.<n>.<field> <v>  title, company, location, startMonthYear, endMonthYear, description, technologies
  education.<n>.<field> <v>   degree, institution, location, startMonthYear, endMonthYear, details
  add experience|education
  remove experience|education <n>
  show | help | quit
use \\n inside a value for a line break";

type Store = ExpiringStore<FileBackend>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "cvgen=debug" } else { "cvgen=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = FileBackend::open(&cli.store_dir)
        .with_context(|| format!("failed to open store {}", cli.store_dir.display()))?;
    let store = ExpiringStore::new(backend.clone());
    let client = ApiClient::new(cli.api_url.as_str())?;

    match cli.command {
        Commands::Generate { job, cv } => generate(&client, &store, job, cv.as_deref()).await,
        Commands::Edit {
            preview_dir,
            quiet_ms,
        } => {
            let preview_dir = preview_dir.unwrap_or_else(|| cli.store_dir.join("previews"));
            edit(client, backend, preview_dir, Duration::from_millis(quiet_ms)).await
        }
        Commands::Download { output } => {
            let draft = saved_draft(&store)?;
            let rendered = client.render_pdf(&Document::Resume(draft)).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(rendered.filename));
            write_file(&output, &rendered.bytes)
        }
        Commands::Keywords => {
            let draft = saved_draft(&store)?;
            let report = keyword_report(&draft);
            if report.keywords.is_empty() {
                println!("no recommended keywords on this draft");
                return Ok(());
            }
            for keyword in &report.keywords {
                let mark = if keyword.matched { "+" } else { "-" };
                println!("{mark} {}", keyword.keyword);
            }
            println!("coverage: {}%", report.coverage);
            let missing: Vec<&str> = report.missing().collect();
            if !missing.is_empty() {
                println!("missing: {}", missing.join(", "));
            }
            Ok(())
        }
        Commands::CoverLetter { job, output } => {
            let (job_description, api_key) = resolve_job(&store, job)?;
            let cv: Option<ResumeDocument> = store.get(CV_DATA_KEY)?;
            let letter = client
                .generate_cover_letter(&job_description, &api_key, cv.as_ref())
                .await?;
            let rendered = client.render_pdf(&Document::CoverLetter(letter)).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(rendered.filename));
            write_file(&output, &rendered.bytes)
        }
    }
}

async fn generate(client: &ApiClient, store: &Store, job: JobArgs, cv: Option<&Path>) -> Result<()> {
    let (job_description, api_key) = resolve_job(store, job)?;

    let pdf_text = match cv {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("cv.pdf");
            let text = client.extract_pdf(filename, bytes).await?;
            info!("Extracted {} chars from {}", text.len(), path.display());
            Some(text)
        }
        None => None,
    };

    let draft = client
        .generate(&job_description, &api_key, pdf_text.as_deref())
        .await?;
    store.set(CV_DATA_KEY, &draft, DEFAULT_TTL)?;

    println!("generated CV for {} ({})", draft.identity.name, draft.identity.title);
    if let Some(score) = draft.ats_score {
        println!("ATS score: {score}");
    }
    let report = keyword_report(&draft);
    if !report.keywords.is_empty() {
        println!("keyword coverage: {}%", report.coverage);
    }
    Ok(())
}

/// Job description: flag, then file, then the saved one. API key: flag or env,
/// then the saved one. Both are saved again so the TTL restarts.
fn resolve_job(store: &Store, job: JobArgs) -> Result<(String, String)> {
    let job_description = match (job.job_description, job.job_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => store
            .get::<String>(JOB_DESCRIPTION_KEY)?
            .context("no job description given and none saved; pass --job-description or --job-file")?,
    };
    let api_key = match job.api_key {
        Some(key) => key,
        None => store
            .get::<String>(API_KEY_KEY)?
            .context("no API key given and none saved; pass --api-key or set GEMINI_API_KEY")?,
    };

    store.set(JOB_DESCRIPTION_KEY, &job_description, DEFAULT_TTL)?;
    store.set(API_KEY_KEY, &api_key, DEFAULT_TTL)?;
    Ok((job_description, api_key))
}

fn saved_draft(store: &Store) -> Result<ResumeDocument> {
    store
        .get(CV_DATA_KEY)?
        .context("no saved CV (it may have expired); run `cvgen-edit generate` first")
}

async fn edit(
    client: ApiClient,
    backend: FileBackend,
    preview_dir: PathBuf,
    quiet_period: Duration,
) -> Result<()> {
    let surface = FileSurface::new(&preview_dir)?;
    let controller = SyncController::new(Arc::new(client), ExpiringStore::new(backend), surface)
        .with_quiet_period(quiet_period);
    let (handle, draft) = controller.mount()?;

    let Some(mut draft) = draft else {
        handle.teardown().await;
        bail!("no saved CV (it may have expired); run `cvgen-edit generate` first");
    };

    let mut status = handle.subscribe();
    let reporter = tokio::spawn(async move {
        let mut previous = status.borrow_and_update().clone();
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            for notice in status_notices(&previous, &current) {
                eprintln!("{notice}");
            }
            previous = current;
        }
    });

    eprintln!(
        "editing {} (previews in {}); type `help` for commands",
        draft.identity.name,
        preview_dir.display()
    );

    let session = drive_session(handle, BufReader::new(tokio::io::stdin()), &mut draft).await;
    reporter.abort();
    session
}

/// Applies edit commands read from `input` until EOF or `quit`. The session is
/// torn down on every exit path, since the session task releases the preview files.
async fn drive_session<R>(handle: SyncHandle, input: R, draft: &mut ResumeDocument) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let result: Result<()> = async {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match line.trim() {
                "" => continue,
                "quit" | "exit" => break,
                "help" => eprintln!("{EDIT_HELP}"),
                "show" => println!("{}", serde_json::to_string_pretty(&*draft)?),
                command => {
                    match command
                        .parse::<FieldEdit>()
                        .and_then(|edit| edit.apply(draft))
                    {
                        Ok(()) => handle.edit(draft.clone())?,
                        Err(e) => eprintln!("error: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
    .await;

    handle.teardown().await;
    result
}

/// Messages worth printing for a status transition. A render failure is
/// reported once per settled render; the save warning once per failure streak.
fn status_notices(previous: &SyncStatus, current: &SyncStatus) -> Vec<String> {
    let mut notices = Vec::new();
    if let Some(error) = &current.last_error {
        if current.regenerations != previous.regenerations
            || previous.last_error.as_ref() != Some(error)
        {
            notices.push(format!("preview failed: {error} (previous preview kept)"));
        }
    }
    if current.last_save_failed && !previous.last_save_failed {
        notices.push(
            "warning: draft could not be saved; changes are kept in memory".to_string(),
        );
    }
    notices
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvgen::editor::SyncState;
    use cvgen::render::PdfRenderer;
    use cvgen::storage::MemoryBackend;

    fn failed(regenerations: u64, error: &str) -> SyncStatus {
        SyncStatus {
            regenerations,
            last_error: Some(error.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_failure_reported_once_per_render() {
        let idle = SyncStatus::default();
        let first = failed(1, "renderer down");
        assert_eq!(status_notices(&idle, &first).len(), 1);

        // An unrelated transition keeps the old error but reports nothing.
        let pending = SyncStatus {
            state: SyncState::PendingRegen,
            ..first.clone()
        };
        assert!(status_notices(&first, &pending).is_empty());
        let idle_again = SyncStatus {
            state: SyncState::Idle,
            ..first.clone()
        };
        assert!(status_notices(&pending, &idle_again).is_empty());

        // The same failure on the next render is a new event.
        let second = failed(2, "renderer down");
        assert_eq!(status_notices(&idle_again, &second).len(), 1);
    }

    #[test]
    fn test_save_warning_only_when_flag_turns_on() {
        let ok = SyncStatus::default();
        let failing = SyncStatus {
            last_save_failed: true,
            state: SyncState::Regenerating,
            ..Default::default()
        };
        assert_eq!(
            status_notices(&ok, &failing),
            vec!["warning: draft could not be saved; changes are kept in memory".to_string()]
        );

        let still_failing = SyncStatus {
            state: SyncState::Idle,
            regenerations: 1,
            ..failing.clone()
        };
        assert!(status_notices(&failing, &still_failing).is_empty());
        assert!(status_notices(&still_failing, &ok).is_empty());
        assert_eq!(status_notices(&ok, &failing).len(), 1);
    }

    #[tokio::test]
    async fn test_session_tears_down_when_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let handle = SyncController::new(
            Arc::new(PdfRenderer),
            ExpiringStore::new(MemoryBackend::new()),
            FileSurface::new(dir.path()).unwrap(),
        )
        .spawn();
        let mut status = handle.subscribe();

        // The second line is not valid UTF-8, so reading it fails.
        let input: &[u8] = b"name Jane Doe\n\xff\xfe\n";
        let mut draft = ResumeDocument::default();
        let result = drive_session(handle, input, &mut draft).await;

        assert!(result.is_err());
        assert_eq!(draft.identity.name, "Jane Doe");
        // The session task has exited: the status sender is gone.
        while status.changed().await.is_ok() {}
        assert_eq!(status.borrow().state, SyncState::Idle);
    }

    #[tokio::test]
    async fn test_session_tears_down_on_quit() {
        let dir = tempfile::tempdir().unwrap();
        let handle = SyncController::new(
            Arc::new(PdfRenderer),
            ExpiringStore::new(MemoryBackend::new()),
            FileSurface::new(dir.path()).unwrap(),
        )
        .spawn();
        let mut status = handle.subscribe();

        let input: &[u8] = b"summary Rust engineer\nbogus.command x\nquit\nname ignored\n";
        let mut draft = ResumeDocument::default();
        drive_session(handle, input, &mut draft).await.unwrap();

        assert_eq!(draft.summary, "Rust engineer");
        assert_eq!(draft.identity.name, "");
        while status.changed().await.is_ok() {}
    }
}
