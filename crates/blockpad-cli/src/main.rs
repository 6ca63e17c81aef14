//! blockpad command line.
//!
//! Works on a JSON page snapshot:
//!   blockpad check pages.json
//!   blockpad normalize pages.json -o clean.json
//!   blockpad tree pages.json
//!   blockpad show pages.json Inbox
//!   blockpad move pages.json Drafts Archive --zone inside
//!   blockpad set pages.json Inbox --title "Inbox (old)" --status done --append "follow up"
//!
//! Logs go to stderr; set `RUST_LOG=debug` for engine detail.

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use blockpad_doc::page_tree;
use blockpad_doc::{FocusTarget, TreeZone};
use blockpad_session::{
    EditorCommand, EditorConfig, EditorSession, SessionHandle, SnapshotStore, StoreSink,
};
use blockpad_types::{Page, PageId, PageStatus, resolve_page_prefix};

/// Inspect, repair and script-edit blockpad page snapshots.
#[derive(Parser, Debug)]
#[command(name = "blockpad")]
#[command(about = "Inspect, repair and script-edit blockpad page snapshots")]
struct Args {
    /// Editor configuration (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sanitize a snapshot and report every repair (exit 1 if any)
    Check { snapshot: PathBuf },
    /// Rewrite a snapshot in canonical form
    Normalize {
        snapshot: PathBuf,
        /// Write here instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the page tree
    Tree { snapshot: PathBuf },
    /// Print one page (by title, title prefix, or id prefix)
    Show { snapshot: PathBuf, page: String },
    /// Move a page relative to another
    Move {
        snapshot: PathBuf,
        page: String,
        target: String,
        #[arg(long, value_enum, default_value_t = Zone::Inside)]
        zone: Zone,
    },
    /// Edit a page through an editing session
    Set {
        snapshot: PathBuf,
        page: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// ISO-8601 date
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<PageStatus>,
        /// Type a new block after the last one (as Enter would)
        #[arg(long)]
        append: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Zone {
    Before,
    After,
    Inside,
}

impl From<Zone> for TreeZone {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::Before => TreeZone::Before,
            Zone::After => TreeZone::After,
            Zone::Inside => TreeZone::Inside,
        }
    }
}

fn parse_status(s: &str) -> std::result::Result<PageStatus, String> {
    PageStatus::from_str(s).ok_or_else(|| format!("unknown status '{}' (todo, in-progress, done)", s))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match args.command {
        Command::Check { snapshot } => check(&snapshot),
        Command::Normalize { snapshot, output } => {
            normalize(&snapshot, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Tree { snapshot } => {
            let pages = load(&snapshot)?;
            print!("{}", page_tree::render_outline(&pages));
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { snapshot, page } => {
            let pages = load(&snapshot)?;
            let id = resolve(&pages, &page)?;
            let page = page_tree::find(&pages, &id).context("resolved page vanished")?;
            print!("{}", render::render_page(page));
            Ok(ExitCode::SUCCESS)
        }
        Command::Move {
            snapshot,
            page,
            target,
            zone,
        } => {
            move_page(&snapshot, &page, &target, zone.into())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Set {
            snapshot,
            page,
            title,
            icon,
            due,
            status,
            append,
        } => {
            let edits = Edits {
                title,
                icon,
                due,
                status,
                append,
            };
            set(config, &snapshot, &page, edits).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: &Path) -> Result<Vec<Page>> {
    let sanitized = SnapshotStore::new(path)
        .load()
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(sanitized.pages)
}

fn resolve(pages: &[Page], query: &str) -> Result<PageId> {
    let id = resolve_page_prefix(pages.iter().map(|p| (&p.id, p.title.as_str())), query)?;
    Ok(id)
}

fn check(path: &Path) -> Result<ExitCode> {
    let sanitized = SnapshotStore::new(path)
        .load()
        .with_context(|| format!("reading {}", path.display()))?;
    if sanitized.is_clean() {
        println!("{}: {} pages, clean", path.display(), sanitized.pages.len());
        return Ok(ExitCode::SUCCESS);
    }
    for note in &sanitized.notes {
        println!("{}", note);
    }
    println!(
        "{}: {} pages, {} repairs",
        path.display(),
        sanitized.pages.len(),
        sanitized.notes.len()
    );
    Ok(ExitCode::FAILURE)
}

fn normalize(path: &Path, output: Option<&Path>) -> Result<()> {
    let pages = load(path)?;
    let dest = SnapshotStore::new(output.unwrap_or(path));
    dest.save(&pages)
        .with_context(|| format!("writing {}", dest.path().display()))?;
    info!("wrote {} pages to {}", pages.len(), dest.path().display());
    Ok(())
}

fn move_page(path: &Path, page: &str, target: &str, zone: TreeZone) -> Result<()> {
    let pages = load(path)?;
    let dragged = resolve(&pages, page)?;
    let target = resolve(&pages, target)?;
    let Some(next) = page_tree::move_page(&pages, &dragged, &target, zone) else {
        bail!("cannot move '{}' {} '{}'", page, zone, target.short());
    };
    SnapshotStore::new(path)
        .save(&next)
        .with_context(|| format!("writing {}", path.display()))?;
    print!("{}", page_tree::render_outline(&next));
    Ok(())
}

/// Field edits requested by `set`.
#[derive(Debug)]
struct Edits {
    title: Option<String>,
    icon: Option<String>,
    due: Option<String>,
    status: Option<PageStatus>,
    append: Option<String>,
}

/// Apply edits through a live session so they follow the editor's rules.
async fn set(config: EditorConfig, path: &Path, query: &str, edits: Edits) -> Result<()> {
    let sink = StoreSink::open(SnapshotStore::new(path))
        .with_context(|| format!("reading {}", path.display()))?;
    let id = resolve(sink.pages(), query)?;
    let page = page_tree::find(sink.pages(), &id).cloned();

    let session = EditorSession::spawn(config, sink);
    session.load(page).await?;

    if let Some(title) = edits.title {
        session.dispatch(EditorCommand::SetTitle(title)).await?;
    }
    if let Some(icon) = edits.icon {
        session.dispatch(EditorCommand::SetIcon(Some(icon))).await?;
    }
    if let Some(due) = edits.due {
        session.dispatch(EditorCommand::SetDueDate(Some(due))).await?;
    }
    if let Some(status) = edits.status {
        session.dispatch(EditorCommand::SetStatus(Some(status))).await?;
    }
    if let Some(text) = edits.append {
        append_block(&session, &text).await?;
    }

    session.flush().await?;
    if let Some(page) = session.snapshot().await? {
        print!("{}", render::render_page(&page));
    }
    Ok(())
}

/// Caret to the end of the last block, Enter, type, blur.
async fn append_block(session: &SessionHandle, text: &str) -> Result<()> {
    let page = session.snapshot().await?.context("no page loaded")?;
    let last = page.content.last().context("page has no blocks")?;
    if !last.kind.is_editable() {
        bail!("last block is a {}; cannot append after it by typing", last.kind);
    }

    let last = FocusTarget::Block(last.id.clone());
    session.dispatch(EditorCommand::Focus(last.clone())).await?;
    session.dispatch(EditorCommand::Enter).await?;

    let Some(target) = session.focused().await? else {
        bail!("no block focused after Enter");
    };
    if target == last {
        bail!("Enter did not create a block");
    }
    session
        .dispatch(EditorCommand::Input {
            target,
            text: text.to_string(),
        })
        .await?;
    session.dispatch(EditorCommand::Blur).await?;
    Ok(())
}
