use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use redline_config::Config;
use redline_engine::{
    Action, CommentSelector, Granularity, DiffReport, build_redline, collect_changes,
    diff_documents, load_document, merge_documents, resolve, save_document, summarize,
};
use redline_engine::revise::ChangeKind;

#[derive(Parser)]
#[command(name = "redline", version, about = "Compare, redline and review word-processing documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two documents and report or redline the differences
    Compare {
        original: PathBuf,
        revised: PathBuf,
        /// Output file; reports print to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = CompareFormat::Markdown)]
        format: CompareFormat,
        #[arg(long, value_enum, default_value_t = GranularityArg::Paragraph)]
        granularity: GranularityArg,
        /// Author stamped on redline markers
        #[arg(long)]
        author: Option<String>,
    },
    /// Inspect or resolve pending tracked changes
    Changes {
        #[command(subcommand)]
        command: ChangesCommand,
    },
    /// Manage comments
    Comments {
        #[command(subcommand)]
        command: CommentsCommand,
    },
    /// Concatenate documents into one
    Merge {
        /// Input documents, merged in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Insert a page break between consecutive documents
        #[arg(long)]
        page_breaks: bool,
    },
}

#[derive(Subcommand)]
enum ChangesCommand {
    /// List pending changes
    List { file: PathBuf },
    /// Summarize pending changes per author
    Summary { file: PathBuf },
    /// Accept pending changes
    Accept {
        file: PathBuf,
        /// Only resolve changes by this author
        #[arg(long)]
        author: Option<String>,
        /// Output file; the input is overwritten when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reject pending changes
    Reject {
        file: PathBuf,
        #[arg(long)]
        author: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CommentsCommand {
    /// List comments with the text they cover
    List { file: PathBuf },
    /// Add a comment anchored on the first occurrence of a text
    Add {
        file: PathBuf,
        /// Text to anchor the comment on
        #[arg(short, long)]
        text: String,
        /// Comment body
        #[arg(short, long)]
        comment: String,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove one comment by ID, or all of them
    Remove {
        file: PathBuf,
        #[arg(long, conflicts_with = "all")]
        id: Option<u32>,
        #[arg(long)]
        all: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export comments as JSON or CSV
    Export {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CompareFormat {
    Markdown,
    Json,
    /// Write a tracked-changes document instead of a report
    Redline,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Paragraph,
    Word,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Paragraph => Granularity::Paragraph,
            GranularityArg::Word => Granularity::Word,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compare {
            original,
            revised,
            output,
            format,
            granularity,
            author,
        } => compare(&original, &revised, output.as_deref(), format, granularity, author),
        Command::Changes { command } => changes(command),
        Command::Comments { command } => comments(command),
        Command::Merge {
            files,
            output,
            page_breaks,
        } => merge(&files, &output, page_breaks),
    }
}

fn compare(
    original_path: &Path,
    revised_path: &Path,
    output: Option<&Path>,
    format: CompareFormat,
    granularity: GranularityArg,
    author: Option<String>,
) -> Result<()> {
    let original = load_document(original_path)?;
    let revised = load_document(revised_path)?;
    let ops = diff_documents(&original, &revised, granularity.into());

    match format {
        CompareFormat::Redline => {
            let Some(output) = output else {
                bail!("--output is required for the redline format");
            };
            let author = resolve_author(author, "Document Compare");
            let redline = build_redline(&original, &ops, &author, Utc::now())?;
            save_document(&redline, output)?;
            println!("Redline written to {}", output.display());
        }
        CompareFormat::Markdown | CompareFormat::Json => {
            let original_name = original_path.display().to_string();
            let revised_name = revised_path.display().to_string();
            let report = DiffReport::new(&original_name, &revised_name, Utc::now(), &ops);
            let rendered = match format {
                CompareFormat::Markdown => report.to_markdown(),
                _ => report.to_json()?,
            };
            emit(output, &rendered)?;
        }
    }
    Ok(())
}

fn changes(command: ChangesCommand) -> Result<()> {
    match command {
        ChangesCommand::List { file } => {
            let doc = load_document(&file)?;
            let changes = collect_changes(&doc);
            if changes.is_empty() {
                println!("No pending changes.");
                return Ok(());
            }
            for change in changes {
                println!(
                    "[{}] {} by {} ({}): {}",
                    change.id,
                    kind_label(change.kind),
                    change.author,
                    change.date.format("%Y-%m-%d"),
                    change.text
                );
            }
        }
        ChangesCommand::Summary { file } => {
            let doc = load_document(&file)?;
            let summary = summarize(&doc);
            println!("Pending changes: {}", summary.total);
            println!("  Insertions:        {}", summary.insertions);
            println!("  Deletions:         {}", summary.deletions);
            println!("  Format changes:    {}", summary.format_changes);
            println!("  Paragraph changes: {}", summary.paragraph_changes);
            println!("  Section changes:   {}", summary.section_changes);
            for (author, group) in &summary.by_author {
                println!("  {}: {} change(s)", author, group.total());
            }
            if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
                println!(
                    "  Dates: {} to {}",
                    earliest.format("%Y-%m-%d"),
                    latest.format("%Y-%m-%d")
                );
            }
        }
        ChangesCommand::Accept {
            file,
            author,
            output,
        } => resolve_and_save(&file, output.as_deref(), Action::Accept, author.as_deref())?,
        ChangesCommand::Reject {
            file,
            author,
            output,
        } => resolve_and_save(&file, output.as_deref(), Action::Reject, author.as_deref())?,
    }
    Ok(())
}

fn resolve_and_save(
    file: &Path,
    output: Option<&Path>,
    action: Action,
    author: Option<&str>,
) -> Result<()> {
    let mut doc = load_document(file)?;
    let resolved = resolve(&mut doc, action, author);
    let target = output.unwrap_or(file);
    save_document(&doc, target)?;
    let verb = match action {
        Action::Accept => "Accepted",
        Action::Reject => "Rejected",
    };
    println!("{verb} {resolved} change(s); saved to {}", target.display());
    Ok(())
}

fn comments(command: CommentsCommand) -> Result<()> {
    match command {
        CommentsCommand::List { file } => {
            let doc = load_document(&file)?;
            let exports = doc.export_comments();
            if exports.is_empty() {
                println!("No comments.");
                return Ok(());
            }
            for comment in exports {
                println!(
                    "[{}] {} ({}): {}",
                    comment.id,
                    comment.author,
                    comment.date.format("%Y-%m-%d"),
                    comment.text
                );
                println!("    on: {}", comment.commented_text);
            }
        }
        CommentsCommand::Add {
            file,
            text,
            comment,
            author,
            output,
        } => {
            let mut doc = load_document(&file)?;
            let author = resolve_author(author, "Review Bot");
            let id = doc.add_comment(&text, &comment, &author, Utc::now())?;
            let target = output.as_deref().unwrap_or(&file);
            save_document(&doc, target)?;
            println!("Added comment {id}; saved to {}", target.display());
        }
        CommentsCommand::Remove {
            file,
            id,
            all,
            output,
        } => {
            let selector = match (id, all) {
                (Some(id), _) => CommentSelector::Id(id),
                (None, true) => CommentSelector::All,
                (None, false) => bail!("pass --id <ID> or --all"),
            };
            let mut doc = load_document(&file)?;
            let removed = doc.remove_comments(selector)?;
            let target = output.as_deref().unwrap_or(&file);
            save_document(&doc, target)?;
            println!("Removed {removed} comment(s); saved to {}", target.display());
        }
        CommentsCommand::Export {
            file,
            format,
            output,
        } => {
            let doc = load_document(&file)?;
            let exports = doc.export_comments();
            let rendered = match format {
                ExportFormat::Json => serde_json::to_string_pretty(&exports)?,
                ExportFormat::Csv => comments_csv(&exports),
            };
            emit(output.as_deref(), &rendered)?;
        }
    }
    Ok(())
}

fn merge(files: &[PathBuf], output: &Path, page_breaks: bool) -> Result<()> {
    let mut docs = Vec::with_capacity(files.len());
    for file in files {
        docs.push(load_document(file)?);
    }
    let merged = merge_documents(&docs, page_breaks)?;
    save_document(&merged, output)?;
    println!(
        "Merged {} document(s) into {}",
        files.len(),
        output.display()
    );
    Ok(())
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

fn comments_csv(exports: &[redline_engine::CommentExport]) -> String {
    let mut lines = vec!["id,author,initials,date,text,commented_text".to_string()];
    for comment in exports {
        lines.push(
            [
                comment.id.to_string(),
                csv_field(&comment.author),
                csv_field(&comment.initials),
                comment.date.format("%Y-%m-%d %H:%M").to_string(),
                csv_field(&comment.text),
                csv_field(&comment.commented_text),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn kind_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Insertion => "insertion",
        ChangeKind::Deletion => "deletion",
        ChangeKind::FormatChange => "format change",
        ChangeKind::ParagraphChange => "paragraph change",
        ChangeKind::SectionChange => "section change",
    }
}

/// Author precedence: flag, then config file, then the built-in default.
fn resolve_author(flag: Option<String>, default: &str) -> String {
    if let Some(author) = flag {
        return author;
    }
    match Config::load() {
        Ok(Some(config)) => config.author.unwrap_or_else(|| default.to_string()),
        Ok(None) => default.to_string(),
        Err(err) => {
            log::warn!("ignoring unreadable config file: {err}");
            default.to_string()
        }
    }
}

fn emit(output: Option<&Path>, rendered: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
