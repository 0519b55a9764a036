mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::diagnostics::{self, DiagnosticCategory, DiagnosticEntry};
use crate::io::document_io::{StreamDocument, load_document, save_document};
use crate::io::lock::FileLock;
use crate::model::config::StreamConfig;
use crate::ops::check;
use crate::ops::history::InitReport;
use crate::ops::stream::ThoughtStream;
use crate::parse::timestamp;

/// Resolved config, shared by every command
pub struct Context {
    pub config_path: PathBuf,
    pub config: StreamConfig,
    pub log_path: PathBuf,
}

impl Context {
    /// Read the config without validating the `[stream]` settings, so a bad
    /// value can still be fixed with `tstream config set`.
    pub fn load(explicit: Option<&str>) -> Result<Self, config_io::ConfigError> {
        let config_path = config_io::resolve_config_path(explicit.map(Path::new));
        let (config, _) = config_io::read_config(&config_path)?;
        let log_path = diagnostics::diagnostics_log_path(&config, &config_path);
        Ok(Context {
            config_path,
            config,
            log_path,
        })
    }

    pub fn stream(&self) -> Result<ThoughtStream, Box<dyn std::error::Error>> {
        ThoughtStream::new(self.config.stream.clone())
            .map_err(|e| format!("invalid [stream] config in {}: {}", self.config_path.display(), e).into())
    }

    /// Forward what an activation found to the diagnostics log.
    pub fn log_report(&self, doc: &StreamDocument, report: &InitReport) {
        diagnostics::log_init_report(&self.log_path, &doc.path, doc.buffer.lines(), report);
    }

    pub fn log_precondition(&self, doc: &StreamDocument, description: &str) {
        diagnostics::log_diagnostic(
            &self.log_path,
            DiagnosticEntry::new(DiagnosticCategory::Precondition, description)
                .field("Document", doc.path.display().to_string()),
        );
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(file), Some(_)) = (&cli.file, &cli.command) {
        return Err(format!(
            "unexpected argument '{}' before the subcommand (use `tstream open FILE` to open a document)",
            file
        )
        .into());
    }
    let json = cli.json;
    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        None => match cli.file {
            Some(file) => cmd_open(&ctx, &file),
            None => Err("no document given (try `tstream --help`)".into()),
        },
        Some(cmd) => match cmd {
            Commands::Open(args) => cmd_open(&ctx, &args.file),
            Commands::Init(args) => cmd_init(&ctx, args, json),
            Commands::Add(args) => cmd_add(&ctx, args, json),
            Commands::List(args) => cmd_list(&ctx, args, json),
            Commands::Check(args) => cmd_check(&ctx, args, json),
            Commands::Diagnostics(args) => cmd_diagnostics(&ctx, args, json),
            Commands::Config(args) => cmd_config(&ctx, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

fn cmd_open(ctx: &Context, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stream = ctx.stream()?;
    crate::tui::run(Path::new(file), stream, &ctx.config.ui, &ctx.log_path)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stream = ctx.stream()?;
    let path = Path::new(&args.file);
    let _lock = FileLock::acquire_default(path)?;

    let mut doc = load_document(path)?;
    doc.require_tag(stream.tag())?;
    let report = match stream.on_document_open(Some(doc.active())) {
        Some(report) => report,
        None => {
            ctx.log_precondition(&doc, "add on a non-markdown document");
            return Err(format!("{} is not a markdown document", path.display()).into());
        }
    };
    ctx.log_report(&doc, &report);

    let outcome = stream.add_thought_at(Some(doc.active()), &args.text, timestamp::now())?;
    diagnostics::log_integrity_warnings(&ctx.log_path, &doc.path, &outcome.warnings);
    save_document(&doc, Some(&ctx.log_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "committed line {} at {}",
            outcome.committed_line + 1,
            outcome.timestamp
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stream = ctx.stream()?;
    let doc = load_document(Path::new(&args.file))?;
    let since = args
        .since
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| format!("invalid --since date '{}', expected YYYY-MM-DD", s))
        })
        .transpose()?;

    let lines = doc.buffer.lines();
    let last = lines.len().saturating_sub(1);
    let thoughts: Vec<_> = stream
        .layout()
        .thoughts(lines)
        .into_iter()
        // The open prompt is not a thought yet
        .filter(|(n, t)| !(*n == last && t.content.is_empty()))
        .filter(|(_, t)| match since {
            Some(date) => t.timestamp.is_some_and(|ts| ts.date() >= date),
            None => true,
        })
        .collect();

    if json {
        let out: Vec<ThoughtJson> = thoughts.iter().map(|(n, t)| ThoughtJson::new(*n, t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (n, t) in &thoughts {
            println!("{}", format_thought(*n, t));
        }
    }
    Ok(())
}

fn cmd_check(ctx: &Context, args: CheckArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stream = ctx.stream()?;
    let doc = load_document(Path::new(&args.file))?;
    let result = check::check_stream(doc.buffer.lines(), &doc.tags(), stream.layout(), stream.tag());

    for err in &result.errors {
        let check::CheckError::MalformedTimestamp { line, prefix } = err;
        diagnostics::log_diagnostic(
            &ctx.log_path,
            DiagnosticEntry::new(DiagnosticCategory::Parse, "timestamp did not parse")
                .field("Document", doc.path.display().to_string())
                .field("Line", (line + 1).to_string())
                .field("Prefix", prefix.clone()),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
    }
    if !result.valid {
        return Err(format!("{} has {} error(s)", args.file, result.errors.len()).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

fn parse_instant(s: &str, flag: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid {} '{}', expected ISO-8601", flag, s))
}

fn cmd_diagnostics(
    ctx: &Context,
    args: DiagnosticsCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        Some(DiagnosticsAction::Path) => {
            println!("{}", ctx.log_path.display());
        }
        Some(DiagnosticsAction::Prune(prune)) => {
            let before = prune
                .before
                .as_deref()
                .map(|s| parse_instant(s, "--before"))
                .transpose()?;
            let removed = diagnostics::prune_diagnostics(&ctx.log_path, before, prune.all)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
            }
        }
        None => {
            let since = args
                .since
                .as_deref()
                .map(|s| parse_instant(s, "--since"))
                .transpose()?;
            let entries =
                diagnostics::read_diagnostics(&ctx.log_path, Some(args.limit.unwrap_or(10)), since);
            if json {
                let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if entries.is_empty() {
                println!("no diagnostics");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_display_markdown());
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(ctx: &Context, args: ConfigCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        Some(ConfigAction::Path) => {
            println!("{}", ctx.config_path.display());
        }
        Some(ConfigAction::Set(set)) => {
            let (_, mut doc) = config_io::read_config(&ctx.config_path)?;
            config_io::set_config_value(&mut doc, &set.key, &set.value)?;
            config_io::write_config(&ctx.config_path, &doc)?;
            println!("{} = {}", set.key, set.value);
        }
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
            }
        }
    }
    Ok(())
}
