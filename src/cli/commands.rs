use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tstream",
    about = concat!("thought-stream v", env!("CARGO_PKG_VERSION"), " - an append-only journal in a plain text note"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Stream document to open in the editor
    pub file: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a stream document in the editor
    Open(OpenArgs),
    /// Create a new stream document
    Init(InitArgs),
    /// Commit a thought without opening the editor
    Add(AddArgs),
    /// List committed thoughts
    List(ListArgs),
    /// Validate a stream document
    Check(CheckArgs),
    /// View or manage the diagnostics log
    Diagnostics(DiagnosticsCmd),
    /// Show or edit the configuration
    Config(ConfigCmd),
}

#[derive(Args)]
pub struct OpenArgs {
    /// Stream document
    pub file: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Path of the new document
    pub file: String,
    /// Activation tag to write (default: from config)
    #[arg(long)]
    pub tag: Option<String>,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Stream document
    pub file: String,
    /// Thought to commit
    pub text: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Stream document
    pub file: String,
    /// Only thoughts on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Stream document
    pub file: String,
}

// ---------------------------------------------------------------------------
// Diagnostics log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct DiagnosticsCmd {
    #[command(subcommand)]
    pub action: Option<DiagnosticsAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum DiagnosticsAction {
    /// Remove old entries
    Prune(DiagnosticsPruneArgs),
    /// Print the absolute path to the diagnostics log
    Path,
}

#[derive(Args)]
pub struct DiagnosticsPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set one key, e.g. `stream.lock_scope prefix`
    Set(ConfigSetArgs),
    /// Print the config file path
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key (stream.*, ui.*, ui.colors.<slot>, diagnostics.path)
    pub key: String,
    pub value: String,
}
