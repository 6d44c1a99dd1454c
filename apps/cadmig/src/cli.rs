//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cadmig",
    version,
    about = "Find and rewrite legacy contract syntax",
    long_about = "Cadmig detects legacy access modifiers, storage calls, capability calls and conformance lists in contract sources, template literals and template records, and rewrites them to the current syntax.\n\nConfiguration precedence: CLI > cadmig.toml > defaults.",
    after_help = "Examples:\n  cadmig check\n  cadmig check contracts/Vault.cdc --output json\n  cadmig fix --diff\n  cadmig migrate --write",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, short, global = true, action = clap::ArgAction::SetTrue, help = "Log migration stages to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current cadmig version.")]
    Version,
    /// List the detection rules
    #[command(
        about = "List rules",
        long_about = "List the active rule catalog: id, severity, whether a fix exists, and the message. Rules disabled in cadmig.toml are left out."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Report legacy syntax
    #[command(
        about = "Report legacy syntax",
        long_about = "Scan contract sources and host documents for legacy syntax. Any finding makes a file invalid unless --allow-legacy is set.",
        after_help = "Examples:\n  cadmig check\n  cadmig check contracts/**/*.cdc --output json"
    )]
    Check {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Report findings without failing")]
        allow_legacy: bool,
        #[arg(help = "Glob patterns overriding configured targets")]
        paths: Vec<String>,
    },
    /// Rewrite legacy syntax in place
    #[command(
        about = "Rewrite legacy syntax",
        long_about = "Apply catalog fixes to contract sources. When --diff or --check is set, write is disabled.",
        after_help = "Examples:\n  cadmig fix --diff\n  cadmig fix --write"
    )]
    Fix {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Write changes to files")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show diffs for changed files (implies write=false)")]
        diff: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if changes would occur (implies write=false)")]
        check: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Glob patterns overriding configured targets")]
        paths: Vec<String>,
    },
    /// Migrate template records
    #[command(
        about = "Migrate template records",
        long_about = "Rewrite and strictly validate the code of JSON template records. A file is written back only when every record in it validates.",
        after_help = "Examples:\n  cadmig migrate\n  cadmig migrate templates/*.json --write"
    )]
    Migrate {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Write migrated records back")]
        write: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Glob patterns overriding configured template files")]
        paths: Vec<String>,
    },
}
