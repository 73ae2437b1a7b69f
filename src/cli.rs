//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use wallabag_core::{EntryFilter, ExportFormat};

/// Export saved wallabag entries as local documents.
///
/// Without a subcommand, `export` runs with its defaults.
#[derive(Parser, Debug)]
#[command(name = "wallabag-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the JSON config file (url, client_id, client_secret)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Where the OAuth token is cached between runs
    #[arg(long, value_name = "PATH", global = true)]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// The subcommand to run, defaulting to `export`.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Export(ExportArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Export entries into a directory
    Export(ExportArgs),
    /// Print `id<TAB>title` for matching entries
    List(FilterArgs),
    /// Print one entry as JSON
    Show(ShowArgs),
}

/// Filters shared by `export` and `list`.
#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Include entries that are already archived
    #[arg(long)]
    pub include_archived: bool,

    /// Only entries marked as starred
    #[arg(long)]
    pub starred: bool,

    /// Only entries carrying this tag (repeatable; all must match)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

impl FilterArgs {
    /// Query filter sent to the entries listing.
    #[must_use]
    pub fn to_filter(&self) -> EntryFilter {
        let mut filter = EntryFilter::new();
        if !self.include_archived {
            filter = filter.archived(false);
        }
        if self.starred {
            filter = filter.starred(true);
        }
        filter.tags(&self.tags)
    }
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    pub output: PathBuf,

    /// Export format: pdf, epub, mobi, txt, csv, json, xml
    #[arg(short, long, value_name = "FORMAT", default_value = "pdf")]
    pub format: ExportFormat,

    /// Mark exported entries as archived on the server
    #[arg(long)]
    pub archive: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            output: PathBuf::from("out"),
            format: ExportFormat::Pdf,
            archive: false,
            filter: FilterArgs::default(),
        }
    }
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// Entry id
    pub id: u64,
}
