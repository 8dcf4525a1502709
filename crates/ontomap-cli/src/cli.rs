//! CLI argument definitions for `ontomap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ontomap",
    version,
    about = "Reconcile biological identifiers against reference vocabularies",
    long_about = "Validate, standardize and search gene, protein, cell type and other \
                  entity names against pinned reference tables.\n\n\
                  References come from a CSV/TSV file (--reference) or from a verified \
                  sources manifest (--entity)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check which terms are valid values of a reference field.
    Inspect(InspectArgs),

    /// Map terms (including synonyms) onto a reference field.
    Standardize(StandardizeArgs),

    /// Rank reference rows by similarity to a free-text term.
    Search(SearchArgs),

    /// List the pinned reference sources.
    Sources(SourcesArgs),
}

/// Where the reference table comes from.
#[derive(Args)]
pub struct ReferenceArgs {
    /// Reference table file (tab separated for .tsv/.tab, comma otherwise).
    #[arg(
        long = "reference",
        value_name = "FILE",
        requires = "id_field",
        required_unless_present = "entity",
        conflicts_with = "entity"
    )]
    pub reference: Option<PathBuf>,

    /// Column of canonical identifiers in the reference file.
    #[arg(long = "id-field", value_name = "FIELD", requires = "reference")]
    pub id_field: Option<String>,

    /// Column of aggregated synonyms in the reference file.
    #[arg(long = "synonyms-field", value_name = "FIELD", requires = "reference")]
    pub synonyms_field: Option<String>,

    /// Separator of multi-valued cells (default: "|").
    #[arg(long = "delimiter", value_name = "SEP", requires = "reference")]
    pub delimiter: Option<String>,

    /// Column loaded as multi-valued cells; repeatable.
    #[arg(long = "list-field", value_name = "FIELD", requires = "reference")]
    pub list_fields: Vec<String>,

    /// Entity registered in the sources manifest (e.g. gene, cell_type).
    #[arg(long = "entity", value_name = "NAME")]
    pub entity: Option<String>,

    /// Source of the entity (default: the manifest's default source).
    #[arg(long = "source", value_name = "NAME", requires = "entity")]
    pub source: Option<String>,

    /// Pinned version of the source (default: the manifest's default entry).
    #[arg(long = "source-version", value_name = "VERSION", requires = "entity")]
    pub source_version: Option<String>,

    /// Sources directory (default: $ONTOMAP_SOURCES_DIR, then ./sources).
    #[arg(long = "sources", value_name = "DIR", requires = "entity")]
    pub sources: Option<PathBuf>,
}

/// Terms to reconcile.
#[derive(Args)]
pub struct QueryArgs {
    #[arg(value_name = "QUERY", required_unless_present = "input")]
    pub queries: Vec<String>,

    /// Read terms from a file, one per line.
    #[arg(
        long = "input",
        short = 'i',
        value_name = "FILE",
        conflicts_with = "queries"
    )]
    pub input: Option<PathBuf>,

    /// Read terms from this column of a CSV/TSV input file.
    #[arg(long = "column", value_name = "NAME", requires = "input")]
    pub column: Option<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub reference: ReferenceArgs,

    #[command(flatten)]
    pub queries: QueryArgs,

    /// Reference field the terms are checked against.
    #[arg(long = "field", short = 'f', value_name = "FIELD")]
    pub field: String,

    /// Compare upper-cased values.
    #[arg(long = "case-insensitive")]
    pub case_insensitive: bool,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct StandardizeArgs {
    #[command(flatten)]
    pub reference: ReferenceArgs,

    #[command(flatten)]
    pub queries: QueryArgs,

    /// Reference field the terms are mapped onto.
    #[arg(long = "field", short = 'f', value_name = "FIELD")]
    pub field: String,

    /// Report this field of matched rows instead of --field.
    #[arg(long = "return-field", value_name = "FIELD")]
    pub return_field: Option<String>,

    /// How synonyms claimed by several rows are resolved.
    #[arg(long = "tie-break", value_enum, default_value = "shortest")]
    pub tie_break: TieBreakArg,

    /// Skip the synonym pass.
    #[arg(long = "no-synonyms")]
    pub no_synonyms: bool,

    /// Compare upper-cased values.
    #[arg(long = "case-insensitive")]
    pub case_insensitive: bool,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Free-text term to search for.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Reference field searched.
    #[arg(long = "field", short = 'f', value_name = "FIELD")]
    pub field: String,

    /// Return at most this many rows.
    #[arg(long = "limit", short = 'n', value_name = "N", default_value_t = 10)]
    pub limit: usize,

    /// Return only the rows tied at the best score.
    #[arg(long = "best", conflicts_with = "limit")]
    pub best: bool,

    #[arg(long = "scorer", value_enum, default_value = "ratio")]
    pub scorer: ScorerArg,

    /// Drop rows scoring below this value (0-100).
    #[arg(long = "min-score", value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Score without folding case.
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Leave synonyms out of the candidate pool.
    #[arg(long = "no-synonyms")]
    pub no_synonyms: bool,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct SourcesArgs {
    /// Sources directory (default: $ONTOMAP_SOURCES_DIR, then ./sources).
    #[arg(long = "sources", value_name = "DIR")]
    pub sources: Option<PathBuf>,

    /// Only list sources of this entity.
    #[arg(long = "entity", value_name = "NAME")]
    pub entity: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TieBreakArg {
    Shortest,
    First,
    Last,
    Unresolved,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScorerArg {
    Ratio,
    JaroWinkler,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
