//! Command line parsing.
//!
//! The fixed options are a `clap` derive struct. The per-object
//! `--show-X` / `--no-show-X` toggles are generated from [`ShowOption::ALL`]
//! and, together with `--show-all`, `--show-brief` and `--show-none`, are
//! replayed in command-line order so the last one wins.

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use dwarfview_core::settings::{OutputFormat, ShowAction, ShowOption, SortKey, ViewSettings};
use dwarfview_core::Result;
use dwarfview_utils::LogLevel;

/// Print a logical view of the DWARF debug information in ELF object files.
#[derive(Parser, Debug)]
#[command(name = "dwarfview")]
#[command(version, disable_version_flag = true)]
#[command(about = "Print a logical view of the DWARF debug information in ELF object files", long_about = None)]
pub struct Cli
{
    /// Object files to read
    #[arg(required = true, value_name = "INPUT_FILE")]
    pub inputs: Vec<PathBuf>,

    /// Suppress output to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the summary table
    #[arg(short = 't', long)]
    pub show_summary: bool,

    /// Write each compile unit to its own file, under DIR or a directory
    /// named after the input file
    #[arg(short = 'd', long, value_name = "DIR", num_args = 0..=1, require_equals = true)]
    pub output_dir: Option<Option<PathBuf>>,

    /// Comma separated list of output formats (text, yaml)
    #[arg(long, value_delimiter = ',')]
    pub output: Vec<OutputFormat>,

    /// Key used to order objects within the same scope
    #[arg(long, default_value = "line")]
    pub sort: SortKey,

    /// Only show objects whose name matches this regular expression
    #[arg(long, value_name = "TEXT")]
    pub filter: Vec<String>,

    /// Only show objects with TEXT in their name
    #[arg(long, value_name = "TEXT")]
    pub filter_any: Vec<String>,

    /// Same as --filter, and print the whole subtree of every match
    #[arg(long, value_name = "TEXT")]
    pub tree: Vec<String>,

    /// Same as --filter-any, and print the whole subtree of every match
    #[arg(long, value_name = "TEXT")]
    pub tree_any: Vec<String>,

    /// Print all common objects and attributes
    #[arg(short = 'a', long, action = ArgAction::Count)]
    pub show_all: u8,

    /// Print the default set of objects and attributes
    #[arg(short = 'b', long, action = ArgAction::Count)]
    pub show_brief: u8,

    /// Hide every object; combine with --show-X to pick individual kinds
    #[arg(long, action = ArgAction::Count)]
    pub show_none: u8,

    /// Diagnostic log level; overrides RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// A parsed command line: the derive struct plus the ordered show actions.
#[derive(Debug)]
pub struct Invocation
{
    pub cli: Cli,
    pub show: Vec<ShowAction>,
}

fn show_id(option: ShowOption) -> String
{
    format!("show-{}", option.suffix())
}

fn hide_id(option: ShowOption) -> String
{
    format!("no-show-{}", option.suffix())
}

/// The full command, including `-v/--version` and the generated toggles.
pub fn command() -> clap::Command
{
    let base = Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    );
    ShowOption::ALL.iter().fold(base, |command, &option| {
        command
            .arg(
                Arg::new(show_id(option))
                    .long(show_id(option))
                    .action(ArgAction::Count)
                    .help(format!("Print {}", option.suffix())),
            )
            .arg(
                Arg::new(hide_id(option))
                    .long(hide_id(option))
                    .action(ArgAction::Count)
                    .hide(true),
            )
    })
}

/// ## Errors
///
/// clap's usage error; the caller prints it and exits.
pub fn try_parse_from<I, T>(args: I) -> std::result::Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(Invocation {
        cli,
        show: show_actions(&matches),
    })
}

/// Every show instruction, sorted by command-line position.
fn show_actions(matches: &ArgMatches) -> Vec<ShowAction>
{
    // Counted flags keep only their last index, which is all last-wins needs.
    // Absent flags still report their default value, so only command-line
    // occurrences count.
    let mut actions: Vec<(usize, ShowAction)> = Vec::new();
    let mut collect = |id: &str, action: ShowAction| {
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            return;
        }
        if let Some(indices) = matches.indices_of(id) {
            actions.extend(indices.map(|index| (index, action)));
        }
    };

    collect("show_all", ShowAction::All);
    collect("show_brief", ShowAction::Brief);
    collect("show_none", ShowAction::None);
    for option in ShowOption::ALL {
        collect(&show_id(option), ShowAction::Set(option, true));
        collect(&hide_id(option), ShowAction::Set(option, false));
    }

    actions.sort_by_key(|(index, _)| *index);
    actions.into_iter().map(|(_, action)| action).collect()
}

impl Invocation
{
    /// Build the run's settings.
    ///
    /// ## Errors
    ///
    /// An invalid `--filter` or `--tree` regular expression.
    pub fn settings(&self) -> Result<ViewSettings>
    {
        let cli = &self.cli;
        let mut settings = ViewSettings::default();
        for action in &self.show {
            settings.apply(*action);
        }

        settings.sort = cli.sort;
        for pattern in &cli.filter {
            settings.filters.add_filter(pattern)?;
        }
        for pattern in &cli.filter_any {
            settings.filters.add_filter_any(pattern);
        }
        for pattern in &cli.tree {
            settings.filters.add_tree(pattern)?;
        }
        for pattern in &cli.tree_any {
            settings.filters.add_tree_any(pattern);
        }

        if !cli.output.is_empty() {
            settings.outputs.clear();
            for format in &cli.output {
                if !settings.outputs.contains(format) {
                    settings.outputs.push(*format);
                }
            }
        }
        if let Some(dir) = &cli.output_dir {
            settings.split = true;
            settings.output_dir.clone_from(dir);
        }
        settings.quiet = cli.quiet;
        settings.summary = cli.show_summary;
        Ok(settings)
    }
}
