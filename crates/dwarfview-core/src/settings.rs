//! # View Settings
//!
//! The read-only option set threaded through the builder, selection, ordering
//! and renderers.
//!
//! Settings are mutated only while the command line is processed. The
//! `show-*` options are applied in command-line order through
//! [`ViewSettings::apply`], so a later option always overrides an earlier one.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;

use crate::error::{Result, ViewError};

/// Every `--show-X` / `--no-show-X` toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowOption
{
    Alias,
    Block,
    BlockAttributes,
    Class,
    Codeline,
    CodelineAttributes,
    Combined,
    DwarfOffset,
    DwarfParent,
    DwarfTag,
    Enum,
    Function,
    Generated,
    Global,
    Indent,
    Level,
    Member,
    Namespace,
    OnlyGlobals,
    OnlyLocals,
    Parameter,
    PrimitiveType,
    Qualified,
    Struct,
    Template,
    Underlying,
    Union,
    Using,
    Variable,
    Void,
    Zero,
}

impl ShowOption
{
    pub const ALL: [ShowOption; 31] = [
        ShowOption::Alias,
        ShowOption::Block,
        ShowOption::BlockAttributes,
        ShowOption::Class,
        ShowOption::Codeline,
        ShowOption::CodelineAttributes,
        ShowOption::Combined,
        ShowOption::DwarfOffset,
        ShowOption::DwarfParent,
        ShowOption::DwarfTag,
        ShowOption::Enum,
        ShowOption::Function,
        ShowOption::Generated,
        ShowOption::Global,
        ShowOption::Indent,
        ShowOption::Level,
        ShowOption::Member,
        ShowOption::Namespace,
        ShowOption::OnlyGlobals,
        ShowOption::OnlyLocals,
        ShowOption::Parameter,
        ShowOption::PrimitiveType,
        ShowOption::Qualified,
        ShowOption::Struct,
        ShowOption::Template,
        ShowOption::Underlying,
        ShowOption::Union,
        ShowOption::Using,
        ShowOption::Variable,
        ShowOption::Void,
        ShowOption::Zero,
    ];

    /// The option suffix as spelled on the command line (`--show-<suffix>`).
    pub const fn suffix(self) -> &'static str
    {
        match self {
            ShowOption::Alias => "alias",
            ShowOption::Block => "block",
            ShowOption::BlockAttributes => "block-attributes",
            ShowOption::Class => "class",
            ShowOption::Codeline => "codeline",
            ShowOption::CodelineAttributes => "codeline-attributes",
            ShowOption::Combined => "combined",
            ShowOption::DwarfOffset => "DWARF-offset",
            ShowOption::DwarfParent => "DWARF-parent",
            ShowOption::DwarfTag => "DWARF-tag",
            ShowOption::Enum => "enum",
            ShowOption::Function => "function",
            ShowOption::Generated => "generated",
            ShowOption::Global => "global",
            ShowOption::Indent => "indent",
            ShowOption::Level => "level",
            ShowOption::Member => "member",
            ShowOption::Namespace => "namespace",
            ShowOption::OnlyGlobals => "only-globals",
            ShowOption::OnlyLocals => "only-locals",
            ShowOption::Parameter => "parameter",
            ShowOption::PrimitiveType => "primitivetype",
            ShowOption::Qualified => "qualified",
            ShowOption::Struct => "struct",
            ShowOption::Template => "template",
            ShowOption::Underlying => "underlying",
            ShowOption::Union => "union",
            ShowOption::Using => "using",
            ShowOption::Variable => "variable",
            ShowOption::Void => "void",
            ShowOption::Zero => "zero",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self>
    {
        Self::ALL.iter().copied().find(|option| option.suffix() == suffix)
    }

    /// Whether `show-all` / `show-brief` / `show-none` touch this option.
    pub const fn is_kind_option(self) -> bool
    {
        matches!(
            self,
            ShowOption::Alias
                | ShowOption::Block
                | ShowOption::BlockAttributes
                | ShowOption::Class
                | ShowOption::Enum
                | ShowOption::Function
                | ShowOption::Member
                | ShowOption::Namespace
                | ShowOption::Parameter
                | ShowOption::PrimitiveType
                | ShowOption::Struct
                | ShowOption::Template
                | ShowOption::Union
                | ShowOption::Using
                | ShowOption::Variable
        )
    }
}

/// Current value of every show toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowFlags
{
    enabled: [bool; ShowOption::ALL.len()],
}

impl ShowFlags
{
    // `ShowOption::ALL` lists the variants in declaration order.
    pub fn get(&self, option: ShowOption) -> bool
    {
        self.enabled[option as usize]
    }

    pub fn set(&mut self, option: ShowOption, on: bool)
    {
        self.enabled[option as usize] = on;
    }
}

impl Default for ShowFlags
{
    fn default() -> Self
    {
        let mut flags = Self {
            enabled: [false; ShowOption::ALL.len()],
        };
        flags.set(ShowOption::Indent, true);
        flags.set(ShowOption::Void, true);
        for option in ShowOption::ALL {
            if option.is_kind_option() {
                flags.set(option, brief_default(option));
            }
        }
        flags
    }
}

fn brief_default(option: ShowOption) -> bool
{
    !matches!(option, ShowOption::BlockAttributes | ShowOption::PrimitiveType)
}

/// One command-line instruction affecting the show flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowAction
{
    All,
    Brief,
    None,
    Set(ShowOption, bool),
}

/// Sibling ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey
{
    #[default]
    Line,
    Name,
    Offset,
}

impl FromStr for SortKey
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        match s {
            "line" => Ok(SortKey::Line),
            "name" => Ok(SortKey::Name),
            "offset" => Ok(SortKey::Offset),
            other => Err(format!("unknown sort key '{other}' (expected line, name or offset)")),
        }
    }
}

/// Output renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat
{
    Text,
    Yaml,
}

impl OutputFormat
{
    /// Extension used for split output files.
    pub const fn extension(self) -> &'static str
    {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for OutputFormat
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        match s {
            "text" => Ok(OutputFormat::Text),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}' (expected text or yaml)")),
        }
    }
}

impl fmt::Display for OutputFormat
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Yaml => "yaml",
        })
    }
}

/// Compiled name filters.
///
/// `filter`/`tree` patterns are regular expressions matched against the whole
/// name; the `-any` variants are plain substring tests.
#[derive(Debug, Clone, Default)]
pub struct Filters
{
    exact: Vec<Regex>,
    any: Vec<String>,
    tree_exact: Vec<Regex>,
    tree_any: Vec<String>,
}

fn compile(pattern: &str) -> Result<Regex>
{
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ViewError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

impl Filters
{
    /// ## Errors
    ///
    /// [`ViewError::InvalidRegex`] when `pattern` does not compile.
    pub fn add_filter(&mut self, pattern: &str) -> Result<()>
    {
        self.exact.push(compile(pattern)?);
        Ok(())
    }

    pub fn add_filter_any(&mut self, pattern: &str)
    {
        self.any.push(pattern.to_string());
    }

    /// ## Errors
    ///
    /// [`ViewError::InvalidRegex`] when `pattern` does not compile.
    pub fn add_tree(&mut self, pattern: &str) -> Result<()>
    {
        self.tree_exact.push(compile(pattern)?);
        Ok(())
    }

    pub fn add_tree_any(&mut self, pattern: &str)
    {
        self.tree_any.push(pattern.to_string());
    }

    pub fn is_active(&self) -> bool
    {
        !(self.exact.is_empty() && self.any.is_empty()) || self.has_tree()
    }

    pub fn has_tree(&self) -> bool
    {
        !(self.tree_exact.is_empty() && self.tree_any.is_empty())
    }

    pub fn matches(&self, name: &str) -> bool
    {
        self.exact.iter().any(|re| re.is_match(name)) || self.any.iter().any(|s| name.contains(s.as_str()))
    }

    pub fn matches_tree(&self, name: &str) -> bool
    {
        self.tree_exact.iter().any(|re| re.is_match(name)) || self.tree_any.iter().any(|s| name.contains(s.as_str()))
    }
}

/// Process-wide options for one run.
#[derive(Debug, Clone)]
pub struct ViewSettings
{
    pub show: ShowFlags,
    pub sort: SortKey,
    pub filters: Filters,
    pub outputs: Vec<OutputFormat>,
    /// Split output into one file per compile unit.
    pub split: bool,
    /// Split directory; derived from the input name when `None`.
    pub output_dir: Option<PathBuf>,
    pub quiet: bool,
    pub summary: bool,
}

impl Default for ViewSettings
{
    fn default() -> Self
    {
        Self {
            show: ShowFlags::default(),
            sort: SortKey::default(),
            filters: Filters::default(),
            outputs: vec![OutputFormat::Text],
            split: false,
            output_dir: None,
            quiet: false,
            summary: false,
        }
    }
}

impl ViewSettings
{
    pub fn shows(&self, option: ShowOption) -> bool
    {
        self.show.get(option)
    }

    pub fn set(&mut self, option: ShowOption, on: bool)
    {
        self.show.set(option, on);
    }

    fn set_kinds(&mut self, value: impl Fn(ShowOption) -> bool)
    {
        for option in ShowOption::ALL {
            if option.is_kind_option() {
                self.show.set(option, value(option));
            }
        }
    }

    pub fn show_brief(&mut self)
    {
        self.set_kinds(brief_default);
    }

    pub fn show_all(&mut self)
    {
        self.set_kinds(|_| true);
    }

    pub fn show_none(&mut self)
    {
        self.set_kinds(|_| false);
    }

    /// Apply one show instruction.
    pub fn apply(&mut self, action: ShowAction)
    {
        match action {
            ShowAction::All => self.show_all(),
            ShowAction::Brief => self.show_brief(),
            ShowAction::None => self.show_none(),
            ShowAction::Set(option, on) => self.set(option, on),
        }
    }

    pub fn wants(&self, format: OutputFormat) -> bool
    {
        self.outputs.contains(&format)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults_match_show_brief()
    {
        let settings = ViewSettings::default();
        assert!(settings.shows(ShowOption::Function));
        assert!(settings.shows(ShowOption::Template));
        assert!(!settings.shows(ShowOption::PrimitiveType));
        assert!(!settings.shows(ShowOption::BlockAttributes));
        assert!(settings.shows(ShowOption::Indent));
        assert!(settings.shows(ShowOption::Void));
        assert!(!settings.shows(ShowOption::Codeline));
    }

    #[test]
    fn test_last_action_wins()
    {
        let mut settings = ViewSettings::default();
        settings.apply(ShowAction::None);
        settings.apply(ShowAction::Set(ShowOption::Member, true));
        assert!(settings.shows(ShowOption::Member));
        assert!(!settings.shows(ShowOption::Class));

        settings.apply(ShowAction::All);
        settings.apply(ShowAction::Set(ShowOption::Class, false));
        assert!(settings.shows(ShowOption::PrimitiveType));
        assert!(!settings.shows(ShowOption::Class));
    }

    #[test]
    fn test_group_actions_leave_advanced_flags_alone()
    {
        let mut settings = ViewSettings::default();
        settings.apply(ShowAction::Set(ShowOption::Level, true));
        settings.apply(ShowAction::None);
        assert!(settings.shows(ShowOption::Level));
        assert!(settings.shows(ShowOption::Indent));
        settings.apply(ShowAction::All);
        assert!(!settings.shows(ShowOption::Codeline));
    }

    #[test]
    fn test_suffix_round_trip()
    {
        for option in ShowOption::ALL {
            assert_eq!(ShowOption::from_suffix(option.suffix()), Some(option));
        }
        assert_eq!(ShowOption::from_suffix("dwarf-offset"), None);
    }

    #[test]
    fn test_filters_match_whole_name_or_substring()
    {
        let mut filters = Filters::default();
        assert!(!filters.is_active());
        filters.add_filter("a").unwrap();
        filters.add_filter_any("oo");
        assert!(filters.is_active());
        assert!(!filters.has_tree());
        assert!(filters.matches("a"));
        assert!(!filters.matches("abc"));
        assert!(filters.matches("foo"));

        filters.add_tree("f.*").unwrap();
        assert!(filters.matches_tree("foo"));
        assert!(!filters.matches_tree("bar"));
    }

    #[test]
    fn test_invalid_regex_is_reported()
    {
        let mut filters = Filters::default();
        let err = filters.add_filter("[").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::CmdInvalidRegex);
    }

    #[test]
    fn test_sort_and_output_parsing()
    {
        assert_eq!("offset".parse::<SortKey>(), Ok(SortKey::Offset));
        assert!("size".parse::<SortKey>().is_err());
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!(OutputFormat::Text.extension(), "txt");
    }
}
