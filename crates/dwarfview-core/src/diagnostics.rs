//! User-facing warnings collected while building a logical view.
//!
//! The builder records data anomalies here instead of failing. Each distinct
//! anomaly is reported once per input file; the front end decides how and
//! where to print them.

use std::collections::HashSet;

use gimli::{DwAt, DwForm, DwTag};
use tracing::debug;

/// Render a DWARF constant by name, falling back to `0x%04x`.
pub(crate) fn name_or_hex(name: Option<&'static str>, value: u16) -> String
{
    match name {
        Some(name) => name.to_string(),
        None => format!("0x{value:04x}"),
    }
}

/// Ordered, de-duplicated warnings for one input file.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics
{
    warnings: Vec<String>,
    seen_tags: HashSet<DwTag>,
    seen_forms: HashSet<(DwAt, DwForm)>,
}

impl Diagnostics
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a DIE whose tag the builder does not model.
    pub fn unknown_tag(&mut self, tag: DwTag)
    {
        if self.seen_tags.insert(tag) {
            let name = name_or_hex(tag.static_string(), tag.0);
            self.push(format!("Ignoring unknown/unsupported DWARF tag '{name}'."));
        }
    }

    /// Record an attribute whose form does not carry the expected kind of value.
    pub fn unexpected_form(&mut self, name: DwAt, form: DwForm)
    {
        if self.seen_forms.insert((name, form)) {
            let at = name_or_hex(name.static_string(), name.0);
            let form_name = name_or_hex(form.static_string(), form.0);
            self.push(format!("Ignoring unrecognised DW_AT, DW_FORM combination '{at}', '{form_name}'."));
        }
    }

    /// Record that the input held no compile units at all.
    pub fn no_debug_data(&mut self)
    {
        self.push("No DWARF debug data found.".to_string());
    }

    fn push(&mut self, message: String)
    {
        debug!(warning = %message, "data anomaly");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String]
    {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool
    {
        self.warnings.is_empty()
    }
}
