//! Indented text output.
//!
//! Every printed line is laid out as
//!
//! ```text
//! [DWARF columns][flag column][line number][tree indent]{Kind} ...
//! ```
//!
//! Attribute lines of an object follow it, indented past the columns and the
//! tree indent. Column widths are measured over the whole view so split files
//! line up with the combined output.

use std::fmt::Write as _;

use crate::diagnostics::name_or_hex;
use crate::model::{
    AuxForm, BlockForm, Detail, LogicalObject, LogicalView, ObjectId, ObjectKind, SourceFile, TemplateParam,
};
use crate::select::{Entry, Selection};
use crate::settings::{ShowOption, ViewSettings};

use super::{using_kind, using_name};

/// Tree indent per depth level.
const INDENT: usize = 2;
const MIN_LEVEL_WIDTH: usize = 3;

/// Render the whole selection, header included.
pub fn render_text(view: &LogicalView, selection: &Selection, settings: &ViewSettings) -> String
{
    let mut renderer = TextRenderer::new(view, settings);
    let mut out = renderer.header();
    renderer.render(selection.entries(), &mut out);
    out
}

#[derive(Debug, Clone, Copy)]
struct Widths
{
    line: usize,
    level: usize,
    tag: usize,
    /// DWARF and flag columns together.
    attributes: usize,
}

/// Stateful text renderer; remembers the last announced source file across
/// calls, so rendering compile units one at a time matches a single pass.
pub struct TextRenderer<'a>
{
    view: &'a LogicalView,
    settings: &'a ViewSettings,
    widths: Widths,
    current_file: Option<String>,
}

impl<'a> TextRenderer<'a>
{
    pub fn new(view: &'a LogicalView, settings: &'a ViewSettings) -> Self
    {
        let mut max_line = 0;
        let mut max_level = 0;
        let mut tag = 0;
        for object in view.objects() {
            max_line = max_line.max(object.line);
            max_level = max_level.max(object.level);
            if let Some(name) = object.tag.map(|t| name_or_hex(t.static_string(), t.0)) {
                tag = tag.max(name.len());
            }
        }

        let mut renderer = Self {
            view,
            settings,
            widths: Widths {
                line: max_line.to_string().len(),
                level: max_level.to_string().len().max(MIN_LEVEL_WIDTH),
                tag,
                attributes: 0,
            },
            current_file: None,
        };
        let root = view.get(view.root());
        renderer.widths.attributes = renderer.dwarf_columns(root).len() + renderer.flag_column(root).len();
        renderer
    }

    /// `{InputFile} "<path>"`, aligned with the object text of the columns.
    pub fn header(&self) -> String
    {
        format!(
            "{}{{InputFile}} \"{}\"\n",
            " ".repeat(self.widths.attributes),
            self.view.input_file()
        )
    }

    pub fn render(&mut self, entries: &[Entry], out: &mut String)
    {
        for entry in entries {
            self.render_entry(*entry, out);
        }
    }

    fn render_entry(&mut self, entry: Entry, out: &mut String)
    {
        let view = self.view;
        let object = view.get(entry.id);

        if let SourceFile::Path(path) = &object.file {
            if self.current_file.as_deref() != Some(path.as_str()) {
                self.current_file = Some(path.clone());
                let name = object.file.display_name().unwrap_or_default();
                let _ = write!(out, "\n{}{{Source}} \"{name}\"\n", " ".repeat(self.widths.attributes));
            }
        }

        let line = if object.line == 0 && !self.settings.shows(ShowOption::Zero) {
            " ".to_string()
        } else {
            object.line.to_string()
        };
        let depth = if self.settings.shows(ShowOption::Indent) { entry.depth } else { 1 };
        let tree_indent = INDENT * depth;

        let text = self.object_text(entry.id);
        let mut lines = text.iter();
        if let Some(first) = lines.next() {
            let _ = writeln!(
                out,
                "{}{}{line:>width$}{}{first}",
                self.dwarf_columns(object),
                self.flag_column(object),
                " ".repeat(tree_indent),
                width = self.widths.line
            );
        }
        let following = " ".repeat(self.widths.attributes + self.widths.line + tree_indent);
        for rest in lines {
            let _ = writeln!(out, "{following}{rest}");
        }
    }

    fn dwarf_columns(&self, object: &LogicalObject) -> String
    {
        let mut columns = String::new();
        if self.settings.shows(ShowOption::DwarfOffset) {
            let _ = write!(columns, "[0x{:08x}]", object.offset);
        }
        if self.settings.shows(ShowOption::DwarfParent) {
            match object.parent {
                Some(parent) => {
                    let _ = write!(columns, "[0x{:08x}]", self.view.get(parent).offset);
                }
                None => {
                    let _ = write!(columns, "[{}]", " ".repeat(10));
                }
            }
        }
        if self.settings.shows(ShowOption::Level) {
            let _ = write!(columns, "{:0width$} ", object.level, width = self.widths.level);
        }
        if self.settings.shows(ShowOption::DwarfTag) {
            let name = object
                .tag
                .map(|tag| name_or_hex(tag.static_string(), tag.0))
                .unwrap_or_default();
            let _ = write!(columns, "{:<width$}", format!("[{name}]"), width = self.widths.tag + 2);
        }
        if !columns.is_empty() {
            columns.push_str("  ");
        }
        columns
    }

    fn flag_column(&self, object: &LogicalObject) -> &'static str
    {
        match (self.settings.shows(ShowOption::Global), object.is_global) {
            (false, _) => "",
            (true, true) => "X ",
            (true, false) => "  ",
        }
    }

    /// The object text: its first line followed by attribute lines.
    pub fn object_text(&self, id: ObjectId) -> Vec<String>
    {
        let object = self.view.get(id);
        let mut lines = match object.kind {
            ObjectKind::InputFile => vec![format!("{{InputFile}} \"{}\"", object.name)],
            ObjectKind::CompileUnit => vec![format!("{{CompileUnit}} \"{}\"", object.name)],
            ObjectKind::Namespace => {
                let path = self.view.scope_path(id);
                if path.is_empty() {
                    vec!["{Namespace}".to_string()]
                } else {
                    vec![format!("{{Namespace}} \"{path}\"")]
                }
            }
            ObjectKind::Class | ObjectKind::Struct | ObjectKind::Union => self.aggregate_text(id),
            ObjectKind::Enum => self.enum_text(id),
            ObjectKind::Alias => vec![self.alias_text(id)],
            ObjectKind::Function => self.function_text(id),
            ObjectKind::Parameter | ObjectKind::Variable | ObjectKind::Member => vec![self.symbol_text(id)],
            ObjectKind::TemplateParameter => self.template_parameter_text(id),
            ObjectKind::Using => vec![self.using_text(id)],
            ObjectKind::Block => self.block_text(object),
            ObjectKind::PrimitiveType => {
                let mut lines = vec![format!("{{PrimitiveType}} -> \"{}\"", object.name)];
                if let Detail::PrimitiveType { byte_size } = object.detail {
                    if byte_size > 0 {
                        lines.push(attribute(&format!("{byte_size} bytes")));
                    }
                }
                lines
            }
            ObjectKind::CodeLine => self.code_line_text(object),
            ObjectKind::Auxiliary => vec![String::new()],
        };
        if object.is_generated && self.settings.shows(ShowOption::Generated) {
            lines.push(attribute("Generated"));
        }
        lines
    }

    fn aggregate_text(&self, id: ObjectId) -> Vec<String>
    {
        let object = self.view.get(id);
        let mut lines = vec![format!("{{{}}} \"{}\"", object.kind, object.name)];
        if object.is_template {
            lines.push(attribute("Template"));
        }
        let in_class = object.kind == ObjectKind::Class;
        for base in self.view.aux_children(id, AuxForm::Inheritance) {
            let access = self.view.get(base).access().effective(in_class);
            let parent = self
                .view
                .type_of(base)
                .map_or_else(|| "void".to_string(), |ty| ty.name.clone());
            lines.push(attribute(&format!("{access} \"{parent}\"")));
        }
        lines
    }

    fn enum_text(&self, id: ObjectId) -> Vec<String>
    {
        let object = self.view.get(id);
        let mut first = "{Enum}".to_string();
        if matches!(object.detail, Detail::Enum { is_class: true }) {
            first.push_str(" class");
        }
        let _ = write!(first, " \"{}\"", object.name);
        if let Some(ty) = self.view.type_of(id) {
            if ty.name != object.name {
                let _ = write!(first, " -> {}\"{}\"", self.type_offset(object.type_id), ty.name);
            }
        }

        let mut lines = vec![first];
        for enumerator in self.view.aux_children(id, AuxForm::Enumerator) {
            let enumerator = self.view.get(enumerator);
            let value = match &enumerator.detail {
                Detail::Enumerator { value } => value.as_str(),
                _ => "",
            };
            let mut line = format!("\"{}\" = {value}", enumerator.name);
            if self.settings.shows(ShowOption::DwarfOffset) {
                let _ = write!(line, " [0x{:08x}]", enumerator.offset);
            }
            lines.push(attribute(&line));
        }
        lines
    }

    fn alias_text(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        let target = if object.tag == Some(gimli::DW_TAG_template_alias) {
            self.typed(id, true, self.void())
        } else {
            self.typed(id, false, "")
        };
        format!("{{Alias}} \"{}\" -> {target}", object.name)
    }

    fn function_text(&self, id: ObjectId) -> Vec<String>
    {
        let object = self.view.get(id);
        let info = object.function().copied().unwrap_or_default();

        let mut first = "{Function}".to_string();
        if info.is_static {
            first.push_str(" static");
        }
        if info.is_inline {
            first.push_str(" inline");
        }
        let _ = write!(
            first,
            " \"{}\" -> {}",
            self.view.scope_path(id),
            self.typed(id, true, self.void())
        );

        let mut lines = vec![first];
        let declaration = object
            .reference_id
            .map(|reference| self.view.get(reference))
            .filter(|reference| reference.kind == ObjectKind::Function);
        if let Some(declaration) = declaration {
            let file = declaration.file.display_name().unwrap_or_else(|| "?".to_string());
            lines.push(attribute(&format!("Declaration @ {file},{}", declaration.line)));
        } else if !info.is_declaration {
            lines.push(attribute("No declaration"));
        }
        if object.is_template {
            lines.push(attribute("Template"));
        }
        if info.is_inlined {
            lines.push(attribute("Inlined"));
        }
        if info.is_declaration {
            lines.push(attribute("Is declaration"));
        }
        lines
    }

    fn symbol_text(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        let mut text = format!("{{{}}}", object.kind);
        if object.kind == ObjectKind::Member {
            let in_class = object
                .parent
                .is_some_and(|parent| self.view.get(parent).kind == ObjectKind::Class);
            text.push(' ');
            text.push_str(object.access().effective(in_class));
        }
        if object.is_static() {
            text.push_str(" static");
        }
        if object.is_variadic() {
            text.push_str(" \"...\"");
            return text;
        }

        let arrow = if self.view.parent_is_template(id) { "<-" } else { "->" };
        let _ = write!(
            text,
            " \"{}\" {arrow} {}",
            self.symbol_name(object),
            self.typed(id, true, self.void())
        );
        text
    }

    /// `qualifier + name`, with the enclosing scope path under `show-qualified`.
    fn symbol_name(&self, object: &LogicalObject) -> String
    {
        if object.qualifier.is_empty() && self.settings.shows(ShowOption::Qualified) {
            let path = object.parent.map(|parent| self.view.scope_path(parent)).unwrap_or_default();
            if !path.is_empty() {
                return format!("{path}::{}", object.name);
            }
        }
        object.qualified_name()
    }

    fn template_parameter_text(&self, id: ObjectId) -> Vec<String>
    {
        let object = self.view.get(id);
        let name = format!("{{TemplateParameter}} \"{}\"", object.qualified_name());
        if object.is_pack() {
            let mut lines = vec![name];
            for &member in &object.children {
                if let Some(argument) = self.template_argument(member) {
                    lines.push(format!("    <- {argument}"));
                }
            }
            return lines;
        }
        match self.template_argument(id) {
            Some(argument) => vec![format!("{name} <- {argument}")],
            None => vec![name],
        }
    }

    fn template_argument(&self, id: ObjectId) -> Option<String>
    {
        let object = self.view.get(id);
        let offset = self.type_offset(object.type_id);
        match object.template_param()? {
            TemplateParam::Type => Some(self.typed(id, true, self.void())),
            TemplateParam::Value(value) => Some(format!("{offset}{}", value.as_deref().unwrap_or_default())),
            TemplateParam::Template(name) => Some(format!("{offset}\"{}\"", name.as_deref().unwrap_or_default())),
            TemplateParam::Pack => None,
        }
    }

    fn using_text(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        let mut text = format!("{{Using}}{}", self.type_offset(object.type_id));
        if let Some(kind) = using_kind(self.view, id) {
            text.push(' ');
            text.push_str(kind);
        }
        let _ = write!(text, " \"{}\"", using_name(self.view, id));
        text
    }

    fn block_text(&self, object: &LogicalObject) -> Vec<String>
    {
        let mut lines = vec!["{Block}".to_string()];
        if self.settings.shows(ShowOption::BlockAttributes) {
            match object.detail {
                Detail::Block(BlockForm::Try) => lines.push(attribute("try")),
                Detail::Block(BlockForm::Catch) => lines.push(attribute("catch")),
                _ => {}
            }
        }
        lines
    }

    fn code_line_text(&self, object: &LogicalObject) -> Vec<String>
    {
        let mut lines = vec!["{CodeLine}".to_string()];
        if let (true, Detail::CodeLine(flags)) =
            (self.settings.shows(ShowOption::CodelineAttributes), &object.detail)
        {
            let attributes = [
                (flags.new_statement, "NewStatement"),
                (flags.prologue_end, "PrologueEnd"),
                (flags.end_sequence, "EndSequence"),
                (flags.basic_block, "BasicBlock"),
                (flags.discriminator != 0, "Discriminator"),
                (flags.epilogue_begin, "EpilogueBegin"),
            ];
            lines.extend(attributes.iter().filter(|(on, _)| *on).map(|(_, name)| attribute(name)));
        }
        lines
    }

    fn void(&self) -> &'static str
    {
        if self.settings.shows(ShowOption::Void) { "void" } else { "" }
    }

    /// `[0x%08x]` of a type under `show-DWARF-offset`, else nothing.
    fn type_offset(&self, ty: Option<ObjectId>) -> String
    {
        if self.settings.shows(ShowOption::DwarfOffset) {
            format!("[0x{:08x}]", ty.map_or(0, |ty| self.view.get(ty).offset))
        } else {
            String::new()
        }
    }

    /// The type of `id`, following typedefs under `show-underlying`.
    fn resolved_type(&self, id: ObjectId) -> Option<ObjectId>
    {
        let mut ty = self.view.get(id).type_id;
        if !self.settings.shows(ShowOption::Underlying) {
            return ty;
        }
        // Bounded so a typedef cycle cannot spin forever.
        for _ in 0..self.view.len() {
            match ty.map(|current| self.view.get(current)) {
                Some(alias) if alias.kind == ObjectKind::Alias && alias.type_id.is_some() => ty = alias.type_id,
                _ => break,
            }
        }
        ty
    }

    /// `[offset]"<type>"`, with `default` standing in for a missing type.
    fn typed(&self, id: ObjectId, qualified: bool, default: &str) -> String
    {
        let ty = self.resolved_type(id);
        let name = match ty.map(|ty| self.view.get(ty)) {
            Some(ty) if qualified => ty.qualified_name(),
            Some(ty) => ty.name.clone(),
            None => default.to_string(),
        };
        format!("{}\"{name}\"", self.type_offset(ty))
    }
}

fn attribute(text: &str) -> String
{
    format!("    - {text}")
}
