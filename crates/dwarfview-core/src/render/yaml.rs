//! YAML output.
//!
//! The document is written by hand with a fixed field order so it stays
//! byte-stable: every object carries `object`, `name`, `type`, `source`,
//! `dwarf`, `attributes` and `children`, with `null` for missing values.
//! Filters and show options do not apply; sorting does.

use std::fmt::Write as _;

use crate::diagnostics::name_or_hex;
use crate::model::{AuxForm, BlockForm, Detail, LogicalObject, LogicalView, ObjectId, ObjectKind, TemplateParam};

use super::{using_kind, using_name};

pub const OUTPUT_VERSION: &str = "0.1";

/// Render every compile unit of `view`.
pub fn render_yaml(view: &LogicalView) -> String
{
    let renderer = YamlRenderer::new(view);
    let mut out = renderer.header();
    for id in view.children(view.root()) {
        renderer.render_object(id, 1, &mut out);
    }
    out
}

pub struct YamlRenderer<'a>
{
    view: &'a LogicalView,
}

impl<'a> YamlRenderer<'a>
{
    pub fn new(view: &'a LogicalView) -> Self
    {
        Self { view }
    }

    pub fn header(&self) -> String
    {
        format!(
            "input_file: \"{}\"\noutput_version: \"{OUTPUT_VERSION}\"\nobjects:\n",
            escape(self.view.input_file())
        )
    }

    /// Write `id` and its subtree as a list item at nesting `level` (1 for
    /// compile units).
    pub fn render_object(&self, id: ObjectId, level: usize, out: &mut String)
    {
        let indent = " ".repeat((level * 2 - 1) * 2);
        let body = self.object_body(id);
        for (index, line) in body.lines().enumerate() {
            let marker = if index == 0 { "- " } else { "  " };
            let _ = writeln!(out, "{indent}{marker}{line}");
        }

        let object = self.view.get(id);
        let children: Vec<ObjectId> = self.view.children(id).chain(object.lines.iter().copied()).collect();
        if children.is_empty() {
            let _ = writeln!(out, "{indent}  children: []");
            return;
        }
        let _ = writeln!(out, "{indent}  children:");
        for child in children {
            self.render_object(child, level + 1, out);
        }
    }

    fn object_body(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        match object.kind {
            ObjectKind::PrimitiveType => {
                let size = match object.detail {
                    Detail::PrimitiveType { byte_size } => byte_size,
                    _ => 0,
                };
                let mut body = format!("object: \"PrimitiveType\"\nname: null\ntype: {}\n", quoted(&object.name));
                body.push_str("source:\n  line: null\n  file: null\n");
                self.push_dwarf(object, &mut body);
                let _ = write!(body, "attributes:\n  size: {size}");
                body
            }
            ObjectKind::Using => {
                let mut body = format!(
                    "object: \"Using\"\nname: {}\ntype: null\n",
                    quoted(&using_name(self.view, id))
                );
                self.push_source(object, &mut body);
                self.push_dwarf(object, &mut body);
                let kind = using_kind(self.view, id).map_or_else(|| "null".to_string(), |kind| format!("\"{kind}\""));
                let _ = write!(body, "attributes:\n  using_type: {kind}");
                body
            }
            _ => {
                let mut body = self.common(id);
                body.push_str(&self.attributes(id));
                body
            }
        }
    }

    fn common(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        let name = if object.is_variadic() {
            format!("{}...", object.qualifier)
        } else {
            object.qualified_name()
        };
        let ty = match self.view.type_of(id) {
            Some(ty) if object.kind != ObjectKind::TemplateParameter => quoted(&ty.qualified_name()),
            _ if object.kind == ObjectKind::Function => "\"void\"".to_string(),
            _ => "null".to_string(),
        };

        let mut body = format!("object: \"{}\"\nname: {}\ntype: {ty}\n", object.kind, quoted(&name));
        self.push_source(object, &mut body);
        self.push_dwarf(object, &mut body);
        body
    }

    fn push_source(&self, object: &LogicalObject, body: &mut String)
    {
        let line = if object.line == 0 { "null".to_string() } else { object.line.to_string() };
        let file = object
            .file
            .display_name()
            .map_or_else(|| "null".to_string(), |name| format!("\"{}\"", escape(&name)));
        let _ = write!(body, "source:\n  line: {line}\n  file: {file}\n");
    }

    fn push_dwarf(&self, object: &LogicalObject, body: &mut String)
    {
        let tag = object
            .tag
            .map_or_else(|| "null".to_string(), |tag| format!("\"{}\"", name_or_hex(tag.static_string(), tag.0)));
        let _ = write!(body, "dwarf:\n  offset: 0x{:x}\n  tag: {tag}\n", object.offset);
    }

    fn attributes(&self, id: ObjectId) -> String
    {
        let object = self.view.get(id);
        let mut attrs = String::new();
        match (&object.kind, &object.detail) {
            (ObjectKind::Function, Detail::Function(info)) => {
                let declaration = object
                    .reference_id
                    .map(|reference| self.view.get(reference))
                    .filter(|reference| reference.kind == ObjectKind::Function);
                match declaration {
                    Some(declaration) => {
                        let file = declaration.file.display_name().unwrap_or_else(|| "?".to_string());
                        let line = if declaration.line == 0 {
                            "null".to_string()
                        } else {
                            declaration.line.to_string()
                        };
                        let file = escape(&file);
                        let _ = write!(attrs, "\n  declaration:\n    file: \"{file}\"\n    line: {line}");
                    }
                    None => attrs.push_str("\n  declaration:\n    file: null\n    line: null"),
                }
                let _ = write!(
                    attrs,
                    "\n  is_template: {}\n  static: {}\n  inline: {}\n  is_inlined: {}\n  is_declaration: {}",
                    object.is_template, info.is_static, info.is_inline, info.is_inlined, info.is_declaration
                );
            }
            (ObjectKind::Class | ObjectKind::Struct, _) => {
                let _ = write!(attrs, "\n  is_template: {}\n  inherits_from:", object.is_template);
                let in_class = object.kind == ObjectKind::Class;
                let bases: Vec<ObjectId> = self.view.aux_children(id, AuxForm::Inheritance).collect();
                if bases.is_empty() {
                    attrs.push_str(" []");
                }
                for base in bases {
                    let parent = self
                        .view
                        .type_of(base)
                        .map_or_else(|| "void".to_string(), LogicalObject::qualified_name);
                    let access = self.view.get(base).access().effective(in_class);
                    let _ = write!(
                        attrs,
                        "\n    - parent: \"{}\"\n      access_specifier: \"{access}\"",
                        escape(&parent)
                    );
                }
            }
            (ObjectKind::Union, _) => {
                let _ = write!(attrs, "\n  is_template: {}", object.is_template);
            }
            (ObjectKind::Enum, Detail::Enum { is_class }) => {
                let _ = write!(attrs, "\n  class: {is_class}\n  enumerators:");
                let enumerators: Vec<ObjectId> = self.view.aux_children(id, AuxForm::Enumerator).collect();
                if enumerators.is_empty() {
                    attrs.push_str(" []");
                }
                for enumerator in enumerators {
                    let enumerator = self.view.get(enumerator);
                    let value = match &enumerator.detail {
                        Detail::Enumerator { value } => value.as_str(),
                        _ => "",
                    };
                    let _ = write!(
                        attrs,
                        "\n    - enumerator: \"{}\"\n      value: {value}",
                        escape(&enumerator.name)
                    );
                }
            }
            (ObjectKind::Member, Detail::Member { access, .. }) => {
                let in_class = object
                    .parent
                    .is_some_and(|parent| self.view.get(parent).kind == ObjectKind::Class);
                let _ = write!(attrs, "\n  access_specifier: \"{}\"", access.effective(in_class));
            }
            (ObjectKind::Block, Detail::Block(form)) => {
                let _ = write!(
                    attrs,
                    "\n  try: {}\n  catch: {}",
                    *form == BlockForm::Try,
                    *form == BlockForm::Catch
                );
            }
            (ObjectKind::CodeLine, Detail::CodeLine(flags)) => {
                let _ = write!(
                    attrs,
                    "\n  NewStatement: {}\n  PrologueEnd: {}\n  EndSequence: {}\n  BasicBlock: {}\n  Discriminator: {}\n  EpilogueBegin: {}",
                    flags.new_statement,
                    flags.prologue_end,
                    flags.end_sequence,
                    flags.basic_block,
                    flags.discriminator != 0,
                    flags.epilogue_begin
                );
            }
            (ObjectKind::TemplateParameter, Detail::TemplateParameter(param)) => {
                attrs.push_str("\n  types:");
                let items: Vec<String> = if *param == TemplateParam::Pack {
                    object
                        .children
                        .iter()
                        .filter_map(|&member| self.template_value(member))
                        .collect()
                } else {
                    self.template_value(id).into_iter().collect()
                };
                if items.is_empty() {
                    attrs.push_str(" []");
                }
                for item in items {
                    let _ = write!(attrs, "\n    - {item}");
                }
            }
            _ => {}
        }

        if attrs.is_empty() {
            "attributes: {}".to_string()
        } else {
            format!("attributes:{attrs}")
        }
    }

    fn template_value(&self, id: ObjectId) -> Option<String>
    {
        let object = self.view.get(id);
        match object.template_param()? {
            TemplateParam::Type => Some(match self.view.type_of(id) {
                Some(ty) => quoted(&ty.qualified_name()),
                None => "\"void\"".to_string(),
            }),
            TemplateParam::Value(value) => Some(value.clone().unwrap_or_else(|| "null".to_string())),
            TemplateParam::Template(name) => Some(name.as_deref().map_or_else(|| "null".to_string(), |name| quoted(name))),
            TemplateParam::Pack => None,
        }
    }
}

/// `"text"`, or `null` when empty.
fn quoted(text: &str) -> String
{
    if text.is_empty() {
        "null".to_string()
    } else {
        format!("\"{}\"", escape(text))
    }
}

/// Backslash-escape a double-quoted scalar.
fn escape(text: &str) -> String
{
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::builder::build;
    use crate::die::{Die, UnitDies};
    use crate::settings::ViewSettings;

    #[test]
    fn test_primitive_type_and_variable()
    {
        let mut unit = UnitDies::new();
        unit.add_file("primitive_type.cpp");
        unit.push(Die::new(0xb, gimli::DW_TAG_compile_unit, None).name("primitive_type.cpp"));
        unit.push(Die::new(0x1d, gimli::DW_TAG_variable, Some(0xb)).name("g").decl(1, 3).type_ref(0x30));
        unit.push(
            Die::new(0x30, gimli::DW_TAG_base_type, Some(0xb))
                .name("int")
                .unsigned(gimli::DW_AT_byte_size, 4),
        );
        let mut view = build("primitive_type.o", &[unit], &ViewSettings::default()).view;
        crate::sort::sort_view(&mut view, crate::settings::SortKey::Line);

        let expected = "\
input_file: \"primitive_type.o\"
output_version: \"0.1\"
objects:
  - object: \"CompileUnit\"
    name: \"primitive_type.cpp\"
    type: null
    source:
      line: null
      file: null
    dwarf:
      offset: 0xb
      tag: \"DW_TAG_compile_unit\"
    attributes: {}
    children:
      - object: \"PrimitiveType\"
        name: null
        type: \"int\"
        source:
          line: null
          file: null
        dwarf:
          offset: 0x30
          tag: \"DW_TAG_base_type\"
        attributes:
          size: 4
        children: []
      - object: \"Variable\"
        name: \"g\"
        type: \"int\"
        source:
          line: 3
          file: \"primitive_type.cpp\"
        dwarf:
          offset: 0x1d
          tag: \"DW_TAG_variable\"
        attributes: {}
        children: []
";
        assert_eq!(render_yaml(&view), expected);
    }

    #[test]
    fn test_quotes_and_backslashes_in_names_are_escaped()
    {
        let mut view = LogicalView::new("a.o");
        let mut cu = LogicalObject::new(ObjectKind::CompileUnit, 0xb);
        cu.name = "dir\\say \"hi\".cpp".to_string();
        let cu = view.insert(cu, view.root());

        let mut out = String::new();
        YamlRenderer::new(&view).render_object(cu, 1, &mut out);
        assert!(out.contains("name: \"dir\\\\say \\\"hi\\\".cpp\"\n"));
    }

    #[test]
    fn test_input_file_backslashes_are_escaped()
    {
        let view = LogicalView::new("C:\\build\\a.o");
        assert_eq!(
            render_yaml(&view),
            "input_file: \"C:\\\\build\\\\a.o\"\noutput_version: \"0.1\"\nobjects:\n"
        );
    }
}
