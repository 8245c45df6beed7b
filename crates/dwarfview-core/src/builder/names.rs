//! Synthesized names for type-building entries and template instances.

use tracing::trace;

use crate::model::{AuxForm, LogicalView, ObjectId, ObjectKind, TemplateParam};
use crate::settings::{ShowOption, ViewSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State
{
    Pending,
    Active,
    Done,
}

/// Name every modifier, array and subroutine type, then suffix template
/// scopes with their arguments.
pub(super) fn resolve_names(view: &mut LogicalView, settings: &ViewSettings)
{
    let ids: Vec<ObjectId> = view.ids().collect();
    let mut resolver = NameResolver {
        state: vec![State::Pending; view.len()],
        view,
        show_void: settings.shows(ShowOption::Void),
    };
    for id in ids {
        resolver.resolve(id);
    }
}

struct NameResolver<'v>
{
    view: &'v mut LogicalView,
    show_void: bool,
    state: Vec<State>,
}

impl NameResolver<'_>
{
    /// Memoised; an object reached again while its own name is being built
    /// keeps the name it has so far.
    fn resolve(&mut self, id: ObjectId)
    {
        if self.state[id.index()] != State::Pending {
            return;
        }
        self.state[id.index()] = State::Active;

        let object = self.view.get(id);
        let name = if let Some(form) = object.aux_form() {
            self.type_name(id, form)
        } else if object.is_template
            && object.kind.can_be_template()
            && !object.name.is_empty()
            && !object.name.contains('<')
        {
            Some(self.template_name(id))
        } else {
            None
        };

        if let Some(name) = name {
            trace!(offset = self.view.get(id).offset, name = %name, "synthesized name");
            self.view.get_mut(id).name = name;
        }
        self.state[id.index()] = State::Done;
    }

    /// Name of the resolved type of `id`, if it has one.
    fn base_name(&mut self, id: ObjectId) -> Option<String>
    {
        let target = self.view.get(id).type_id?;
        self.resolve(target);
        Some(self.view.get(target).name.clone())
    }

    fn type_name(&mut self, id: ObjectId, form: AuxForm) -> Option<String>
    {
        let own = self.view.get(id).name.clone();
        let name = match form {
            AuxForm::Const => compose(&["const", &own, &self.base_name(id).unwrap_or_default()]),
            AuxForm::Volatile => compose(&["volatile", &own, &self.base_name(id).unwrap_or_default()]),
            AuxForm::Restrict => compose(&["restrict", &own, &self.base_name(id).unwrap_or_default()]),
            AuxForm::Pointer => {
                let base = match self.base_name(id) {
                    Some(base) => base,
                    None if self.show_void => "void".to_string(),
                    None => String::new(),
                };
                compose(&[&own, &base, "*"])
            }
            AuxForm::PointerToMember => compose(&[&own, &self.base_name(id).unwrap_or_default(), "*"]),
            AuxForm::Reference => compose(&[&own, &self.base_name(id).unwrap_or_default(), "&"]),
            AuxForm::RvalueReference => compose(&[&own, &self.base_name(id).unwrap_or_default(), "&&"]),
            AuxForm::Unspecified => compose(&[&own, &self.base_name(id).unwrap_or_default()]),
            AuxForm::Array => self.array_name(id),
            AuxForm::Subroutine => self.subroutine_name(id),
            AuxForm::Subrange | AuxForm::SubroutineParameter | AuxForm::Enumerator | AuxForm::Inheritance => {
                return None;
            }
        };
        Some(name)
    }

    /// `int [3][4]`
    fn array_name(&mut self, id: ObjectId) -> String
    {
        let element = self.base_name(id).unwrap_or_else(|| "?".to_string());
        let bounds: String = self
            .view
            .aux_children(id, AuxForm::Subrange)
            .map(|subrange| self.view.get(subrange).name.as_str())
            .collect();
        format!("{element} {bounds}")
    }

    /// `int (*)(char,long)`
    fn subroutine_name(&mut self, id: ObjectId) -> String
    {
        let result = match self.base_name(id) {
            Some(name) => name,
            None if self.show_void => "void".to_string(),
            None => String::new(),
        };
        let params: Vec<ObjectId> = self
            .view
            .aux_children(id, AuxForm::SubroutineParameter)
            .filter(|&param| self.view.get(param).tag == Some(gimli::DW_TAG_formal_parameter))
            .collect();
        let params: Vec<String> = params
            .into_iter()
            .map(|param| self.base_name(param).unwrap_or_default())
            .collect();
        format!("{result} (*)({})", params.join(","))
    }

    /// `name<a1, a2>` from the template parameter children.
    fn template_name(&mut self, id: ObjectId) -> String
    {
        let params: Vec<ObjectId> = self
            .view
            .get(id)
            .children
            .iter()
            .copied()
            .filter(|&child| self.view.get(child).kind == ObjectKind::TemplateParameter)
            .collect();

        let mut args = Vec::new();
        for param in params {
            if self.view.get(param).is_pack() {
                let members = self.view.get(param).children.clone();
                for member in members {
                    if let Some(arg) = self.template_arg(member) {
                        args.push(arg);
                    }
                }
            } else if let Some(arg) = self.template_arg(param) {
                args.push(arg);
            }
        }
        format!("{}<{}>", self.view.get(id).name, args.join(", "))
    }

    fn template_arg(&mut self, param: ObjectId) -> Option<String>
    {
        match self.view.get(param).template_param()?.clone() {
            TemplateParam::Type => Some(match self.view.get(param).type_id {
                Some(ty) => {
                    self.resolve(ty);
                    let parent = self.view.get(ty).parent;
                    let prefix = if self.view.get(ty).kind.has_scope_prefix() {
                        self.view.scope_prefix(parent)
                    } else {
                        String::new()
                    };
                    format!("{prefix}{}", self.view.get(ty).name)
                }
                None => "void".to_string(),
            }),
            TemplateParam::Value(value) => Some(value.unwrap_or_default()),
            TemplateParam::Template(name) => Some(name.unwrap_or_default()),
            TemplateParam::Pack => None,
        }
    }
}

/// Join the non-empty parts with single spaces.
fn compose(parts: &[&str]) -> String
{
    parts
        .iter()
        .flat_map(|part| part.split(' '))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::builder::build;
    use crate::die::{Die, UnitDies};

    fn base_unit() -> UnitDies
    {
        let mut unit = UnitDies::new();
        unit.push(Die::new(0xb, gimli::DW_TAG_compile_unit, None).name("a.cpp"));
        unit.push(Die::new(0x20, gimli::DW_TAG_base_type, Some(0xb)).name("int"));
        unit.push(Die::new(0x24, gimli::DW_TAG_base_type, Some(0xb)).name("char"));
        unit
    }

    fn name_at(unit: UnitDies, settings: &ViewSettings, offset: u64) -> String
    {
        let output = build("a.o", &[unit], settings);
        let id = output.view.find(offset).unwrap();
        output.view.get(id).name.clone()
    }

    #[test]
    fn test_compose_collapses_spaces()
    {
        assert_eq!(compose(&["const", "", "int  *"]), "const int *");
        assert_eq!(compose(&["", "", "*"]), "*");
    }

    #[test]
    fn test_modifier_chain()
    {
        let mut unit = base_unit();
        unit.push(Die::new(0x30, gimli::DW_TAG_const_type, Some(0xb)).type_ref(0x20));
        unit.push(Die::new(0x34, gimli::DW_TAG_pointer_type, Some(0xb)).type_ref(0x30));
        unit.push(Die::new(0x38, gimli::DW_TAG_reference_type, Some(0xb)).type_ref(0x34));

        let settings = ViewSettings::default();
        assert_eq!(name_at(unit.clone(), &settings, 0x34), "const int *");
        assert_eq!(name_at(unit, &settings, 0x38), "const int * &");
    }

    #[test]
    fn test_void_pointer_follows_void_option()
    {
        let mut unit = base_unit();
        unit.push(Die::new(0x30, gimli::DW_TAG_pointer_type, Some(0xb)));

        let mut settings = ViewSettings::default();
        assert_eq!(name_at(unit.clone(), &settings, 0x30), "void *");
        settings.set(ShowOption::Void, false);
        assert_eq!(name_at(unit, &settings, 0x30), "*");
    }

    #[test]
    fn test_array_and_subroutine_names()
    {
        let mut unit = base_unit();
        unit.push(Die::new(0x30, gimli::DW_TAG_array_type, Some(0xb)).type_ref(0x20));
        unit.push(Die::new(0x34, gimli::DW_TAG_subrange_type, Some(0x30)).unsigned(gimli::DW_AT_count, 3));
        unit.push(Die::new(0x38, gimli::DW_TAG_subrange_type, Some(0x30)).unsigned(gimli::DW_AT_count, 4));
        unit.push(Die::new(0x40, gimli::DW_TAG_subroutine_type, Some(0xb)).type_ref(0x20));
        unit.push(Die::new(0x44, gimli::DW_TAG_formal_parameter, Some(0x40)).type_ref(0x24));
        unit.push(Die::new(0x48, gimli::DW_TAG_formal_parameter, Some(0x40)).type_ref(0x20));
        unit.push(Die::new(0x50, gimli::DW_TAG_pointer_type, Some(0xb)).type_ref(0x40));

        let settings = ViewSettings::default();
        assert_eq!(name_at(unit.clone(), &settings, 0x30), "int [3][4]");
        assert_eq!(name_at(unit.clone(), &settings, 0x40), "int (*)(char,int)");
        assert_eq!(name_at(unit, &settings, 0x50), "int (*)(char,int) *");
    }

    #[test]
    fn test_cyclic_types_terminate()
    {
        let mut unit = base_unit();
        unit.push(Die::new(0x30, gimli::DW_TAG_pointer_type, Some(0xb)).type_ref(0x34));
        unit.push(Die::new(0x34, gimli::DW_TAG_const_type, Some(0xb)).type_ref(0x30));

        let name = name_at(unit, &ViewSettings::default(), 0x30);
        assert!(name.ends_with('*'));
    }

    #[test]
    fn test_template_suffix_from_parameters()
    {
        let mut unit = base_unit();
        unit.push(Die::new(0x30, gimli::DW_TAG_namespace, Some(0xb)).name("nsp"));
        unit.push(Die::new(0x34, gimli::DW_TAG_structure_type, Some(0x30)).name("bar"));
        unit.push(Die::new(0x40, gimli::DW_TAG_class_type, Some(0xb)).name("C"));
        unit.push(Die::new(0x44, gimli::DW_TAG_template_type_parameter, Some(0x40)).name("T").type_ref(0x34));
        unit.push(
            Die::new(0x48, gimli::DW_TAG_template_value_parameter, Some(0x40))
                .name("N")
                .type_ref(0x20)
                .signed(gimli::DW_AT_const_value, -2),
        );
        unit.push(Die::new(0x50, gimli::DW_TAG_subprogram, Some(0xb)).name("sum"));
        unit.push(Die::new(0x54, gimli::DW_TAG_GNU_template_parameter_pack, Some(0x50)).name("Args"));
        unit.push(Die::new(0x58, gimli::DW_TAG_template_type_parameter, Some(0x54)).type_ref(0x20));
        unit.push(Die::new(0x5c, gimli::DW_TAG_template_type_parameter, Some(0x54)).type_ref(0x24));
        unit.push(Die::new(0x60, gimli::DW_TAG_structure_type, Some(0xb)).name("K<int>"));
        unit.push(Die::new(0x64, gimli::DW_TAG_template_type_parameter, Some(0x60)).name("T").type_ref(0x20));

        let settings = ViewSettings::default();
        assert_eq!(name_at(unit.clone(), &settings, 0x40), "C<nsp::bar, -2>");
        assert_eq!(name_at(unit.clone(), &settings, 0x50), "sum<int, char>");
        assert_eq!(name_at(unit, &settings, 0x60), "K<int>");
    }
}
