//! Accessor generation for fields implementing interface properties, and
//! getter/setter consistency.

use ets_ast::node::{MethodKind, NodeKind};
use ets_ast::{AstEdit, ClassTarget, ModifierFlags, NodeIndex, SyntheticMember};
use ets_binder::{MemberTable, VariableFlags, VariableId};
use ets_common::diagnostics::diagnostic_codes;
use indexmap::IndexMap;
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::state::CheckerState;
use crate::types::{FunctionType, ParamInfo, SignatureData, SignatureFlags, TypeData, TypeId};

/// Name of the private field backing a generated accessor pair.
#[must_use]
pub fn backing_field_name(property: &str) -> String {
    format!("<property>{property}")
}

impl<'a> CheckerState<'a> {
    /// Turn the fields of `class` that implement interface accessors into
    /// getter/setter pairs over a private backing field. Consumes the marks
    /// left by override validation, so a second run does nothing.
    pub fn transform_properties(&mut self, class: TypeId) {
        let Some(decl) = self.ctx.types.object(class).map(|o| o.decl) else {
            return;
        };
        let owned: Vec<(VariableId, ModifierFlags)> = self
            .ctx
            .accessor_marks
            .iter()
            .filter(|&(&var, &marks)| self.is_marked_for(class, decl, var, marks))
            .map(|(&var, &marks)| (var, marks))
            .collect();
        for &(var, _) in &owned {
            self.ctx.accessor_marks.shift_remove(&var);
        }

        for (var, marks) in owned {
            if marks.contains(ModifierFlags::SUPER_OWNER) {
                self.emit_super_owner_field(decl, var, marks);
            } else {
                self.generate_accessors(class, decl, var);
            }
        }
    }

    fn is_marked_for(&self, class: TypeId, decl: NodeIndex, var: VariableId, marks: ModifierFlags) -> bool {
        if marks.contains(ModifierFlags::SUPER_OWNER) {
            let name = &self.ctx.binder.get(var).name;
            return self.ctx.super_owner_fields.get(&(class, name.clone())) == Some(&var);
        }
        self.ctx.arena.parent(self.ctx.binder.get(var).decl()) == decl
    }

    fn emit_super_owner_field(&mut self, class_decl: NodeIndex, var: VariableId, marks: ModifierFlags) {
        let source = self.ctx.binder.get(var).decl();
        self.ctx.edits.push(AstEdit::AddMember {
            class: ClassTarget::Existing(class_decl),
            member: SyntheticMember::CopyOfField {
                source,
                add_modifiers: marks & (ModifierFlags::GETTER_SETTER | ModifierFlags::SUPER_OWNER),
            },
        });
    }

    fn generate_accessors(&mut self, class: TypeId, class_decl: NodeIndex, var: VariableId) {
        let variable = self.ctx.binder.get(var);
        let (name, field_decl, readonly) = (
            variable.name.clone(),
            variable.decl(),
            variable.has_flags(VariableFlags::READONLY),
        );
        let Some(modifiers) = self.ctx.arena.get_property(field_decl).map(|p| p.modifiers) else {
            return;
        };
        if !modifiers.is_public() {
            self.error_at_node(field_decl, diagnostic_codes::NON_PUBLIC_INTERFACE_PROPERTY, &[]);
            return;
        }

        let value_type = self.type_of_variable(var);
        let mut signatures: SmallVec<[_; 2]> = smallvec![self.ctx.types.alloc_signature(SignatureData {
            owner: class,
            name: name.clone(),
            params: Vec::new(),
            return_type: value_type,
            min_arg_count: 0,
            flags: SignatureFlags::GETTER,
            decl: field_decl,
            type_params: Vec::new(),
        })];
        if !readonly {
            signatures.push(self.ctx.types.alloc_signature(SignatureData {
                owner: class,
                name: name.clone(),
                params: vec![ParamInfo {
                    name: "value".to_string(),
                    ty: value_type,
                }],
                return_type: TypeId::VOID,
                min_arg_count: 1,
                flags: SignatureFlags::SETTER,
                decl: field_decl,
                type_params: Vec::new(),
            }));
        }
        let accessor_type = self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: name.clone(),
            signatures,
            extension_accessor: false,
        }));
        self.ctx.variable_types.insert(var, accessor_type);
        {
            let variable = self.ctx.binder.get_mut(var);
            variable.flags.remove(VariableFlags::PROPERTY);
            variable.flags.insert(VariableFlags::METHOD);
        }

        let backing_name = backing_field_name(&name);
        let mut backing_flags = VariableFlags::PROPERTY | VariableFlags::PRIVATE | VariableFlags::SYNTHETIC;
        if readonly {
            backing_flags |= VariableFlags::READONLY;
        }
        let backing = self
            .ctx
            .binder
            .add_synthetic_variable(&backing_name, field_decl, backing_flags);
        self.ctx.variable_types.insert(backing, value_type);
        if let Some(object) = self.ctx.types.object_mut(class) {
            object.properties_mut(MemberTable::InstanceField).shift_remove(&name);
            object
                .properties_mut(MemberTable::InstanceMethod)
                .insert(name.clone(), var);
            object
                .properties_mut(MemberTable::InstanceField)
                .insert(backing_name.clone(), backing);
        }

        let type_text = self.ctx.types.edit_text(value_type);
        let mut with = vec![
            SyntheticMember::Field {
                name: backing_name,
                type_text: type_text.clone(),
                modifiers: ModifierFlags::PRIVATE | (modifiers & ModifierFlags::READONLY),
            },
            SyntheticMember::Method {
                name: name.clone(),
                kind: MethodKind::Getter,
                params: Vec::new(),
                return_type: type_text.clone(),
                modifiers: ModifierFlags::PUBLIC | ModifierFlags::GETTER,
            },
        ];
        if !readonly {
            with.push(SyntheticMember::Method {
                name: name.clone(),
                kind: MethodKind::Setter,
                params: vec![("value".to_string(), type_text)],
                return_type: "void".to_string(),
                modifiers: ModifierFlags::PUBLIC | ModifierFlags::SETTER,
            });
        }
        self.ctx.edits.push(AstEdit::ReplaceMember {
            class: class_decl,
            member: field_decl,
            with,
        });
        debug!(%name, readonly, "generated accessors for field");
    }

    /// Whether a method-table variable is a field turned into accessors.
    pub(crate) fn is_field_backed_accessor(&self, var: VariableId) -> bool {
        let decl = self.ctx.binder.get(var).decl();
        let arena = self.ctx.arena;
        arena.get_property(decl).is_some() && matches!(arena.kind(arena.parent(decl)), Some(NodeKind::ClassDecl(_)))
    }

    // =========================================================================
    // Consistency
    // =========================================================================

    /// Accessors of one name must not mix with a method of that name, must
    /// not be repeated, and must agree on access modifiers.
    pub fn check_accessor_consistency(&mut self, class_decl: NodeIndex) {
        let members = match self.ctx.arena.kind(class_decl) {
            Some(NodeKind::ClassDecl(class)) => class.members.clone(),
            Some(NodeKind::InterfaceDecl(iface)) => iface.members.clone(),
            _ => return,
        };

        #[derive(Default)]
        struct Group {
            methods: SmallVec<[NodeIndex; 1]>,
            getters: SmallVec<[NodeIndex; 1]>,
            setters: SmallVec<[NodeIndex; 1]>,
        }
        let mut groups: IndexMap<(String, bool), Group> = IndexMap::new();
        for member in members {
            let Some(method) = self.ctx.arena.get_method(member) else {
                continue;
            };
            let key = (method.name.clone(), method.modifiers.contains(ModifierFlags::STATIC));
            let group = groups.entry(key).or_default();
            match method.kind {
                MethodKind::Method => group.methods.push(member),
                MethodKind::Getter => group.getters.push(member),
                MethodKind::Setter => group.setters.push(member),
                MethodKind::Constructor | MethodKind::StaticBlock => {}
            }
        }

        for ((name, _), group) in groups {
            let has_accessor = !group.getters.is_empty() || !group.setters.is_empty();
            if has_accessor {
                for &method in &group.methods {
                    self.error_at_node(method, diagnostic_codes::METHOD_SAME_NAME_AS_ACCESSOR, &[&name]);
                }
            }
            for &extra in group.getters.iter().skip(1).chain(group.setters.iter().skip(1)) {
                self.error_at_node(extra, diagnostic_codes::DUPLICATE_ACCESSOR, &[]);
            }
            if let (Some(&getter), Some(&setter)) = (group.getters.first(), group.setters.first()) {
                let access = |node| {
                    self.ctx
                        .arena
                        .get_method(node)
                        .map_or(ModifierFlags::PUBLIC, |m| m.modifiers.access())
                };
                if access(getter) != access(setter) {
                    self.error_at_node(setter, diagnostic_codes::ACCESSOR_MODIFIERS_MISMATCH, &[]);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/accessors_tests.rs"]
mod tests;
