//! AST edit lists.
//!
//! The checker never mutates the tree it is checking. Transformations that
//! lowering needs (generated accessors, synthetic override fields, interop
//! bridge classes) are recorded as [`AstEdit`]s and materialized afterwards by
//! [`apply_edits`].

use std::fmt;

use ets_common::Span;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::node::*;
use crate::type_text::{parse_type, type_to_text};
use crate::{ModifierFlags, NodeArena, NodeIndex};

/// Class an edit applies to: one already in the tree, or one introduced by an
/// earlier `AddClass` edit in the same list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassTarget {
    Existing(NodeIndex),
    Synthetic(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntheticMember {
    Field {
        name: String,
        type_text: String,
        modifiers: ModifierFlags,
    },
    Method {
        name: String,
        kind: MethodKind,
        params: Vec<(String, String)>,
        return_type: String,
        modifiers: ModifierFlags,
    },
    /// Copy of an existing field (without its initializer) carrying extra
    /// modifiers.
    CopyOfField {
        source: NodeIndex,
        add_modifiers: ModifierFlags,
    },
    /// Method that takes over the parameters and body of the existing method
    /// `source`. The source keeps copies of its parameters and loses its body.
    TakeOverMethod {
        source: NodeIndex,
        name: String,
        return_type: String,
        remove_modifiers: ModifierFlags,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstEdit {
    AddClass {
        name: String,
        super_class: Option<String>,
        implements: Vec<String>,
        modifiers: ModifierFlags,
    },
    AddMember {
        class: ClassTarget,
        member: SyntheticMember,
    },
    /// Remove `member` from `class` and insert `with` in its place.
    ReplaceMember {
        class: NodeIndex,
        member: NodeIndex,
        with: Vec<SyntheticMember>,
    },
    AddModifiers {
        node: NodeIndex,
        modifiers: ModifierFlags,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    NotAProgram(NodeIndex),
    NotAClass(NodeIndex),
    UnknownSyntheticClass(String),
    MemberNotInClass { class: NodeIndex, member: NodeIndex },
    NotAField(NodeIndex),
    NotAMethod(NodeIndex),
    MalformedType(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::NotAProgram(idx) => write!(f, "node {} is not a program", idx.0),
            EditError::NotAClass(idx) => write!(f, "node {} is not a class declaration", idx.0),
            EditError::UnknownSyntheticClass(name) => write!(f, "no synthetic class named `{name}`"),
            EditError::MemberNotInClass { class, member } => {
                write!(f, "node {} is not a member of class {}", member.0, class.0)
            }
            EditError::NotAField(idx) => write!(f, "node {} is not a class property", idx.0),
            EditError::NotAMethod(idx) => write!(f, "node {} is not a method", idx.0),
            EditError::MalformedType(text) => write!(f, "malformed type text `{text}`"),
        }
    }
}

impl std::error::Error for EditError {}

/// Result of applying an edit list.
#[derive(Clone, Debug, Default)]
pub struct AppliedEdits {
    /// Synthetic classes by name.
    pub classes: FxHashMap<String, NodeIndex>,
    /// Members created by the edits, in edit order.
    pub members: Vec<NodeIndex>,
}

/// Apply `edits` in order to the tree rooted at `program`.
pub fn apply_edits(arena: &mut NodeArena, program: NodeIndex, edits: &[AstEdit]) -> Result<AppliedEdits, EditError> {
    if arena.get_program(program).is_none() {
        return Err(EditError::NotAProgram(program));
    }
    let mut applied = AppliedEdits::default();
    for edit in edits {
        match edit {
            AstEdit::AddClass {
                name,
                super_class,
                implements,
                modifiers,
            } => {
                let super_class = match super_class {
                    Some(text) => type_node(arena, text)?,
                    None => NodeIndex::NONE,
                };
                let implements = implements
                    .iter()
                    .map(|text| type_node(arena, text))
                    .collect::<Result<Vec<_>, _>>()?;
                let class = arena.add(
                    NodeKind::ClassDecl(ClassData {
                        name: name.clone(),
                        type_params: Vec::new(),
                        super_class,
                        implements,
                        members: Vec::new(),
                        modifiers: *modifiers,
                        is_struct: false,
                    }),
                    Span::SYNTHETIC,
                );
                append_statement(arena, program, class)?;
                debug!(class = %name, "added synthetic class");
                applied.classes.insert(name.clone(), class);
            }
            AstEdit::AddMember { class, member } => {
                let class = match class {
                    ClassTarget::Existing(idx) => *idx,
                    ClassTarget::Synthetic(name) => *applied
                        .classes
                        .get(name)
                        .ok_or_else(|| EditError::UnknownSyntheticClass(name.clone()))?,
                };
                let member = build_member(arena, member)?;
                splice_members(arena, class, None, &[member])?;
                applied.members.push(member);
            }
            AstEdit::ReplaceMember { class, member, with } => {
                let built = with
                    .iter()
                    .map(|m| build_member(arena, m))
                    .collect::<Result<Vec<_>, _>>()?;
                splice_members(arena, *class, Some(*member), &built)?;
                applied.members.extend(built);
            }
            AstEdit::AddModifiers { node, modifiers } => {
                if let Some(flags) = arena.get_mut(*node).and_then(|n| n.kind.modifiers_mut()) {
                    *flags |= *modifiers;
                }
            }
        }
    }
    Ok(applied)
}

fn type_node(arena: &mut NodeArena, text: &str) -> Result<NodeIndex, EditError> {
    parse_type(arena, text, Span::SYNTHETIC).ok_or_else(|| EditError::MalformedType(text.to_string()))
}

fn append_statement(arena: &mut NodeArena, program: NodeIndex, stmt: NodeIndex) -> Result<(), EditError> {
    let mut data = arena
        .get_program(program)
        .cloned()
        .ok_or(EditError::NotAProgram(program))?;
    data.statements.push(stmt);
    arena.replace_kind(program, NodeKind::Program(data));
    Ok(())
}

/// Insert `added` into `class`, replacing `removed` when given.
fn splice_members(
    arena: &mut NodeArena,
    class: NodeIndex,
    removed: Option<NodeIndex>,
    added: &[NodeIndex],
) -> Result<(), EditError> {
    let mut data = arena.get_class(class).cloned().ok_or(EditError::NotAClass(class))?;
    match removed {
        Some(member) => {
            let pos = data
                .members
                .iter()
                .position(|&m| m == member)
                .ok_or(EditError::MemberNotInClass { class, member })?;
            data.members.splice(pos..=pos, added.iter().copied());
            if let Some(node) = arena.get_mut(member) {
                node.parent = NodeIndex::NONE;
            }
        }
        None => data.members.extend_from_slice(added),
    }
    arena.replace_kind(class, NodeKind::ClassDecl(data));
    Ok(())
}

fn build_member(arena: &mut NodeArena, member: &SyntheticMember) -> Result<NodeIndex, EditError> {
    match member {
        SyntheticMember::Field {
            name,
            type_text,
            modifiers,
        } => {
            let type_annotation = type_node(arena, type_text)?;
            Ok(arena.add(
                NodeKind::ClassProperty(PropertyData {
                    name: name.clone(),
                    type_annotation,
                    initializer: NodeIndex::NONE,
                    modifiers: *modifiers,
                }),
                Span::SYNTHETIC,
            ))
        }
        SyntheticMember::Method {
            name,
            kind,
            params,
            return_type,
            modifiers,
        } => {
            let mut param_nodes = Vec::with_capacity(params.len());
            for (param_name, param_type) in params {
                let type_annotation = type_node(arena, param_type)?;
                param_nodes.push(arena.add(
                    NodeKind::Parameter(ParameterData {
                        name: param_name.clone(),
                        type_annotation,
                        optional: false,
                    }),
                    Span::SYNTHETIC,
                ));
            }
            let return_type = type_node(arena, return_type)?;
            Ok(arena.add(
                NodeKind::Method(MethodData {
                    name: name.clone(),
                    kind: *kind,
                    function: FunctionData {
                        type_params: Vec::new(),
                        params: param_nodes,
                        return_type,
                        body: NodeIndex::NONE,
                        receiver: NodeIndex::NONE,
                    },
                    modifiers: *modifiers,
                }),
                Span::SYNTHETIC,
            ))
        }
        SyntheticMember::TakeOverMethod {
            source,
            name,
            return_type,
            remove_modifiers,
        } => {
            let data = arena.get_method(*source).cloned().ok_or(EditError::NotAMethod(*source))?;
            let mut copies = Vec::with_capacity(data.function.params.len());
            for &param in &data.function.params {
                let Some(param_data) = arena.get_parameter(param).cloned() else {
                    continue;
                };
                let type_annotation = if param_data.type_annotation.is_some() {
                    let text = type_to_text(arena, param_data.type_annotation);
                    type_node(arena, &text)?
                } else {
                    NodeIndex::NONE
                };
                let span = arena.span(param);
                copies.push(arena.add(
                    NodeKind::Parameter(ParameterData {
                        type_annotation,
                        ..param_data
                    }),
                    span,
                ));
            }
            let return_type = type_node(arena, return_type)?;
            let taken = MethodData {
                name: name.clone(),
                kind: data.kind,
                function: FunctionData {
                    type_params: Vec::new(),
                    params: data.function.params.clone(),
                    return_type,
                    body: data.function.body,
                    receiver: NodeIndex::NONE,
                },
                modifiers: data.modifiers - *remove_modifiers,
            };
            let mut remaining = data;
            remaining.function.params = copies;
            remaining.function.body = NodeIndex::NONE;
            arena.replace_kind(*source, NodeKind::Method(remaining));
            let span = arena.span(*source);
            Ok(arena.add(NodeKind::Method(taken), span))
        }
        SyntheticMember::CopyOfField { source, add_modifiers } => {
            let data = arena.get_property(*source).cloned().ok_or(EditError::NotAField(*source))?;
            let type_annotation = if data.type_annotation.is_some() {
                let text = type_to_text(arena, data.type_annotation);
                type_node(arena, &text)?
            } else {
                NodeIndex::NONE
            };
            let span = arena.span(*source);
            Ok(arena.add(
                NodeKind::ClassProperty(PropertyData {
                    name: data.name,
                    type_annotation,
                    initializer: NodeIndex::NONE,
                    modifiers: data.modifiers | *add_modifiers,
                }),
                span,
            ))
        }
    }
}

#[cfg(test)]
#[path = "../tests/edit_tests.rs"]
mod tests;
