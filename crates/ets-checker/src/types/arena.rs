//! Type storage.

use ets_ast::NodeIndex;
use ets_common::Language;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use super::*;

/// Owns every type and signature created during one checking session.
#[derive(Debug)]
pub struct TypeArena {
    types: Vec<TypeData>,
    signatures: Vec<SignatureData>,
    unions: FxHashMap<SmallVec<[TypeId; 4]>, TypeId>,
    dynamics: FxHashMap<Language, TypeId>,
    non_nullish: FxHashMap<TypeId, TypeId>,
    utilities: FxHashMap<(UtilityKind, TypeId), TypeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::with_capacity(64),
            signatures: Vec::new(),
            unions: FxHashMap::default(),
            dynamics: FxHashMap::default(),
            non_nullish: FxHashMap::default(),
            utilities: FxHashMap::default(),
        };
        arena.types.extend([
            TypeData::Error,
            TypeData::Primitive(PrimitiveKind::Void),
            TypeData::Primitive(PrimitiveKind::Boolean),
            TypeData::Primitive(PrimitiveKind::Byte),
            TypeData::Primitive(PrimitiveKind::Char),
            TypeData::Primitive(PrimitiveKind::Short),
            TypeData::Primitive(PrimitiveKind::Int),
            TypeData::Primitive(PrimitiveKind::Long),
            TypeData::Primitive(PrimitiveKind::Float),
            TypeData::Primitive(PrimitiveKind::Double),
            TypeData::Null,
            TypeData::Undefined,
        ]);

        let mut object = ObjectType::new("Object", ObjectKind::Class, NodeIndex::NONE, ObjectFlags::BUILTIN);
        settle_builtin(&mut object);
        arena.types.push(TypeData::Object(Box::new(object)));

        let mut string = ObjectType::new(
            "String",
            ObjectKind::Class,
            NodeIndex::NONE,
            ObjectFlags::BUILTIN | ObjectFlags::FINAL,
        );
        string.super_type = Some(TypeId::OBJECT);
        settle_builtin(&mut string);
        arena.types.push(TypeData::Object(Box::new(string)));

        let nullish: SmallVec<[TypeId; 4]> = smallvec![TypeId::NULL, TypeId::UNDEFINED, TypeId::OBJECT];
        arena.unions.insert(nullish.clone(), TypeId::NULLISH_OBJECT);
        arena.types.push(TypeData::Union(nullish));

        let mut global = ObjectType::new("ETSGLOBAL", ObjectKind::Class, NodeIndex::NONE, ObjectFlags::BUILTIN);
        global.super_type = Some(TypeId::OBJECT);
        settle_builtin(&mut global);
        arena.types.push(TypeData::Object(Box::new(global)));

        debug_assert_eq!(arena.types.len(), TypeId::FIRST_USER as usize);
        arena
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.0 as usize]
    }

    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    pub fn alloc_object(&mut self, object: ObjectType) -> TypeId {
        self.alloc(TypeData::Object(Box::new(object)))
    }

    #[must_use]
    pub fn object(&self, id: TypeId) -> Option<&ObjectType> {
        match self.get(id) {
            TypeData::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, id: TypeId) -> Option<&mut ObjectType> {
        match &mut self.types[id.0 as usize] {
            TypeData::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn function(&self, id: TypeId) -> Option<&FunctionType> {
        match self.get(id) {
            TypeData::Function(function) => Some(function),
            _ => None,
        }
    }

    #[must_use]
    pub fn type_param(&self, id: TypeId) -> Option<&TypeParameter> {
        match self.get(id) {
            TypeData::TypeParameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn type_param_mut(&mut self, id: TypeId) -> Option<&mut TypeParameter> {
        match &mut self.types[id.0 as usize] {
            TypeData::TypeParameter(param) => Some(param),
            _ => None,
        }
    }

    #[must_use]
    pub fn primitive(&self, id: TypeId) -> Option<PrimitiveKind> {
        match self.get(id) {
            TypeData::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn dynamic_language(&self, id: TypeId) -> Option<Language> {
        match self.get(id) {
            TypeData::Dynamic(language) => Some(*language),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_object(&self, id: TypeId) -> bool {
        self.object(id).is_some()
    }

    #[must_use]
    pub fn is_class(&self, id: TypeId) -> bool {
        self.object(id).is_some_and(ObjectType::is_class)
    }

    #[must_use]
    pub fn is_interface(&self, id: TypeId) -> bool {
        self.object(id).is_some_and(ObjectType::is_interface)
    }

    #[must_use]
    pub fn is_nullish(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Null | TypeData::Undefined)
    }

    // =========================================================================
    // Interned constructors
    // =========================================================================

    /// Union of `members`, flattened, de-duplicated and sorted by id. A single
    /// member collapses to itself; an error member poisons the union.
    pub fn union(&mut self, members: &[TypeId]) -> TypeId {
        let mut flat: SmallVec<[TypeId; 4]> = SmallVec::new();
        for &member in members {
            if member.is_error() {
                return TypeId::ERROR;
            }
            match self.get(member) {
                TypeData::Union(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }
        flat.sort_unstable();
        flat.dedup();
        match flat.len() {
            0 => TypeId::ERROR,
            1 => flat[0],
            _ => {
                if let Some(&id) = self.unions.get(&flat) {
                    return id;
                }
                let id = self.alloc(TypeData::Union(flat.clone()));
                self.unions.insert(flat, id);
                id
            }
        }
    }

    pub fn dynamic(&mut self, language: Language) -> TypeId {
        if let Some(&id) = self.dynamics.get(&language) {
            return id;
        }
        let id = self.alloc(TypeData::Dynamic(language));
        self.dynamics.insert(language, id);
        id
    }

    /// `inner` without `null` and `undefined`.
    pub fn non_nullish(&mut self, inner: TypeId) -> TypeId {
        match self.get(inner).clone() {
            TypeData::Union(members) => {
                let kept: SmallVec<[TypeId; 4]> = members.into_iter().filter(|&m| !self.is_nullish(m)).collect();
                self.union(&kept)
            }
            TypeData::TypeParameter(_) => {
                if let Some(&id) = self.non_nullish.get(&inner) {
                    return id;
                }
                let id = self.alloc(TypeData::NonNullish(inner));
                self.non_nullish.insert(inner, id);
                id
            }
            _ => inner,
        }
    }

    pub fn utility(&mut self, kind: UtilityKind, inner: TypeId) -> TypeId {
        if inner.is_error() {
            return TypeId::ERROR;
        }
        if let Some(&id) = self.utilities.get(&(kind, inner)) {
            return id;
        }
        let id = self.alloc(TypeData::Utility { kind, inner });
        self.utilities.insert((kind, inner), id);
        id
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    pub fn alloc_signature(&mut self, signature: SignatureData) -> SignatureId {
        debug_assert!(
            self.object(signature.owner).is_some(),
            "signature `{}` must be owned by an object type",
            signature.name
        );
        let id = SignatureId(self.signatures.len() as u32);
        self.signatures.push(signature);
        id
    }

    #[must_use]
    pub fn signature(&self, id: SignatureId) -> &SignatureData {
        &self.signatures[id.0 as usize]
    }

    pub fn signature_mut(&mut self, id: SignatureId) -> &mut SignatureData {
        &mut self.signatures[id.0 as usize]
    }

    #[must_use]
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}

fn settle_builtin(object: &mut ObjectType) {
    for facet in [
        Facet::Super,
        Facet::Interfaces,
        Facet::TypeParams,
        Facet::AbstractObligations,
        Facet::InvokeLegitimacy,
    ] {
        object.facets.set(facet, FacetState::Resolved);
    }
    object.flags |= ObjectFlags::MEMBERS_RESOLVED | ObjectFlags::OVERRIDES_VALIDATED;
}
