//! Human-readable type names for diagnostics and synthesized type text.

use super::*;

impl TypeArena {
    /// Type as written in source, e.g. `Box<int>` or `A | null`.
    #[must_use]
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Error => "<error>".to_string(),
            TypeData::Primitive(kind) => kind.name().to_string(),
            TypeData::Null => "null".to_string(),
            TypeData::Undefined => "undefined".to_string(),
            TypeData::Object(object) => {
                if object.type_args.is_empty() {
                    object.name.clone()
                } else {
                    let args: Vec<String> = object.type_args.iter().map(|&a| self.display(a)).collect();
                    format!("{}<{}>", object.name, args.join(", "))
                }
            }
            TypeData::Function(function) => match function.signatures.first() {
                Some(&sig) => {
                    let sig = self.signature(sig);
                    format!("{} => {}", self.display_params(sig), self.display(sig.return_type))
                }
                None => function.name.clone(),
            },
            TypeData::TypeParameter(param) => param.name.clone(),
            TypeData::Union(members) => {
                if id == TypeId::NULLISH_OBJECT {
                    return "Object | null | undefined".to_string();
                }
                let parts: Vec<String> = members.iter().map(|&m| self.display(m)).collect();
                parts.join(" | ")
            }
            TypeData::NonNullish(inner) => format!("{}!", self.display(*inner)),
            TypeData::Utility { kind, inner } => format!("{}<{}>", kind.name(), self.display(*inner)),
            TypeData::Dynamic(_) => "JSValue".to_string(),
        }
    }

    /// `(int, String)`: parameter types of a signature, receiver excluded.
    #[must_use]
    pub fn display_params(&self, sig: &SignatureData) -> String {
        let params: Vec<String> = sig.explicit_params().iter().map(|p| self.display(p.ty)).collect();
        format!("({})", params.join(", "))
    }

    /// Type text that `ets_ast::type_text::parse_type` accepts, used in AST
    /// edits. Dynamic values and lambdas become the interop value class.
    #[must_use]
    pub fn edit_text(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Dynamic(_) | TypeData::Function(_) => "std.interop.js.JSValue".to_string(),
            TypeData::Error => "Object".to_string(),
            TypeData::NonNullish(inner) | TypeData::Utility { inner, .. } => self.edit_text(*inner),
            TypeData::Union(members) => {
                let parts: Vec<String> = members.iter().map(|&m| self.edit_text(m)).collect();
                parts.join(" | ")
            }
            _ => self.display(id),
        }
    }

    /// Name of a type inside a mangled interop signature.
    #[must_use]
    pub fn assembler_name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Primitive(kind) => kind.assembler_name().to_string(),
            TypeData::Dynamic(_) | TypeData::Function(_) => "std.interop.js.JSValue".to_string(),
            _ if id == TypeId::STRING => "std.core.String".to_string(),
            _ => "std.core.Object".to_string(),
        }
    }
}
