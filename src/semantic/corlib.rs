use super::{CompilationBuilder, SpecialType, SymbolId, Ty, TypeKind};

/// The well-known base class library subset the analyzers rely on.
#[derive(Debug, Clone, Copy)]
pub struct CoreLibrary {
    pub system: SymbolId,
    pub collections_generic: SymbolId,
    pub object: SymbolId,
    /// `Object.Equals(object)`
    pub object_equals: SymbolId,
    /// `Object.Equals(object, object)`
    pub object_static_equals: SymbolId,
    pub value_type: SymbolId,
    pub value_type_equals: SymbolId,
    pub boolean: SymbolId,
    pub char: SymbolId,
    pub int32: SymbolId,
    pub int32_equals_object: SymbolId,
    pub int32_equals: SymbolId,
    pub int64: SymbolId,
    pub double: SymbolId,
    pub string: SymbolId,
    pub string_equals_object: SymbolId,
    pub string_equals: SymbolId,
    pub void: SymbolId,
    pub console: SymbolId,
    pub console_write_line: SymbolId,
    pub iequatable: SymbolId,
    pub iequatable_equals: SymbolId,
    pub equality_comparer: SymbolId,
    pub equality_comparer_default: SymbolId,
    pub equality_comparer_equals: SymbolId,
}

impl CoreLibrary {
    pub fn install(builder: &mut CompilationBuilder) -> Self {
        let system = builder.namespace("System");
        let collections_generic = builder.namespace("System.Collections.Generic");

        let object = special(builder, system, "Object", TypeKind::Class, SpecialType::Object);
        let object_ty = Ty::named(object);
        let object_equals = builder.add_method(object, "Equals", vec![object_ty.clone()], false);
        let object_static_equals = builder.add_method(
            object,
            "Equals",
            vec![object_ty.clone(), object_ty.clone()],
            true,
        );

        let value_type = builder.add_type(system, "ValueType", TypeKind::Class);
        let value_type_equals =
            builder.add_method(value_type, "Equals", vec![object_ty.clone()], false);
        builder.set_overridden(value_type_equals, object_equals);

        let boolean = special(builder, system, "Boolean", TypeKind::Struct, SpecialType::Boolean);
        let char = special(builder, system, "Char", TypeKind::Struct, SpecialType::Char);
        let int32 = special(builder, system, "Int32", TypeKind::Struct, SpecialType::Int32);
        let int32_equals_object =
            builder.add_method(int32, "Equals", vec![object_ty.clone()], false);
        builder.set_overridden(int32_equals_object, value_type_equals);
        let int32_equals = builder.add_method(int32, "Equals", vec![Ty::named(int32)], false);
        let int64 = special(builder, system, "Int64", TypeKind::Struct, SpecialType::Int64);
        let double = special(builder, system, "Double", TypeKind::Struct, SpecialType::Double);

        let string = special(builder, system, "String", TypeKind::Class, SpecialType::String);
        let string_equals_object =
            builder.add_method(string, "Equals", vec![object_ty.clone()], false);
        builder.set_overridden(string_equals_object, object_equals);
        let string_equals = builder.add_method(string, "Equals", vec![Ty::named(string)], false);

        let void = special(builder, system, "Void", TypeKind::Struct, SpecialType::Void);

        let console = builder.add_type(system, "Console", TypeKind::Class);
        if let Some(symbol) = builder.symbol_mut(console) {
            symbol.is_static = true;
        }
        let console_write_line =
            builder.add_method(console, "WriteLine", vec![Ty::named(string)], true);

        let iequatable = builder.add_generic_type(system, "IEquatable", TypeKind::Interface, &["T"]);
        let iequatable_t = first_type_parameter(builder, iequatable);
        let iequatable_equals =
            builder.add_method(iequatable, "Equals", vec![Ty::param(iequatable_t)], false);

        let equality_comparer = builder.add_generic_type(
            collections_generic,
            "EqualityComparer",
            TypeKind::Class,
            &["T"],
        );
        let comparer_t = first_type_parameter(builder, equality_comparer);
        let equality_comparer_default = builder.add_property(
            equality_comparer,
            "Default",
            Ty::generic(equality_comparer, vec![Ty::param(comparer_t)]),
            true,
        );
        let equality_comparer_equals = builder.add_method(
            equality_comparer,
            "Equals",
            vec![Ty::param(comparer_t), Ty::param(comparer_t)],
            false,
        );

        Self {
            system,
            collections_generic,
            object,
            object_equals,
            object_static_equals,
            value_type,
            value_type_equals,
            boolean,
            char,
            int32,
            int32_equals_object,
            int32_equals,
            int64,
            double,
            string,
            string_equals_object,
            string_equals,
            void,
            console,
            console_write_line,
            iequatable,
            iequatable_equals,
            equality_comparer,
            equality_comparer_default,
            equality_comparer_equals,
        }
    }

    pub fn object_ty(&self) -> Ty {
        Ty::named(self.object)
    }

    pub fn int_ty(&self) -> Ty {
        Ty::named(self.int32)
    }

    pub fn string_ty(&self) -> Ty {
        Ty::named(self.string)
    }

    pub fn bool_ty(&self) -> Ty {
        Ty::named(self.boolean)
    }

    pub fn iequatable_of(&self, ty: Ty) -> Ty {
        Ty::generic(self.iequatable, vec![ty])
    }
}

fn special(
    builder: &mut CompilationBuilder,
    container: SymbolId,
    name: &str,
    type_kind: TypeKind,
    special_type: SpecialType,
) -> SymbolId {
    let ty = builder.add_type(container, name, type_kind);
    builder.mark_special(ty, special_type);
    ty
}

fn first_type_parameter(builder: &CompilationBuilder, owner: SymbolId) -> SymbolId {
    builder
        .symbol(owner)
        .and_then(|symbol| symbol.type_parameters().first().copied())
        .unwrap_or(owner)
}
