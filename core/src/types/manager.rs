use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::HashMap;

use crate::types::types::Type;

/// Builds and interns host type descriptions.
///
/// Every constructor returns an arena reference; asking twice for the same
/// structure returns the same reference.
pub struct TypeManager<'a> {
    // Arena holding all types from this TypeManager.
    arena: &'a Bump,
    interned_strs: RefCell<HashMap<&'a str, &'a str>>,
    interned: RefCell<HashMap<Type<'a>, &'a Type<'a>>>,
}

impl<'a> TypeManager<'a> {
    pub fn new(arena: &'a Bump) -> &'a Self {
        arena.alloc(Self {
            arena,
            interned_strs: RefCell::new(HashMap::new()),
            interned: RefCell::new(HashMap::new()),
        })
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub(crate) fn intern_str(&self, s: &str) -> &'a str {
        if let Some(&interned_str) = self.interned_strs.borrow().get(s) {
            return interned_str;
        }
        let arena_str = self.arena.alloc_str(s);
        self.interned_strs.borrow_mut().insert(arena_str, arena_str);
        arena_str
    }

    fn intern(&self, ty: Type<'a>) -> &'a Type<'a> {
        let existing = self.interned.borrow().get(&ty).copied();
        if let Some(interned_ty) = existing {
            return interned_ty;
        }
        let arena_ty = self.arena.alloc(ty.clone());
        self.interned.borrow_mut().insert(ty, arena_ty);
        arena_ty
    }

    // Factory methods for types.
    pub fn nil(&self) -> &'a Type<'a> {
        self.intern(Type::Nil)
    }
    pub fn bool(&self) -> &'a Type<'a> {
        self.intern(Type::Bool)
    }
    pub fn int(&self) -> &'a Type<'a> {
        self.intern(Type::Int)
    }
    pub fn float(&self) -> &'a Type<'a> {
        self.intern(Type::Float)
    }
    pub fn str(&self) -> &'a Type<'a> {
        self.intern(Type::Str)
    }
    pub fn duration(&self) -> &'a Type<'a> {
        self.intern(Type::Duration)
    }
    pub fn any(&self) -> &'a Type<'a> {
        self.intern(Type::Any)
    }

    pub fn array(&self, elem_ty: &'a Type<'a>) -> &'a Type<'a> {
        self.intern(Type::Array(elem_ty))
    }

    pub fn map(&self, key_ty: &'a Type<'a>, val_ty: &'a Type<'a>) -> &'a Type<'a> {
        self.intern(Type::Map(key_ty, val_ty))
    }

    /// A struct type. `fields` keep their order (it is the runtime field
    /// order); method types must take the receiver as their first parameter.
    pub fn structure(
        &self,
        name: &str,
        fields: &[(&str, &'a Type<'a>)],
        methods: &[(&str, &'a Type<'a>)],
    ) -> &'a Type<'a> {
        let fields = self
            .arena
            .alloc_slice_fill_iter(fields.iter().map(|&(n, ty)| (self.intern_str(n), ty)));
        let methods = self
            .arena
            .alloc_slice_fill_iter(methods.iter().map(|&(n, ty)| (self.intern_str(n), ty)));
        self.intern(Type::Struct {
            name: self.intern_str(name),
            fields,
            methods,
        })
    }

    pub fn function(&self, params: &[&'a Type<'a>], ret: &'a Type<'a>) -> &'a Type<'a> {
        self.make_function(None, params, ret, false)
    }

    /// A function whose last parameter (an array type) absorbs any number of
    /// trailing arguments.
    pub fn variadic_function(&self, params: &[&'a Type<'a>], ret: &'a Type<'a>) -> &'a Type<'a> {
        self.make_function(None, params, ret, true)
    }

    /// A nominal function type.
    pub fn named_function(
        &self,
        name: &str,
        params: &[&'a Type<'a>],
        ret: &'a Type<'a>,
    ) -> &'a Type<'a> {
        let name = self.intern_str(name);
        self.make_function(Some(name), params, ret, false)
    }

    pub(crate) fn make_function(
        &self,
        name: Option<&'a str>,
        params: &[&'a Type<'a>],
        ret: &'a Type<'a>,
        variadic: bool,
    ) -> &'a Type<'a> {
        self.intern(Type::Function {
            name,
            params: self.arena.alloc_slice_copy(params),
            ret,
            variadic,
        })
    }
}
