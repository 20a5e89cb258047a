use std::rc::Rc;

use bitflags::bitflags;

use super::ast::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(pub u32);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const PUBLIC = 1 << 2;
        const PROTECTED = 1 << 3;
        const PRIVATE = 1 << 4;
        const STATIC = 1 << 5;
        const READONLY = 1 << 6;
    }
}

impl Modifiers {
    pub const VISIBILITY: Modifiers = Modifiers::PUBLIC
        .union(Modifiers::PROTECTED)
        .union(Modifiers::PRIVATE);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Trait,
    /// Placeholder for a name that was only ever seen in a class-or-interface
    /// position and never declared.
    Unknown,
}

impl TypeKind {
    /// Unknown placeholders count as classes. This is a best-effort guess.
    pub fn effective(&self) -> TypeKind {
        match self {
            TypeKind::Unknown => TypeKind::Class,
            kind => *kind,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Trait => "trait",
            TypeKind::Unknown => "class-or-interface",
        }
    }
}

/// Namespace or package. Holds its types and free functions by id.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub id: NamespaceId,
    pub name: String,
    pub(crate) types: Vec<TypeId>,
    pub(crate) functions: Vec<CallableId>,
}

impl Namespace {
    pub fn new(id: NamespaceId, name: &str) -> Self {
        Namespace {
            id,
            name: name.to_string(),
            types: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    pub fn functions(&self) -> &[CallableId] {
        &self.functions
    }

    pub fn is_user_defined(&self) -> bool {
        !self.name.starts_with('+')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_hint: Option<String>,
    pub doc_comment: Option<String>,
    pub default_value: Option<NodeId>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub value: Option<NodeId>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Resolved type hint image, qualified for class types.
    pub type_hint: Option<String>,
    pub by_reference: bool,
    pub variadic: bool,
    pub default_value: Option<NodeId>,
    /// Visibility and `readonly` of a promoted constructor parameter.
    pub modifiers: Modifiers,
}

/// Case-insensitive, insertion ordered set of qualified type names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dependencies(Vec<String>);

impl Dependencies {
    pub fn add(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return;
        }
        self.0.push(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|known| known.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Class, interface or trait declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: TypeId,
    pub kind: TypeKind,
    /// Local (unqualified) name.
    pub name: String,
    /// Owning namespace back reference; `None` once detached.
    pub namespace: Option<NamespaceId>,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
    pub source_file: Option<Rc<String>>,
    pub start_line: u32,
    pub end_line: u32,
    /// Qualified image of the `extends` clause of a class.
    pub parent_class: Option<String>,
    /// Qualified images of implemented (class) or extended (interface) interfaces.
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub(crate) methods: Vec<CallableId>,
    pub properties: Vec<Property>,
    pub constants: Vec<Constant>,
    pub dependencies: Dependencies,
    /// False for placeholders synthesised by a lookup.
    pub user_defined: bool,
}

impl TypeDecl {
    pub fn new(id: TypeId, kind: TypeKind, name: &str) -> Self {
        TypeDecl {
            id,
            kind,
            name: name.to_string(),
            namespace: None,
            modifiers: Modifiers::empty(),
            doc_comment: None,
            source_file: None,
            start_line: 0,
            end_line: 0,
            parent_class: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
            dependencies: Dependencies::default(),
            user_defined: false,
        }
    }

    pub fn methods(&self) -> &[CallableId] {
        &self.methods
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT) || self.kind == TypeKind::Interface
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableOwner {
    Namespace(NamespaceId),
    Type(TypeId),
}

/// Free function or method.
#[derive(Debug, Clone)]
pub struct Callable {
    pub id: CallableId,
    pub kind: CallableKind,
    pub name: String,
    pub owner: Option<CallableOwner>,
    pub modifiers: Modifiers,
    pub returns_reference: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    /// Root `ScopeStatement` of the body; `None` for abstract and interface methods.
    pub body: Option<NodeId>,
    pub doc_comment: Option<String>,
    pub source_file: Option<Rc<String>>,
    pub start_line: u32,
    pub end_line: u32,
    pub dependencies: Dependencies,
}

impl Callable {
    pub fn new(id: CallableId, kind: CallableKind, name: &str) -> Self {
        Callable {
            id,
            kind,
            name: name.to_string(),
            owner: None,
            modifiers: Modifiers::empty(),
            returns_reference: false,
            parameters: Vec::new(),
            return_type: None,
            body: None,
            doc_comment: None,
            source_file: None,
            start_line: 0,
            end_line: 0,
            dependencies: Dependencies::default(),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
