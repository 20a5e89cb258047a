//! The build context: canonical registry of declared entities.
//!
//! While `Building`, the parser declares classes, interfaces, traits and
//! functions freely. The first lookup (`find_*` / `get_*`) freezes the
//! context: declared classes and interfaces move into frozen registries and
//! any further public `build_*` call is a fatal state error. Lookups that miss
//! synthesise placeholders through a private path that ignores the freeze.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind},
        declarations::{
            Callable, CallableId, CallableKind, CallableOwner, Namespace, NamespaceId, TypeDecl,
            TypeId, TypeKind,
        },
    },
    errors::errors::StateError,
    lexer::tokens::Token,
};

use super::{
    cache::{CacheDriver, CacheKey, MemoryCacheDriver},
    names::{extract_namespace_name, extract_type_name, is_default_namespace, qualify},
    registry::Registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Building,
    Frozen,
}

pub struct BuildContext {
    state: BuilderState,
    namespaces: Vec<Namespace>,
    namespace_index: FxHashMap<String, NamespaceId>,
    types: Vec<TypeDecl>,
    callables: Vec<Callable>,
    classes: Registry<TypeId>,
    interfaces: Registry<TypeId>,
    traits: Registry<TypeId>,
    functions: Registry<CallableId>,
    frozen_classes: Registry<TypeId>,
    frozen_interfaces: Registry<TypeId>,
    ast: Ast,
    cache: Box<dyn CacheDriver>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    pub fn new() -> Self {
        BuildContext {
            state: BuilderState::Building,
            namespaces: Vec::new(),
            namespace_index: FxHashMap::default(),
            types: Vec::new(),
            callables: Vec::new(),
            classes: Registry::default(),
            interfaces: Registry::default(),
            traits: Registry::default(),
            functions: Registry::default(),
            frozen_classes: Registry::default(),
            frozen_interfaces: Registry::default(),
            ast: Ast::new(),
            cache: Box::new(MemoryCacheDriver::new()),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == BuilderState::Frozen
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    pub fn set_cache(&mut self, cache: Box<dyn CacheDriver>) {
        self.cache = cache;
    }

    // ---- token spans ------------------------------------------------------

    pub fn store_node_tokens(&mut self, node: NodeId, tokens: Vec<Token>) {
        self.cache.store(CacheKey::new("node", node.0), tokens);
    }

    pub fn node_tokens(&self, node: NodeId) -> Vec<Token> {
        self.cache
            .restore(&CacheKey::new("node", node.0))
            .unwrap_or_default()
    }

    pub fn node_start_line(&self, node: NodeId) -> Option<u32> {
        self.node_tokens(node).first().map(Token::start_line)
    }

    pub fn node_end_line(&self, node: NodeId) -> Option<u32> {
        self.node_tokens(node).last().map(Token::end_line)
    }

    pub fn store_callable_tokens(&mut self, callable: CallableId, tokens: Vec<Token>) {
        self.cache.store(CacheKey::new("callable", callable.0), tokens);
    }

    /// Tokens of the callable body, without the enclosing braces.
    pub fn callable_tokens(&self, callable: CallableId) -> Vec<Token> {
        self.cache
            .restore(&CacheKey::new("callable", callable.0))
            .unwrap_or_default()
    }

    // ---- namespaces -------------------------------------------------------

    /// Returns the namespace with this (case-insensitive) name, creating it on
    /// first use. Allowed in every state.
    pub fn build_namespace(&mut self, name: &str) -> NamespaceId {
        let key = name.to_lowercase();
        if let Some(id) = self.namespace_index.get(&key) {
            return *id;
        }

        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace::new(id, name));
        self.namespace_index.insert(key, id);
        id
    }

    pub fn find_namespace(&self, name: &str) -> Option<NamespaceId> {
        self.namespace_index.get(&name.to_lowercase()).copied()
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.0 as usize]
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    // ---- declarations -----------------------------------------------------

    pub fn build_class(&mut self, qualified_name: &str) -> TypeId {
        self.check_builder_state("class", qualified_name);
        self.build_type(TypeKind::Class, qualified_name, true)
    }

    pub fn build_interface(&mut self, qualified_name: &str) -> TypeId {
        self.check_builder_state("interface", qualified_name);
        self.build_type(TypeKind::Interface, qualified_name, true)
    }

    pub fn build_trait(&mut self, qualified_name: &str) -> TypeId {
        self.check_builder_state("trait", qualified_name);
        self.build_type(TypeKind::Trait, qualified_name, true)
    }

    /// Free function, registered under the namespace part of its name.
    pub fn build_function(&mut self, qualified_name: &str) -> CallableId {
        self.check_builder_state("function", qualified_name);
        self.build_function_internal(qualified_name)
    }

    /// Method without an owner; attach it with `add_method`.
    pub fn build_method(&mut self, name: &str) -> CallableId {
        self.check_builder_state("method", name);

        let id = CallableId(self.callables.len() as u32);
        self.callables
            .push(Callable::new(id, CallableKind::Method, name));
        id
    }

    fn build_type(&mut self, kind: TypeKind, qualified_name: &str, user_defined: bool) -> TypeId {
        let local_name = extract_type_name(qualified_name).to_string();
        let namespace_name = extract_namespace_name(qualified_name);

        let id = TypeId(self.types.len() as u32);
        let mut declaration = TypeDecl::new(id, kind, &local_name);
        declaration.user_defined = user_defined;
        self.types.push(declaration);

        self.store_type(id, &namespace_name);
        id
    }

    fn build_function_internal(&mut self, qualified_name: &str) -> CallableId {
        let local_name = extract_type_name(qualified_name).to_string();
        let namespace_name = extract_namespace_name(qualified_name);

        let id = CallableId(self.callables.len() as u32);
        self.callables
            .push(Callable::new(id, CallableKind::Function, &local_name));
        self.store_function(id, &namespace_name);
        id
    }

    /// Builds a placeholder for a reference target that was never declared.
    /// Reachable only from the lookup path, so it ignores the frozen state.
    fn build_type_internal(&mut self, kind: TypeKind, qualified_name: &str) -> TypeId {
        trace!(
            target: "builder",
            name = qualified_name,
            kind = kind.label(),
            "synthesising placeholder"
        );
        self.build_type(kind, qualified_name, false)
    }

    fn store_type(&mut self, id: TypeId, namespace_name: &str) {
        let local_name = self.types[id.0 as usize].name.clone();
        match self.types[id.0 as usize].kind {
            TypeKind::Class | TypeKind::Unknown => {
                self.classes.insert(&local_name, namespace_name, id)
            }
            TypeKind::Interface => self.interfaces.insert(&local_name, namespace_name, id),
            TypeKind::Trait => self.traits.insert(&local_name, namespace_name, id),
        }

        let namespace = self.build_namespace(namespace_name);
        self.attach_type(id, namespace);
    }

    fn store_function(&mut self, id: CallableId, namespace_name: &str) {
        let local_name = self.callables[id.0 as usize].name.clone();
        self.functions.insert(&local_name, namespace_name, id);

        let namespace = self.build_namespace(namespace_name);
        if let Some(CallableOwner::Namespace(old)) = self.callables[id.0 as usize].owner {
            self.namespaces[old.0 as usize]
                .functions
                .retain(|known| *known != id);
        }
        self.callables[id.0 as usize].owner = Some(CallableOwner::Namespace(namespace));
        let functions = &mut self.namespaces[namespace.0 as usize].functions;
        if !functions.contains(&id) {
            functions.push(id);
        }
    }

    fn check_builder_state(&self, kind: &'static str, name: &str) {
        if self.state == BuilderState::Frozen {
            panic!(
                "{}",
                StateError::BuilderFrozen {
                    kind,
                    name: name.to_string()
                }
            );
        }
    }

    // ---- reparenting ------------------------------------------------------

    fn attach_type(&mut self, id: TypeId, namespace: NamespaceId) {
        if let Some(old) = self.types[id.0 as usize].namespace {
            self.namespaces[old.0 as usize]
                .types
                .retain(|known| *known != id);
        }
        self.types[id.0 as usize].namespace = Some(namespace);
        let types = &mut self.namespaces[namespace.0 as usize].types;
        if !types.contains(&id) {
            types.push(id);
        }
    }

    /// Moves a type into another namespace, updating both sides and the
    /// building registry.
    pub fn move_type(&mut self, id: TypeId, namespace: NamespaceId) {
        let namespace_name = self.namespaces[namespace.0 as usize].name.clone();
        let local_name = self.types[id.0 as usize].name.clone();

        let registry = match self.types[id.0 as usize].kind {
            TypeKind::Class | TypeKind::Unknown => &mut self.classes,
            TypeKind::Interface => &mut self.interfaces,
            TypeKind::Trait => &mut self.traits,
        };
        registry.remove(id);
        registry.insert(&local_name, &namespace_name, id);

        self.attach_type(id, namespace);
    }

    /// Removes a type from its namespace. Detached types are dropped from
    /// the lookup registries when the context freezes.
    pub fn detach_type(&mut self, id: TypeId) {
        if let Some(old) = self.types[id.0 as usize].namespace.take() {
            self.namespaces[old.0 as usize]
                .types
                .retain(|known| *known != id);
        }
    }

    /// Attaches a method to a type, detaching it from any previous owner.
    pub fn add_method(&mut self, owner: TypeId, method: CallableId) {
        if let Some(CallableOwner::Type(old)) = self.callables[method.0 as usize].owner {
            self.types[old.0 as usize]
                .methods
                .retain(|known| *known != method);
        }
        self.callables[method.0 as usize].owner = Some(CallableOwner::Type(owner));
        let methods = &mut self.types[owner.0 as usize].methods;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }

    pub fn move_method(&mut self, method: CallableId, new_owner: TypeId) {
        self.add_method(new_owner, method);
    }

    // ---- lookups ----------------------------------------------------------

    fn freeze(&mut self) {
        if self.state == BuilderState::Frozen {
            return;
        }
        self.state = BuilderState::Frozen;

        let types = &self.types;
        let has_namespace = |id: TypeId| types[id.0 as usize].namespace.is_some();
        self.frozen_classes = self.classes.filtered(has_namespace);
        self.frozen_interfaces = self.interfaces.filtered(has_namespace);

        debug!(
            target: "builder",
            classes = self.frozen_classes.len(),
            interfaces = self.frozen_interfaces.len(),
            dropped = self.classes.len() + self.interfaces.len()
                - self.frozen_classes.len()
                - self.frozen_interfaces.len(),
            "builder frozen"
        );

        self.classes.clear();
        self.interfaces.clear();
    }

    fn find_type(registry: &Registry<TypeId>, qualified_name: &str) -> Option<TypeId> {
        let local_name = extract_type_name(qualified_name);
        let namespace_name = extract_namespace_name(qualified_name);

        if let Some(id) = registry.find_exact(local_name, &namespace_name) {
            return Some(id);
        }
        if is_default_namespace(&namespace_name) {
            return registry.find_unique(local_name);
        }
        None
    }

    pub fn find_class(&mut self, qualified_name: &str) -> Option<TypeId> {
        self.freeze();
        Self::find_type(&self.frozen_classes, qualified_name)
            .or_else(|| Self::find_type(&self.classes, qualified_name))
    }

    pub fn find_interface(&mut self, qualified_name: &str) -> Option<TypeId> {
        self.freeze();
        Self::find_type(&self.frozen_interfaces, qualified_name)
            .or_else(|| Self::find_type(&self.interfaces, qualified_name))
    }

    pub fn find_trait(&mut self, qualified_name: &str) -> Option<TypeId> {
        self.freeze();
        Self::find_type(&self.traits, qualified_name)
    }

    pub fn find_function(&mut self, qualified_name: &str) -> Option<CallableId> {
        self.freeze();
        let local_name = extract_type_name(qualified_name);
        let namespace_name = extract_namespace_name(qualified_name);

        self.functions
            .find_exact(local_name, &namespace_name)
            .or_else(|| {
                if is_default_namespace(&namespace_name) {
                    self.functions.find_unique(local_name)
                } else {
                    None
                }
            })
    }

    pub fn get_class(&mut self, qualified_name: &str) -> TypeId {
        match self.find_class(qualified_name) {
            Some(id) => id,
            None => self.build_type_internal(TypeKind::Class, qualified_name),
        }
    }

    pub fn get_interface(&mut self, qualified_name: &str) -> TypeId {
        match self.find_interface(qualified_name) {
            Some(id) => id,
            None => self.build_type_internal(TypeKind::Interface, qualified_name),
        }
    }

    pub fn get_trait(&mut self, qualified_name: &str) -> TypeId {
        match self.find_trait(qualified_name) {
            Some(id) => id,
            None => self.build_type_internal(TypeKind::Trait, qualified_name),
        }
    }

    pub fn get_function(&mut self, qualified_name: &str) -> CallableId {
        if let Some(id) = self.find_function(qualified_name) {
            return id;
        }

        trace!(target: "builder", name = qualified_name, "synthesising function placeholder");
        self.build_function_internal(qualified_name)
    }

    /// Class first, then interface; a miss yields an `Unknown` placeholder
    /// that is registered and treated as a class.
    pub fn get_class_or_interface(&mut self, qualified_name: &str) -> TypeId {
        if let Some(id) = self.find_class(qualified_name) {
            return id;
        }
        if let Some(id) = self.find_interface(qualified_name) {
            return id;
        }
        self.build_type_internal(TypeKind::Unknown, qualified_name)
    }

    // ---- restore ----------------------------------------------------------

    /// Registers a previously built class again so later lookups reuse it.
    pub fn restore_class(&mut self, id: TypeId) {
        self.restore_type(id);
    }

    pub fn restore_interface(&mut self, id: TypeId) {
        self.restore_type(id);
    }

    pub fn restore_trait(&mut self, id: TypeId) {
        self.restore_type(id);
    }

    fn restore_type(&mut self, id: TypeId) {
        let declaration = &self.types[id.0 as usize];
        let namespace_name = match declaration.namespace {
            Some(namespace) => self.namespaces[namespace.0 as usize].name.clone(),
            None => extract_namespace_name(&declaration.name),
        };
        trace!(target: "builder", name = %declaration.name, namespace = %namespace_name, "restoring type");
        self.store_type(id, &namespace_name);
    }

    pub fn restore_function(&mut self, id: CallableId) {
        let namespace_name = match self.callables[id.0 as usize].owner {
            Some(CallableOwner::Namespace(namespace)) => {
                self.namespaces[namespace.0 as usize].name.clone()
            }
            _ => extract_namespace_name(&self.callables[id.0 as usize].name),
        };
        self.store_function(id, &namespace_name);
    }

    // ---- accessors --------------------------------------------------------

    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    pub fn type_decl_mut(&mut self, id: TypeId) -> &mut TypeDecl {
        &mut self.types[id.0 as usize]
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn callable(&self, id: CallableId) -> &Callable {
        &self.callables[id.0 as usize]
    }

    pub fn callable_mut(&mut self, id: CallableId) -> &mut Callable {
        &mut self.callables[id.0 as usize]
    }

    pub fn callables(&self) -> &[Callable] {
        &self.callables
    }

    /// Namespace-qualified name of a type, the default namespace left implicit.
    pub fn qualified_type_name(&self, id: TypeId) -> String {
        let declaration = self.type_decl(id);
        match declaration.namespace {
            Some(namespace) => qualify(&self.namespace(namespace).name, &declaration.name),
            None => declaration.name.clone(),
        }
    }

    // ---- dependency resolution -------------------------------------------

    /// Resolves the types a callable depends on. Freezes the context.
    pub fn callable_dependencies(&mut self, id: CallableId) -> Vec<TypeId> {
        let names = self.callable(id).dependencies.names().to_vec();
        let mut resolved = Vec::new();
        for name in names {
            let type_id = self.get_class_or_interface(&name);
            if !resolved.contains(&type_id) {
                resolved.push(type_id);
            }
        }
        resolved
    }

    /// Resolves the types a class, interface or trait depends on, including
    /// those of its methods. The type itself is never listed. Freezes the
    /// context.
    pub fn type_dependencies(&mut self, id: TypeId) -> Vec<TypeId> {
        let declaration = self.type_decl(id);
        let names = declaration.dependencies.names().to_vec();
        let traits = declaration.traits.clone();
        let methods = declaration.methods.clone();

        let mut resolved = Vec::new();
        let push = |type_id: TypeId, resolved: &mut Vec<TypeId>| {
            if type_id != id && !resolved.contains(&type_id) {
                resolved.push(type_id);
            }
        };

        for name in names {
            let type_id = self.get_class_or_interface(&name);
            push(type_id, &mut resolved);
        }
        for name in traits {
            let type_id = self.get_trait(&name);
            push(type_id, &mut resolved);
        }
        for method in methods {
            for type_id in self.callable_dependencies(method) {
                push(type_id, &mut resolved);
            }
        }
        resolved
    }

    /// Declaration a reference node points at. Freezes the context for
    /// name-based references.
    pub fn resolve_reference(&mut self, node: NodeId) -> Option<TypeId> {
        let (kind, image, target) = {
            let node = self.ast.get(node);
            (node.kind, node.image.clone(), node.target)
        };

        match kind {
            NodeKind::SelfReference | NodeKind::StaticReference => target,
            // `parent` itself is left in the image when the class has no parent.
            NodeKind::ParentReference if image.eq_ignore_ascii_case("parent") => target,
            NodeKind::ParentReference => target.or_else(|| Some(self.get_class(&image))),
            NodeKind::ClassReference => Some(self.get_class(&image)),
            NodeKind::TraitReference => Some(self.get_trait(&image)),
            NodeKind::ClassOrInterfaceReference => Some(self.get_class_or_interface(&image)),
            _ => None,
        }
    }
}
