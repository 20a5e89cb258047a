//! Unit tests for the build context.

use super::builder::{BuildContext, BuilderState};
use super::cache::{CacheDriver, CacheKey, MemoryCacheDriver};
use super::names::{
    extract_namespace_name, extract_type_name, is_primitive_type, qualify, DEFAULT_NAMESPACE,
};
use super::registry::Registry;
use crate::ast::ast::{Node, NodeId};
use crate::ast::declarations::{CallableOwner, TypeId, TypeKind};
use crate::lexer::lexer::tokenize;

#[test]
fn test_extract_type_name() {
    assert_eq!(extract_type_name("Foo\\Bar\\Baz"), "Baz");
    assert_eq!(extract_type_name("\\Baz"), "Baz");
    assert_eq!(extract_type_name("Baz"), "Baz");
}

#[test]
fn test_extract_namespace_name() {
    assert_eq!(extract_namespace_name("Foo\\Bar\\Baz"), "Foo\\Bar");
    assert_eq!(extract_namespace_name("\\Foo\\Bar\\Baz"), "Foo\\Bar");
    assert_eq!(extract_namespace_name("Baz"), DEFAULT_NAMESPACE);
    assert_eq!(extract_namespace_name("\\Baz"), DEFAULT_NAMESPACE);
}

#[test]
fn test_extract_namespace_name_of_builtin() {
    assert_eq!(extract_namespace_name("Exception"), "+core");
    assert_eq!(extract_namespace_name("ArrayObject"), "+spl");
    assert_eq!(extract_namespace_name("\\ReflectionClass"), "+reflection");
}

#[test]
fn test_primitive_types() {
    assert!(is_primitive_type("array"));
    assert!(is_primitive_type("INT"));
    assert!(!is_primitive_type("Foo"));
}

#[test]
fn test_qualify_leaves_default_namespace_implicit() {
    assert_eq!(qualify(DEFAULT_NAMESPACE, "Foo"), "Foo");
    assert_eq!(qualify("Bar", "Foo"), "Bar\\Foo");
}

#[test]
fn test_registry_find_unique() {
    let mut registry = Registry::default();
    registry.insert("Foo", "a", TypeId(0));
    assert_eq!(registry.find_unique("foo"), Some(TypeId(0)));

    registry.insert("Foo", "b", TypeId(1));
    assert_eq!(registry.find_unique("foo"), None);
    assert_eq!(registry.find_exact("FOO", "B"), Some(TypeId(1)));
}

#[test]
fn test_registry_remove() {
    let mut registry = Registry::default();
    registry.insert("Foo", "a", TypeId(0));
    registry.remove(TypeId(0));
    assert!(registry.is_empty());
    assert!(!registry.contains_name("Foo"));
}

#[test]
fn test_build_class_registers_in_namespace() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("Foo\\Bar");

    let declaration = builder.type_decl(class);
    assert_eq!(declaration.name, "Bar");
    assert_eq!(declaration.kind, TypeKind::Class);
    assert!(declaration.user_defined);

    let namespace = builder.find_namespace("foo").unwrap();
    assert_eq!(builder.namespace(namespace).types(), &[class]);
    assert_eq!(builder.qualified_type_name(class), "Foo\\Bar");
}

#[test]
fn test_build_twice_gives_distinct_declarations() {
    let mut builder = BuildContext::new();
    let first = builder.build_class("Foo");
    let second = builder.build_class("Foo");
    assert_ne!(first, second);
}

#[test]
fn test_get_class_returns_built_class() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("Foo\\Bar");

    assert_eq!(builder.get_class("foo\\bar"), class);
    assert_eq!(builder.get_class("\\FOO\\BAR"), class);
    assert_eq!(builder.state(), BuilderState::Frozen);
}

#[test]
fn test_get_class_is_stable() {
    let mut builder = BuildContext::new();
    let first = builder.get_class("Missing\\Thing");
    let second = builder.get_class("Missing\\Thing");

    assert_eq!(first, second);
    assert!(!builder.type_decl(first).user_defined);
}

#[test]
fn test_get_class_from_default_namespace_finds_unique_name() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("Foo\\Bar");
    assert_eq!(builder.get_class("Bar"), class);
}

#[test]
fn test_get_class_from_default_namespace_with_ambiguous_name() {
    let mut builder = BuildContext::new();
    let first = builder.build_class("Foo\\Bar");
    let second = builder.build_class("Baz\\Bar");

    let found = builder.get_class("Bar");
    assert_ne!(found, first);
    assert_ne!(found, second);
}

#[test]
fn test_get_interface_and_trait() {
    let mut builder = BuildContext::new();
    let interface = builder.build_interface("A\\Countable2");
    let used = builder.build_trait("A\\Helper");

    assert_eq!(builder.get_interface("A\\Countable2"), interface);
    assert_eq!(builder.get_trait("a\\helper"), used);
}

#[test]
fn test_get_class_or_interface_prefers_class() {
    let mut builder = BuildContext::new();
    let interface = builder.build_interface("X\\Shape");
    let class = builder.build_class("X\\Shape");

    assert_eq!(builder.get_class_or_interface("X\\Shape"), class);
    assert_ne!(builder.get_class_or_interface("X\\Shape"), interface);
}

#[test]
fn test_get_class_or_interface_finds_interface() {
    let mut builder = BuildContext::new();
    let interface = builder.build_interface("X\\Shape");
    assert_eq!(builder.get_class_or_interface("X\\Shape"), interface);
}

#[test]
fn test_get_class_or_interface_unknown_placeholder() {
    let mut builder = BuildContext::new();
    let unknown = builder.get_class_or_interface("Nowhere\\Thing");

    let declaration = builder.type_decl(unknown);
    assert_eq!(declaration.kind, TypeKind::Unknown);
    assert_eq!(declaration.kind.effective(), TypeKind::Class);
    assert_eq!(builder.get_class("Nowhere\\Thing"), unknown);
}

#[test]
#[should_panic(expected = "builder state is frozen")]
fn test_build_after_freeze_panics() {
    let mut builder = BuildContext::new();
    builder.get_class("Foo");
    builder.build_class("Bar");
}

#[test]
#[should_panic(expected = "builder state is frozen")]
fn test_build_function_after_freeze_panics() {
    let mut builder = BuildContext::new();
    builder.find_function("foo");
    builder.build_function("bar");
}

#[test]
fn test_build_namespace_allowed_while_frozen() {
    let mut builder = BuildContext::new();
    builder.get_class("Foo");
    let namespace = builder.build_namespace("Late");
    assert_eq!(builder.build_namespace("LATE"), namespace);
}

#[test]
fn test_freeze_drops_detached_types() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("Foo\\Orphan");
    builder.detach_type(class);

    let found = builder.get_class("Foo\\Orphan");
    assert_ne!(found, class);
}

#[test]
fn test_restore_class_after_freeze() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("Foo\\Bar");
    builder.detach_type(class);
    builder.get_class("Other");

    let namespace = builder.build_namespace("Foo");
    builder.move_type(class, namespace);
    builder.restore_class(class);
    assert_eq!(builder.get_class("Foo\\Bar"), class);
}

#[test]
fn test_traits_survive_freeze() {
    let mut builder = BuildContext::new();
    let used = builder.build_trait("T\\Loggable");
    builder.get_class("Other");
    assert_eq!(builder.find_trait("T\\Loggable"), Some(used));
}

#[test]
fn test_build_and_find_function() {
    let mut builder = BuildContext::new();
    let function = builder.build_function("Util\\format");

    assert_eq!(builder.find_function("util\\FORMAT"), Some(function));
    assert_eq!(builder.find_function("format"), Some(function));
    assert!(matches!(
        builder.callable(function).owner,
        Some(CallableOwner::Namespace(_))
    ));
}

#[test]
fn test_get_function_synthesises_missing_function() {
    let mut builder = BuildContext::new();
    let declared = builder.build_function("Util\\format");

    assert_eq!(builder.get_function("Util\\format"), declared);

    let missing = builder.get_function("Util\\parse");
    assert_ne!(missing, declared);
    assert_eq!(builder.callable(missing).name, "parse");
    assert_eq!(builder.get_function("util\\parse"), missing);

    let util = builder.find_namespace("Util").unwrap();
    assert_eq!(builder.namespace(util).functions(), &[declared, missing]);
}

#[test]
fn test_move_type_between_namespaces() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("A\\Foo");
    let target = builder.build_namespace("B");
    builder.move_type(class, target);

    let source = builder.find_namespace("A").unwrap();
    assert!(builder.namespace(source).types().is_empty());
    assert_eq!(builder.namespace(target).types(), &[class]);
    assert_eq!(builder.get_class("B\\Foo"), class);
}

#[test]
fn test_move_method_between_types() {
    let mut builder = BuildContext::new();
    let first = builder.build_class("First");
    let second = builder.build_class("Second");
    let method = builder.build_method("run");

    builder.add_method(first, method);
    builder.move_method(method, second);

    assert!(builder.type_decl(first).methods().is_empty());
    assert_eq!(builder.type_decl(second).methods(), &[method]);
    assert_eq!(
        builder.callable(method).owner,
        Some(CallableOwner::Type(second))
    );
}

#[test]
fn test_type_dependencies_exclude_self() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("App\\Service");
    let method = builder.build_method("run");
    builder.add_method(class, method);

    builder.type_decl_mut(class).dependencies.add("App\\Repository");
    builder.type_decl_mut(class).dependencies.add("App\\Service");
    builder.callable_mut(method).dependencies.add("app\\repository");
    builder.callable_mut(method).dependencies.add("App\\Logger");

    let dependencies = builder.type_dependencies(class);
    let names: Vec<String> = dependencies
        .iter()
        .map(|id| builder.qualified_type_name(*id))
        .collect();
    assert_eq!(names, vec!["App\\Repository", "App\\Logger"]);
}

#[test]
fn test_resolve_reference() {
    let mut builder = BuildContext::new();
    let class = builder.build_class("App\\Service");
    let node = builder
        .ast_mut()
        .add(Node::class_or_interface_reference("App\\Service"));
    let self_node = builder
        .ast_mut()
        .add(Node::self_reference("self").with_target(Some(class)));
    let literal = builder.ast_mut().add(Node::literal("1"));

    assert_eq!(builder.resolve_reference(node), Some(class));
    assert_eq!(builder.resolve_reference(self_node), Some(class));
    assert_eq!(builder.resolve_reference(literal), None);
}

#[test]
fn test_cache_driver_round_trip() {
    let tokens = tokenize("<?php $a;".to_string(), None).unwrap();
    let mut cache = MemoryCacheDriver::new();
    let key = CacheKey::new("node", 3);

    cache.store(key, tokens.clone());
    assert_eq!(cache.restore(&key), Some(tokens));
    cache.remove(&key);
    assert!(cache.restore(&key).is_none());
}

#[test]
fn test_node_tokens_and_lines() {
    let tokens = tokenize("<?php\n$a\n=\n1;".to_string(), None).unwrap();
    let mut builder = BuildContext::new();
    builder.set_cache(Box::new(MemoryCacheDriver::new()));

    let node = NodeId(0);
    builder.store_node_tokens(node, tokens[1..5].to_vec());
    assert_eq!(builder.node_tokens(node).len(), 4);
    assert_eq!(builder.node_start_line(node), Some(2));
    assert_eq!(builder.node_end_line(node), Some(4));
    assert_eq!(builder.node_start_line(NodeId(9)), None);
}
