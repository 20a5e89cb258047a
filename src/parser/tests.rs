//! Unit tests for the parser module.
//!
//! This module contains tests for:
//! - Namespace and use alias resolution
//! - Type, member and callable declarations
//! - Package annotations
//! - Dependency recording and callable token spans
//! - Fatal parse errors
//! - The token stack and the alias symbol table

use proptest::prelude::*;

use super::parser::parse;
use super::symbol_table::SymbolTable;
use super::token_stack::TokenStack;
use crate::ast::ast::{NodeId, NodeKind};
use crate::ast::declarations::{Callable, Modifiers, TypeDecl, TypeKind};
use crate::builder::builder::BuildContext;
use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::stream::TokenStream;
use crate::lexer::tokens::{Token, TokenKind};
use crate::{Position, Span};

fn parse_source(source: &str, builder: &mut BuildContext) -> Result<(), Error> {
    let stream = TokenStream::from_source(source, "test.php").unwrap();
    parse(Box::new(stream), builder, false)
}

fn parsed(source: &str) -> BuildContext {
    let mut builder = BuildContext::new();
    parse_source(source, &mut builder).unwrap();
    builder
}

fn find_type<'b>(builder: &'b BuildContext, name: &str) -> &'b TypeDecl {
    builder
        .types()
        .iter()
        .find(|declaration| declaration.name == name)
        .unwrap()
}

fn find_callable<'b>(builder: &'b BuildContext, name: &str) -> &'b Callable {
    builder
        .callables()
        .iter()
        .find(|callable| callable.name == name)
        .unwrap()
}

fn reference_images(builder: &BuildContext, root: NodeId) -> Vec<String> {
    builder
        .ast()
        .find_children_of_kind(root, NodeKind::ClassOrInterfaceReference)
        .into_iter()
        .map(|id| builder.ast().image(id).to_string())
        .collect()
}

#[test]
fn test_namespace_reference_resolution_order() {
    let source = r#"<?php
namespace Foo\Bar;

use Bar\Baz as Baz2;

class C {
    function m() {
        new Bar();
        new Baz2\X();
        new \Test();
    }
}
"#;
    let builder = parsed(source);

    let method = find_callable(&builder, "m");
    let body = method.body.unwrap();
    assert_eq!(
        reference_images(&builder, body),
        vec!["Foo\\Bar\\Bar", "\\Bar\\Baz\\X", "\\Test"]
    );
}

#[test]
fn test_type_is_registered_in_its_namespace() {
    let builder = parsed("<?php\nnamespace Foo\\Bar;\nclass C {}\n");

    let namespace = builder.find_namespace("foo\\bar").unwrap();
    let declaration = find_type(&builder, "C");
    assert_eq!(declaration.namespace, Some(namespace));
    assert_eq!(builder.qualified_type_name(declaration.id), "Foo\\Bar\\C");
    assert_eq!(declaration.start_line, 3);
    assert_eq!(declaration.end_line, 3);
}

#[test]
fn test_braced_namespaces_do_not_share_aliases() {
    let source = r#"<?php
namespace A {
    use X\Y;
    class C { function m() { new Y(); } }
}
namespace B {
    class D { function n() { new Y(); } }
}
"#;
    let builder = parsed(source);

    let first = find_callable(&builder, "m").body.unwrap();
    let second = find_callable(&builder, "n").body.unwrap();
    assert_eq!(reference_images(&builder, first), vec!["\\X\\Y"]);
    assert_eq!(reference_images(&builder, second), vec!["B\\Y"]);
}

#[test]
fn test_grouped_use_and_namespace_relative_names() {
    let source = r#"<?php
namespace App;
use Lib\{Reader, Writer as W};
function run() {
    new Reader();
    new W();
    new namespace\Local();
}
"#;
    let builder = parsed(source);

    let body = find_callable(&builder, "run").body.unwrap();
    assert_eq!(
        reference_images(&builder, body),
        vec!["\\Lib\\Reader", "\\Lib\\Writer", "App\\Local"]
    );
}

#[test]
fn test_global_code_without_namespace() {
    let builder = parsed("<?php\nfunction f() { new Foo(); }\nclass Foo {}\n");

    let body = find_callable(&builder, "f").body.unwrap();
    assert_eq!(reference_images(&builder, body), vec!["Foo"]);
    assert_eq!(builder.qualified_type_name(find_type(&builder, "Foo").id), "Foo");
}

#[test]
fn test_class_members() {
    let source = r#"<?php
abstract class Shape extends Base implements Countable, Named {
    const SIDES = 0, NAME = 'shape';
    var $legacy;
    protected static ?int $count = 0;
    private $a, $b = 2;

    abstract protected function area(): float;

    /** Returns the name. */
    final public static function &name(string $prefix = '', ...$rest) {
        return self::NAME;
    }
}
"#;
    let builder = parsed(source);
    let shape = find_type(&builder, "Shape");

    assert_eq!(shape.kind, TypeKind::Class);
    assert!(shape.is_abstract());
    assert_eq!(shape.parent_class.as_deref(), Some("Base"));
    assert_eq!(shape.interfaces, vec!["Countable", "Named"]);

    let constants: Vec<&str> = shape.constants.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(constants, vec!["SIDES", "NAME"]);

    let properties: Vec<&str> = shape.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(properties, vec!["$legacy", "$count", "$a", "$b"]);
    assert!(shape.properties[0].modifiers.contains(Modifiers::PUBLIC));
    assert_eq!(shape.properties[1].type_hint.as_deref(), Some("?int"));
    assert!(shape.properties[1]
        .modifiers
        .contains(Modifiers::PROTECTED | Modifiers::STATIC));
    assert!(shape.properties[3].default_value.is_some());

    assert_eq!(shape.methods().len(), 2);
    let area = builder.callable(shape.methods()[0]);
    assert!(area.is_abstract());
    assert!(!area.has_body());
    assert_eq!(area.return_type.as_deref(), Some("float"));

    let name = builder.callable(shape.methods()[1]);
    assert!(name.returns_reference);
    assert!(name.is_static());
    assert!(name.modifiers.contains(Modifiers::FINAL | Modifiers::PUBLIC));
    assert_eq!(name.doc_comment.as_deref(), Some("/** Returns the name. */"));
    assert_eq!(name.parameters.len(), 2);
    assert_eq!(name.parameters[0].type_hint.as_deref(), Some("string"));
    assert!(name.parameters[0].default_value.is_some());
    assert!(name.parameters[1].variadic);
    assert_eq!(name.start_line, 11);
    assert_eq!(name.end_line, 13);
}

#[test]
fn test_interface_methods_are_abstract_and_public() {
    let source = r#"<?php
interface Reader extends Closeable, Countable {
    function read(int $length);
}
"#;
    let builder = parsed(source);
    let reader = find_type(&builder, "Reader");

    assert_eq!(reader.kind, TypeKind::Interface);
    assert_eq!(reader.interfaces, vec!["Closeable", "Countable"]);

    let read = builder.callable(reader.methods()[0]);
    assert!(read.is_abstract());
    assert!(read.modifiers.contains(Modifiers::PUBLIC));
}

#[test]
fn test_trait_use_inside_class() {
    let source = r#"<?php
namespace App;
trait Greets { public function hello() {} }
class Person {
    use Greets, \Other\Logs {
        Greets::hello insteadof Logs;
    }
}
"#;
    let builder = parsed(source);

    assert_eq!(find_type(&builder, "Greets").kind, TypeKind::Trait);
    assert_eq!(
        find_type(&builder, "Person").traits,
        vec!["App\\Greets", "\\Other\\Logs"]
    );
}

#[test]
fn test_dependencies_are_recorded() {
    let source = r#"<?php
class A extends B implements C {
    function m(D $d, int $i, self $s): E {
        new F();
        G::h();
        G::CONSTANT;
        new static();
        $name = 'H';
        new $name();
    }
}
"#;
    let builder = parsed(source);

    let a = find_type(&builder, "A");
    assert!(a.dependencies.contains("B"));
    assert!(a.dependencies.contains("C"));
    assert_eq!(a.dependencies.len(), 2);

    let m = find_callable(&builder, "m");
    assert_eq!(m.dependencies.names(), &["D", "E", "F", "G"]);
}

#[test]
fn test_closure_dependencies_belong_to_enclosing_callable() {
    let source = r#"<?php
function outer() {
    $make = function (Foo $foo) use (&$make) {
        return new Bar($foo);
    };
}
"#;
    let builder = parsed(source);

    let outer = find_callable(&builder, "outer");
    assert!(outer.dependencies.contains("Foo"));
    assert!(outer.dependencies.contains("Bar"));
}

#[test]
fn test_callable_tokens_exclude_braces() {
    let mut builder = parsed("<?php\nfunction answer() {\n    return 42;\n}\n");

    let id = find_callable(&builder, "answer").id;
    let images: Vec<String> = builder
        .callable_tokens(id)
        .into_iter()
        .map(|token| token.image)
        .collect();
    assert_eq!(images, vec!["return", "42", ";"]);

    let answer = builder.callable(id);
    assert_eq!(answer.start_line, 2);
    assert_eq!(answer.end_line, 4);
    assert_eq!(builder.get_function("answer"), id);
}

#[test]
fn test_nested_declarations() {
    let source = r#"<?php
function setup() {
    if (!function_exists('helper')) {
        function helper() {}
    }
    class Late {}
}
"#;
    let builder = parsed(source);

    let helper = find_callable(&builder, "helper");
    assert!(helper.has_body());
    assert!(builder.types().iter().any(|t| t.name == "Late"));
}

#[test]
fn test_statements_parse() {
    let source = r#"<?php
declare(strict_types=1);
const LIMIT = 10;
function work(array $items) {
    static $calls = 0, $seen;
    global $config;
    $total = 0;
    foreach ($items as $key => &$item) {
        if ($item === null) { continue; } elseif ($item > LIMIT) { break; } else if ($key) { $total += 1; } else { $total--; }
    }
    for ($i = 0, $j = 1; $i < 10; $i++, $j *= 2) {}
    while (false);
    do { $total++; } while ($total < 3);
    switch ($total) {
        case 1: echo 'one'; break;
        default: echo 'many', "\n";
    }
    try { throw new RuntimeException('x'); }
    catch (LogicException | \RuntimeException $e) { unset($e); }
    finally { print 'done'; }
    retry: goto retry;
    list($a, , $b) = [1, 2, 3];
    $c = isset($a, $b) ? $a ?? $b : (int) $c;
    $d = @$obj?->prop->method(1, ...$items)[0];
    $e = $x instanceof \Countable && !empty($x);
    return $total ** 2 ** 3;
}
?>
<p>html</p>
<?php exit;
"#;
    let builder = parsed(source);
    assert!(find_callable(&builder, "work").has_body());
}

#[test]
fn test_operator_precedence() {
    let builder = parsed("<?php\nfunction f() { $a = 1 + 2 * 3; }\n");
    let ast = builder.ast();

    let body = find_callable(&builder, "f").body.unwrap();
    let assignment = ast.first_child_of_kind(body, NodeKind::AssignmentExpression).unwrap();
    let sum = ast.child(assignment, 1).unwrap();
    assert_eq!(ast.image(sum), "+");
    let product = ast.child(sum, 1).unwrap();
    assert_eq!(ast.image(product), "*");
    assert_eq!(ast.parent(product), Some(sum));
}

#[test]
fn test_node_tokens_cover_infix_expressions() {
    let builder = parsed("<?php\nfunction f() {\n    $a\n        = $b . $c;\n}\n");
    let ast = builder.ast();

    let body = find_callable(&builder, "f").body.unwrap();
    let assignment = ast.first_child_of_kind(body, NodeKind::AssignmentExpression).unwrap();
    let images: Vec<String> = builder
        .node_tokens(assignment)
        .into_iter()
        .map(|token| token.image)
        .collect();
    assert_eq!(images, vec!["$a", "=", "$b", ".", "$c"]);
    assert_eq!(builder.node_start_line(assignment), Some(3));
    assert_eq!(builder.node_end_line(assignment), Some(4));
}

#[test]
fn test_self_and_parent_references_carry_targets() {
    let source = r#"<?php
class Child extends Base {
    function m() {
        self::create();
        parent::create();
    }
}
"#;
    let builder = parsed(source);
    let ast = builder.ast();

    let child = find_type(&builder, "Child").id;
    let body = find_callable(&builder, "m").body.unwrap();

    let self_ref = ast.first_child_of_kind(body, NodeKind::SelfReference).unwrap();
    assert_eq!(ast.get(self_ref).target, Some(child));
    let parent_ref = ast.first_child_of_kind(body, NodeKind::ParentReference).unwrap();
    assert_eq!(ast.image(parent_ref), "Base");
}

#[test]
fn test_package_annotation() {
    let source = r#"<?php
/**
 * @package Acme
 * @subpackage Tools
 */
class Hammer {}

class Nail {}
"#;
    let builder = parsed(source);

    let hammer = find_type(&builder, "Hammer");
    assert_eq!(builder.qualified_type_name(hammer.id), "Acme\\Tools\\Hammer");
    let nail = find_type(&builder, "Nail");
    assert_eq!(builder.qualified_type_name(nail.id), "Nail");
}

#[test]
fn test_file_level_package_annotation() {
    let source = r#"<?php
/**
 * @package Library
 */

require_once 'bootstrap.php';

class Book {}

/**
 * @package Shelf
 */
class Shelf {}

function lend() {}
"#;
    let builder = parsed(source);

    assert_eq!(
        builder.qualified_type_name(find_type(&builder, "Book").id),
        "Library\\Book"
    );
    assert_eq!(
        builder.qualified_type_name(find_type(&builder, "Shelf").id),
        "Shelf\\Shelf"
    );
    let library = builder.find_namespace("Library").unwrap();
    assert_eq!(builder.namespace(library).functions().len(), 1);
}

#[test]
fn test_ignored_package_annotations() {
    let mut builder = BuildContext::new();
    let stream =
        TokenStream::from_source("<?php\n/** @package Acme */\nclass Hammer {}\n", "test.php")
            .unwrap();
    parse(Box::new(stream), &mut builder, true).unwrap();

    assert_eq!(
        builder.qualified_type_name(find_type(&builder, "Hammer").id),
        "Hammer"
    );
}

#[test]
fn test_namespace_wins_over_package() {
    let builder = parsed("<?php\nnamespace Real;\n/** @package Fake */\nclass Thing {}\n");

    assert_eq!(
        builder.qualified_type_name(find_type(&builder, "Thing").id),
        "Real\\Thing"
    );
}

#[test]
fn test_parsing_twice_builds_fresh_declarations() {
    let source = "<?php\nnamespace App;\nclass Foo { function bar() {} }\n";
    let mut builder = BuildContext::new();
    parse_source(source, &mut builder).unwrap();
    parse_source(source, &mut builder).unwrap();

    let foos: Vec<&TypeDecl> = builder.types().iter().filter(|t| t.name == "Foo").collect();
    assert_eq!(foos.len(), 2);
    assert_ne!(foos[0].id, foos[1].id);
    assert_eq!(foos[0].methods().len(), 1);
    assert_eq!(foos[1].methods().len(), 1);
}

#[test]
fn test_unclosed_class_body() {
    let mut builder = BuildContext::new();
    let error = parse_source("<?php\nclass Foo {\n    function bar() {}\n", &mut builder)
        .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnclosedBody {
            kind: "class",
            name: String::from("Foo"),
        }
    );
    assert_eq!(error.get_position().file.as_str(), "test.php");
    assert!(error.to_string().contains("test.php"));
}

#[test]
fn test_unclosed_method_body() {
    let mut builder = BuildContext::new();
    let error =
        parse_source("<?php\nclass Foo {\n    function bar() {\n        $a = 1;\n", &mut builder)
            .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnclosedBody {
            kind: "method",
            name: String::from("bar"),
        }
    );
}

#[test]
fn test_invalid_function_signature() {
    let mut builder = BuildContext::new();
    let error = parse_source("<?php\nfunction foo($a, $b {\n}\n", &mut builder).unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidFunctionSignature {
            name: String::from("foo"),
        }
    );
    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_unexpected_token() {
    let mut builder = BuildContext::new();
    let error = parse_source("<?php\n$a = ;\n", &mut builder).unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnexpectedToken {
            token: String::from(";"),
        }
    );
}

#[test]
fn test_function_and_const_imports_do_not_alias_types() {
    let source = r#"<?php
namespace App;
use function Lib\helper;
use const Lib\LIMIT;
use Lib\{Reader, function format};
function f() {
    new Helper();
    new Limit();
    new Format();
    new Reader();
    helper();
}
"#;
    let builder = parsed(source);

    let f = find_callable(&builder, "f");
    assert_eq!(
        reference_images(&builder, f.body.unwrap()),
        vec!["App\\Helper", "App\\Limit", "App\\Format", "\\Lib\\Reader"]
    );
    assert_eq!(
        f.dependencies.names(),
        &["App\\Helper", "App\\Limit", "App\\Format", "\\Lib\\Reader"]
    );
}

#[test]
fn test_callable_tokens_include_doc_comments() {
    let mut builder = parsed("<?php\nfunction f() {\n    /** @var Foo $x */\n    $x = 1;\n}\n");

    let id = find_callable(&builder, "f").id;
    let images: Vec<String> = builder
        .callable_tokens(id)
        .into_iter()
        .map(|token| token.image)
        .collect();
    assert_eq!(images, vec!["/** @var Foo $x */", "$x", "=", "1", ";"]);
}

#[test]
fn test_generators() {
    let source = r#"<?php
function produce() {
    yield;
    yield 1;
    $received = yield 'key' => new Value();
    yield from other();
    return [yield];
}
class After {}
"#;
    let builder = parsed(source);
    let ast = builder.ast();

    let produce = find_callable(&builder, "produce");
    let yields = ast.find_children_of_kind(produce.body.unwrap(), NodeKind::YieldExpression);
    let images: Vec<&str> = yields.iter().map(|id| ast.image(*id)).collect();
    assert_eq!(images, vec!["yield", "yield", "yield", "yield from", "yield"]);
    assert!(ast.children(yields[0]).is_empty());
    assert_eq!(ast.children(yields[2]).len(), 2);
    assert!(produce.dependencies.contains("Value"));
    assert_eq!(find_type(&builder, "After").kind, TypeKind::Class);
}

#[test]
fn test_arrow_functions() {
    let source = r#"<?php
function convert($items) {
    $mapped = array_map(fn(Item $item): Result => new Mapped($item), $items);
    $double = static fn($x) => $x * 2;
}
class After {}
"#;
    let builder = parsed(source);
    let ast = builder.ast();

    let convert = find_callable(&builder, "convert");
    let arrows = ast.find_children_of_kind(convert.body.unwrap(), NodeKind::ArrowFunction);
    let images: Vec<&str> = arrows.iter().map(|id| ast.image(*id)).collect();
    assert_eq!(images, vec!["fn", "static fn"]);
    assert_eq!(convert.dependencies.names(), &["Item", "Result", "Mapped"]);
    assert!(find_type(&builder, "After").methods().is_empty());
}

#[test]
fn test_match_expressions() {
    let source = r#"<?php
function status($code) {
    return match ($code) {
        200, 201, => 'ok',
        404 => new NotFound(),
        default => 'error',
    };
}
class After {}
"#;
    let builder = parsed(source);
    let ast = builder.ast();

    let status = find_callable(&builder, "status");
    let body = status.body.unwrap();
    let matched = ast.first_child_of_kind(body, NodeKind::MatchExpression).unwrap();
    let arms = ast.find_children_of_kind(matched, NodeKind::MatchArm);
    assert_eq!(arms.len(), 3);
    assert_eq!(ast.children(arms[0]).len(), 3);
    assert_eq!(ast.image(arms[2]), "default");
    assert_eq!(ast.children(arms[2]).len(), 1);
    assert!(status.dependencies.contains("NotFound"));
    assert_eq!(find_type(&builder, "After").kind, TypeKind::Class);
}

#[test]
fn test_constructor_promotion() {
    let source = r#"<?php
class Service {
    public function __construct(
        private readonly Clock $clock,
        protected int $retries = 0,
        $plain = null,
    ) {}
}
class After {}
"#;
    let builder = parsed(source);
    let service = find_type(&builder, "Service");

    let properties: Vec<&str> = service.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(properties, vec!["$clock", "$retries"]);
    assert_eq!(
        service.properties[0].modifiers,
        Modifiers::PRIVATE | Modifiers::READONLY
    );
    assert_eq!(service.properties[0].type_hint.as_deref(), Some("Clock"));
    assert_eq!(service.properties[1].modifiers, Modifiers::PROTECTED);

    let constructor = find_callable(&builder, "__construct");
    assert_eq!(constructor.parameters.len(), 3);
    assert_eq!(
        constructor.parameters[0].modifiers,
        Modifiers::PRIVATE | Modifiers::READONLY
    );
    assert!(constructor.parameters[2].modifiers.is_empty());
    assert!(constructor.dependencies.contains("Clock"));
    assert_eq!(find_type(&builder, "After").kind, TypeKind::Class);
}

#[test]
fn test_readonly_classes_and_properties() {
    let source = r#"<?php
final readonly class Money {
    public readonly int $amount;
    protected readonly Currency $currency;
}
class After {}
"#;
    let builder = parsed(source);
    let money = find_type(&builder, "Money");

    assert_eq!(money.modifiers, Modifiers::FINAL | Modifiers::READONLY);
    assert_eq!(
        money.properties[0].modifiers,
        Modifiers::PUBLIC | Modifiers::READONLY
    );
    assert_eq!(
        money.properties[1].modifiers,
        Modifiers::PROTECTED | Modifiers::READONLY
    );
    assert!(money.dependencies.contains("Currency"));
    assert_eq!(find_type(&builder, "After").kind, TypeKind::Class);
}

#[test]
fn test_parent_reference_without_parent_class() {
    let source = "<?php\nclass Orphan {\n    function m() {\n        parent::create();\n    }\n}\n";
    let mut builder = parsed(source);

    let body = find_callable(&builder, "m").body.unwrap();
    let parent_ref = builder
        .ast()
        .first_child_of_kind(body, NodeKind::ParentReference)
        .unwrap();
    assert_eq!(builder.ast().image(parent_ref), "parent");
    assert_eq!(builder.resolve_reference(parent_ref), None);
    assert!(builder
        .types()
        .iter()
        .all(|declaration| !declaration.name.eq_ignore_ascii_case("parent")));
}

#[test]
fn test_two_builders_build_equal_trees() {
    let source = r#"<?php
namespace App;
use Lib\Logger;
interface Store { function save(Entity $entity); }
abstract class Base {}
class Repository extends Base implements Store {
    function save(Entity $entity) { new Logger(); }
    function find(int $id): ?Entity { return null; }
}
function helper(Repository $repository) {}
"#;

    fn summary(builder: &mut BuildContext) -> Vec<String> {
        let mut lines = Vec::new();
        let ids: Vec<_> = builder.types().iter().map(|declaration| declaration.id).collect();
        for id in ids {
            let name = builder.qualified_type_name(id);
            let methods = builder.type_decl(id).methods().len();
            let declared = builder.type_decl(id).dependencies.names().join(",");
            let resolved: Vec<String> = builder
                .type_dependencies(id)
                .into_iter()
                .map(|dependency| builder.qualified_type_name(dependency))
                .collect();
            lines.push(format!("{} {} [{}] [{}]", name, methods, declared, resolved.join(",")));
        }
        for callable in builder.callables() {
            lines.push(format!("{} [{}]", callable.name, callable.dependencies.names().join(",")));
        }
        lines.sort();
        lines
    }

    let mut first = parsed(source);
    let mut second = parsed(source);
    let first = summary(&mut first);
    assert_eq!(first, summary(&mut second));
    assert!(first.iter().any(|line| line.starts_with("App\\Repository 2 ")));
}

// ---- token stack ------------------------------------------------------------

fn token(image: &str) -> Token {
    let position = Position::null();
    Token {
        kind: TokenKind::Identifier,
        image: image.to_string(),
        span: Span {
            start: position.clone(),
            end: position,
        },
    }
}

fn images(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|token| token.image.as_str()).collect()
}

#[test]
fn test_token_stack_frames() {
    let mut stack = TokenStack::new();
    stack.push();
    stack.add(token("a"));
    stack.push();
    stack.add(token("b"));
    stack.add(token("c"));

    let inner = stack.pop();
    assert_eq!(images(&inner), vec!["b", "c"]);
    stack.fold(&inner);
    stack.add(token("d"));

    assert_eq!(images(&stack.pop()), vec!["a", "b", "c", "d"]);
    assert!(stack.is_empty());
}

#[test]
fn test_token_stack_without_frame_drops_tokens() {
    let mut stack = TokenStack::new();
    let returned = stack.add(token("lost"));
    assert_eq!(returned.image, "lost");
    assert_eq!(stack.depth(), 0);
}

#[test]
#[should_panic(expected = "token stack popped while empty")]
fn test_token_stack_pop_empty() {
    TokenStack::new().pop();
}

proptest! {
    #[test]
    fn test_token_stack_pop_returns_frame_contents(
        outer in proptest::collection::vec("[a-z]{1,4}", 0..8),
        inner in proptest::collection::vec("[a-z]{1,4}", 0..8),
    ) {
        let mut stack = TokenStack::new();
        stack.push();
        for image in &outer {
            stack.add(token(image));
        }
        stack.push();
        for image in &inner {
            stack.add(token(image));
        }

        let popped = stack.pop();
        prop_assert_eq!(images(&popped), inner.iter().map(String::as_str).collect::<Vec<_>>());
        let rest = stack.pop();
        prop_assert_eq!(images(&rest), outer.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

// ---- symbol table -----------------------------------------------------------

#[test]
fn test_symbol_table_case_insensitive() {
    let mut table = SymbolTable::new();
    table.create_scope();
    table.add("Baz2", String::from("\\Bar\\Baz"));

    assert_eq!(table.lookup("baz2").map(String::as_str), Some("\\Bar\\Baz"));
    assert_eq!(table.lookup("BAZ2").map(String::as_str), Some("\\Bar\\Baz"));
    assert_eq!(table.lookup("other"), None);
}

#[test]
fn test_symbol_table_scopes_do_not_inherit() {
    let mut table = SymbolTable::new();
    table.create_scope();
    table.add("A", 1);
    table.create_scope();

    assert_eq!(table.lookup("a"), None);
    table.destroy_scope();
    assert_eq!(table.lookup("a"), Some(&1));

    table.reset_scope();
    assert_eq!(table.lookup("a"), None);
    assert_eq!(table.depth(), 1);
}

#[test]
#[should_panic(expected = "no active scope in symbol table")]
fn test_symbol_table_lookup_without_scope() {
    let table: SymbolTable<String> = SymbolTable::new();
    table.lookup("a");
}

proptest! {
    #[test]
    fn test_symbol_table_last_binding_wins(
        name in "[A-Za-z_][A-Za-z0-9_]{0,8}",
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        let mut table = SymbolTable::new();
        table.create_scope();
        table.add(&name, first);
        table.add(&name.to_uppercase(), second);
        prop_assert_eq!(table.lookup(&name.to_lowercase()), Some(&second));
    }
}
