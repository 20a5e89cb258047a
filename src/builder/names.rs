//! Qualified name handling.
//!
//! Splitting never fails: a name without a separator belongs either to the
//! extension namespace of a built-in type or to the default namespace.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Namespace used when no namespace or package is declared.
pub const DEFAULT_NAMESPACE: &str = "+global";

pub const NAMESPACE_SEPARATOR: char = '\\';

lazy_static! {
    /// Built-in classes and interfaces keyed by lowercase name, mapped to the
    /// extension namespace that provides them.
    static ref BUILTIN_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        for name in [
            "stdclass", "exception", "errorexception", "error", "typeerror", "valueerror",
            "arithmeticerror", "divisionbyzeroerror", "argumentcounterror", "closure",
            "generator", "traversable", "iterator", "iteratoraggregate", "arrayaccess",
            "countable", "serializable", "stringable", "throwable", "unitenum", "backedenum",
            "weakreference", "weakmap",
        ] {
            map.insert(name, "+core");
        }
        for name in [
            "arrayobject", "arrayiterator", "recursivearrayiterator", "splobjectstorage",
            "splstack", "splqueue", "spldoublylinkedlist", "splfixedarray", "splheap",
            "splminheap", "splmaxheap", "splpriorityqueue", "splfileinfo", "splfileobject",
            "spltempfileobject", "directoryiterator", "filesystemiterator",
            "recursivedirectoryiterator", "recursiveiteratoriterator", "iteratoriterator",
            "filteriterator", "limititerator", "cachingiterator", "appenditerator",
            "emptyiterator", "infiniteiterator", "norewinditerator", "regexiterator",
            "callbackfilteriterator", "outeriterator", "recursiveiterator", "seekableiterator",
            "splobserver", "splsubject", "logicexception", "badfunctioncallexception",
            "badmethodcallexception", "domainexception", "invalidargumentexception",
            "lengthexception", "outofrangeexception", "runtimeexception",
            "outofboundsexception", "overflowexception", "rangeexception",
            "underflowexception", "unexpectedvalueexception",
        ] {
            map.insert(name, "+spl");
        }
        for name in [
            "reflectionclass", "reflectionobject", "reflectionmethod", "reflectionfunction",
            "reflectionproperty", "reflectionparameter", "reflectionexception", "reflector",
        ] {
            map.insert(name, "+reflection");
        }
        for name in [
            "datetime", "datetimeimmutable", "datetimeinterface", "datetimezone",
            "dateinterval", "dateperiod",
        ] {
            map.insert(name, "+date");
        }
        for name in ["pdo", "pdostatement", "pdoexception"] {
            map.insert(name, "+pdo");
        }
        for name in [
            "domdocument", "domelement", "domnode", "domnodelist", "domxpath", "domattr",
            "domexception",
        ] {
            map.insert(name, "+dom");
        }
        for name in ["simplexmlelement", "simplexmliterator"] {
            map.insert(name, "+simplexml");
        }
        for name in ["jsonserializable", "jsonexception"] {
            map.insert(name, "+json");
        }
        map
    };

    /// Type hints that never name a declared type.
    static ref PRIMITIVE_TYPES: Vec<&'static str> = vec![
        "array", "callable", "bool", "boolean", "int", "integer", "float", "double", "real",
        "string", "object", "iterable", "mixed", "void", "null", "never", "false", "true",
        "resource", "numeric", "scalar",
    ];
}

/// Extension namespace of a built-in type, if `name` is one.
pub fn builtin_namespace(name: &str) -> Option<&'static str> {
    BUILTIN_TYPES.get(name.to_lowercase().as_str()).copied()
}

pub fn is_primitive_type(name: &str) -> bool {
    let name = name.trim_start_matches(NAMESPACE_SEPARATOR).to_lowercase();
    PRIMITIVE_TYPES.contains(&name.as_str())
}

/// Local part of a qualified name: everything after the last separator.
pub fn extract_type_name(qualified_name: &str) -> &str {
    match qualified_name.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => &qualified_name[pos + 1..],
        None => qualified_name,
    }
}

/// Namespace part of a qualified name.
///
/// A single leading separator is stripped. Unqualified names fall back to
/// the extension namespace of built-in types and then to the default
/// namespace; so does the root namespace of `\Foo`.
pub fn extract_namespace_name(qualified_name: &str) -> String {
    match qualified_name.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => {
            let namespace = &qualified_name[..pos];
            let namespace = namespace
                .strip_prefix(NAMESPACE_SEPARATOR)
                .unwrap_or(namespace);
            // `\Foo` lives in the root namespace, registered as the default one.
            if namespace.is_empty() {
                unqualified_namespace(&qualified_name[pos + 1..])
            } else {
                namespace.to_string()
            }
        }
        None => unqualified_namespace(qualified_name),
    }
}

fn unqualified_namespace(name: &str) -> String {
    builtin_namespace(name)
        .unwrap_or(DEFAULT_NAMESPACE)
        .to_string()
}

pub fn is_default_namespace(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEFAULT_NAMESPACE)
}

/// Joins a namespace and a local name, leaving the default namespace implicit.
pub fn qualify(namespace: &str, local_name: &str) -> String {
    if namespace.is_empty() || is_default_namespace(namespace) {
        local_name.to_string()
    } else {
        format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, local_name)
    }
}
