//! Tests for route registration
//!
//! # Test Coverage
//!
//! - Duplicate literal keys and duplicate pattern sources are rejected
//! - A rejected route leaves the collection exactly as it was
//! - Array parameters must come last, both in templates and hand-built
//!   definitions
//! - `all()` lists exact routes, then dynamic routes, in registration order

use routeflow::route::{
    Parameter, ParameterSource, RouteBuilder, RouteDefinition,
};
use routeflow::router::RouteCollection;
use routeflow::target::DispatchTarget;
use routeflow::RouteError;

fn route(template: &str, target: &str) -> RouteDefinition {
    RouteBuilder::new(template, DispatchTarget::function(target))
        .build()
        .unwrap()
}

fn keys(collection: &RouteCollection) -> Vec<String> {
    collection.all().map(|r| r.key.clone()).collect()
}

#[test]
fn test_duplicate_literal_rejected_without_partial_state() {
    let mut collection = RouteCollection::new();
    collection.add(route("/health", "first")).unwrap();
    let before = keys(&collection);

    let err = collection.add(route("/health", "second")).unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { ref key } if key == "/health"));
    assert_eq!(keys(&collection), before);
    assert_eq!(collection.len(), 1);
    assert_eq!(
        collection.get("/health").unwrap().target,
        DispatchTarget::function("first")
    );
}

#[test]
fn test_duplicate_pattern_rejected() {
    let mut collection = RouteCollection::new();
    collection.add(route("/post/{id:int}", "first")).unwrap();
    let err = collection.add(route("/post/{id:int}", "second")).unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    assert_eq!(collection.dynamic().len(), 1);
}

#[test]
fn test_array_not_last_rejected_in_template() {
    let err = RouteBuilder::new("/files/{path*}/{name}", DispatchTarget::function("f"))
        .build()
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
    assert!(err.to_string().contains("must be the last parameter"));
}

#[test]
fn test_array_not_last_rejected_for_positional_inputs() {
    let err = RouteBuilder::new("copy", DispatchTarget::function("copy"))
        .array_argument("sources", false)
        .argument("destination")
        .build()
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
}

#[test]
fn test_hand_built_invalid_definition_rejected_by_add() {
    let mut sources = Parameter::new("sources", ParameterSource::Positional { index: 0 });
    sources.array = true;
    let definition = RouteDefinition {
        key: "copy".to_string(),
        pattern: None,
        parameters: vec![
            sources,
            Parameter::new("destination", ParameterSource::Positional { index: 1 }),
        ],
        target: DispatchTarget::function("copy"),
        middleware: Default::default(),
    };

    let mut collection = RouteCollection::new();
    let err = collection.add(definition).unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
    assert!(collection.is_empty());
}

#[test]
fn test_capture_parameters_on_literal_rejected() {
    let definition = RouteDefinition {
        key: "/post".to_string(),
        pattern: None,
        parameters: vec![Parameter::new("id", ParameterSource::Capture { group: 1 })],
        target: DispatchTarget::function("f"),
        middleware: Default::default(),
    };
    let err = RouteCollection::new().add(definition).unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
}

#[test]
fn test_all_lists_exact_then_dynamic_in_order() {
    let mut collection = RouteCollection::new();
    collection.add(route("/b/{id}", "b")).unwrap();
    collection.add(route("/z", "z")).unwrap();
    collection.add(route("/a/{id}", "a")).unwrap();
    collection.add(route("/y", "y")).unwrap();

    assert_eq!(keys(&collection), ["/z", "/y", "/b/{id}", "/a/{id}"]);
    assert_eq!(collection.len(), 4);
    assert!(collection.get("/z").is_some());
    assert!(collection.get("/b/{id}").is_none());
}

#[test]
fn test_overlap_is_allowed() {
    let mut collection = RouteCollection::new();
    collection.add(route("/{section}/{id}", "r1")).unwrap();
    collection.add(route("/x/{id}", "r2")).unwrap();
    assert_eq!(collection.dynamic().len(), 2);
}
