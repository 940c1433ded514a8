//! Tests for template compilation and the matcher
//!
//! # Test Coverage
//!
//! Validates how inputs bind to routes:
//! - Literal routes hit the exact table with no parameters
//! - Dynamic routes bind every parameter in declaration order
//! - Eager casts produce typed values and fail loudly on bad input
//! - Optional sections fall back to defaults or `Null`
//! - Array captures split on the configured delimiter
//! - Overlapping patterns resolve to the first registered route
//!
//! # Key Test Cases
//!
//! - `test_int_cast_binds_typed_value`: `/post/42` binds `id = 42`
//! - `test_int_cast_failure_is_not_no_match`: `/post/abc` is a cast error
//! - `test_first_registered_pattern_wins`: shadowing follows registration order

use routeflow::config::RouterConfig;
use routeflow::route::{CastSpec, CastType, ParamValue, RouteBuilder, RouteDefinition};
use routeflow::router::{MatchResult, Matcher, RouteCollection};
use routeflow::target::DispatchTarget;
use routeflow::RouteError;
use std::sync::Arc;

fn route(template: &str, target: &str) -> RouteDefinition {
    RouteBuilder::new(template, DispatchTarget::function(target))
        .build()
        .unwrap()
}

fn matcher(routes: Vec<RouteDefinition>) -> Matcher {
    let mut collection = RouteCollection::new();
    for r in routes {
        collection.add(r).unwrap();
    }
    Matcher::new(Arc::new(collection))
}

fn target_of(result: &MatchResult) -> String {
    result
        .route()
        .map(|r| r.target.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

#[test]
fn test_literal_route_binds_nothing() {
    let m = matcher(vec![route("/health", "health"), route("/{page}", "page")]);
    let result = m.match_route("/health").unwrap();
    assert_eq!(target_of(&result), "function 'health'");
    match result {
        MatchResult::Matched { route, params } => {
            assert!(!route.is_dynamic());
            assert!(params.is_empty());
        }
        MatchResult::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn test_exact_table_beats_earlier_pattern() {
    let m = matcher(vec![route("/{page}", "page"), route("/about", "about")]);
    assert_eq!(
        target_of(&m.match_route("/about").unwrap()),
        "function 'about'"
    );
    assert_eq!(
        target_of(&m.match_route("/contact").unwrap()),
        "function 'page'"
    );
}

#[test]
fn test_parameters_bind_in_declaration_order() {
    let m = matcher(vec![route(
        "/users/{user}/posts/{post:int}/{slug}",
        "show",
    )]);
    let result = m.match_route("/users/ada/posts/3/hello").unwrap();
    let MatchResult::Matched { params, .. } = result else {
        panic!("expected a match");
    };
    assert_eq!(params.len(), 3);
    assert_eq!(params.names().collect::<Vec<_>>(), ["user", "post", "slug"]);
    assert_eq!(params.get("user"), Some(&ParamValue::from("ada")));
    assert_eq!(params.get("post"), Some(&ParamValue::Int(3)));
    assert_eq!(params.get("slug"), Some(&ParamValue::from("hello")));
}

#[test]
fn test_int_cast_binds_typed_value() {
    let m = matcher(vec![route("/post/{id:int}", "show_post")]);
    let result = m.match_route("/post/42").unwrap();
    assert_eq!(result.param("id"), Some(&ParamValue::Int(42)));
    assert_eq!(result.param("id").and_then(ParamValue::as_i64), Some(42));
}

#[test]
fn test_int_cast_failure_is_not_no_match() {
    let m = matcher(vec![route("/post/{id:int}", "show_post")]);
    let err = m.match_route("/post/abc").unwrap_err();
    match err {
        RouteError::ParameterCast {
            parameter,
            expected,
            raw,
        } => {
            assert_eq!(parameter, "id");
            assert_eq!(expected, "int");
            assert_eq!(raw, "abc");
        }
        other => panic!("expected ParameterCast, got {other:?}"),
    }
}

#[test]
fn test_float_and_bool_casts() {
    let m = matcher(vec![route("/scale/{factor:float}/{enabled:bool}", "scale")]);
    let result = m.match_route("/scale/1.5/yes").unwrap();
    assert_eq!(result.param("factor"), Some(&ParamValue::Float(1.5)));
    assert_eq!(result.param("enabled"), Some(&ParamValue::Bool(true)));
    assert!(m.match_route("/scale/1.5/maybe").is_err());
}

#[test]
fn test_optional_section_uses_default() {
    let m = matcher(vec![route("/docs[/{lang=en}]", "docs")]);
    let result = m.match_route("/docs").unwrap();
    assert_eq!(result.param("lang"), Some(&ParamValue::from("en")));
    let result = m.match_route("/docs/fr").unwrap();
    assert_eq!(result.param("lang"), Some(&ParamValue::from("fr")));
}

#[test]
fn test_optional_default_through_builder() {
    let m = matcher(vec![RouteBuilder::new(
        "/docs[/{lang}]",
        DispatchTarget::function("docs"),
    )
    .default("lang", "en")
    .build()
    .unwrap()]);
    assert_eq!(
        m.match_route("/docs").unwrap().param("lang"),
        Some(&ParamValue::from("en"))
    );
}

#[test]
fn test_optional_without_default_is_null() {
    let m = matcher(vec![route("/archive[/{year:int}]", "archive")]);
    assert_eq!(
        m.match_route("/archive").unwrap().param("year"),
        Some(&ParamValue::Null)
    );
    assert_eq!(
        m.match_route("/archive/2024").unwrap().param("year"),
        Some(&ParamValue::Int(2024))
    );
}

#[test]
fn test_array_capture_splits_and_casts() {
    let m = matcher(vec![
        route("/files/{path*}", "files"),
        route("/sum/{n*:int}", "sum"),
    ]);
    assert_eq!(
        m.match_route("/files/a/b/c.txt").unwrap().param("path"),
        Some(&ParamValue::List(vec![
            ParamValue::from("a"),
            ParamValue::from("b"),
            ParamValue::from("c.txt"),
        ]))
    );
    assert_eq!(
        m.match_route("/sum/1/2/3").unwrap().param("n"),
        Some(&ParamValue::List(vec![
            ParamValue::Int(1),
            ParamValue::Int(2),
            ParamValue::Int(3),
        ]))
    );
}

#[test]
fn test_custom_regex_narrows_match() {
    let m = matcher(vec![route(r"/v/{ver<\d+>}", "version")]);
    assert!(m.match_route("/v/12").unwrap().is_match());
    assert!(!m.match_route("/v/beta").unwrap().is_match());
}

#[test]
fn test_deferred_named_cast() {
    let m = matcher(vec![RouteBuilder::new(
        "/users/{id}",
        DispatchTarget::function("user"),
    )
    .cast("id", CastSpec::named("UserId"))
    .build()
    .unwrap()]);
    assert_eq!(
        m.match_route("/users/7").unwrap().param("id"),
        Some(&ParamValue::Typed {
            type_name: "UserId".to_string(),
            raw: "7".to_string(),
        })
    );
}

#[test]
fn test_deferred_builtin_cast_keeps_raw_text() {
    let m = matcher(vec![RouteBuilder::new(
        "/page/{n}",
        DispatchTarget::function("page"),
    )
    .cast("n", CastSpec::deferred(CastType::Int))
    .build()
    .unwrap()]);
    let result = m.match_route("/page/oops").unwrap();
    assert_eq!(
        result.param("n").and_then(ParamValue::as_str),
        Some("oops")
    );
}

#[test]
fn test_first_registered_pattern_wins() {
    let m = matcher(vec![
        route("/{section}/{id}", "r1"),
        route("/x/{id}", "r2"),
    ]);
    assert_eq!(target_of(&m.match_route("/x/1").unwrap()), "function 'r1'");

    let reversed = matcher(vec![
        route("/x/{id}", "r2"),
        route("/{section}/{id}", "r1"),
    ]);
    assert_eq!(
        target_of(&reversed.match_route("/x/1").unwrap()),
        "function 'r2'"
    );
}

#[test]
fn test_no_match() {
    let m = matcher(vec![route("/post/{id:int}", "show_post")]);
    assert!(matches!(m.match_route("/posts").unwrap(), MatchResult::NoMatch));
    assert!(!m.match_route("/post/1/extra").unwrap().is_match());
}

#[test]
fn test_config_delimiter_and_trailing_slash() {
    let config = RouterConfig {
        array_delimiter: ",".to_string(),
        trim_trailing_slash: true,
        ..RouterConfig::default()
    };
    let mut collection = RouteCollection::with_config(&config);
    collection.add(route("/tags/{tags*}", "tags")).unwrap();
    collection.add(route("/about", "about")).unwrap();
    let m = Matcher::with_config(Arc::new(collection), &config);

    assert_eq!(
        m.match_route("/tags/a,b").unwrap().param("tags"),
        Some(&ParamValue::List(vec![
            ParamValue::from("a"),
            ParamValue::from("b")
        ]))
    );
    assert!(m.match_route("/about/").unwrap().is_match());
}
