use super::*;
use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::route::{compile_template, ParamValue, RouteBuilder, RouteDefinition};
use crate::target::DispatchTarget;
use std::collections::BTreeMap;
use std::sync::Arc;

fn matcher_with(templates: &[&str], config: &RouterConfig) -> Matcher {
    let mut collection = RouteCollection::with_config(config);
    for (i, template) in templates.iter().enumerate() {
        let route = RouteBuilder::new(*template, DispatchTarget::function(format!("h{i}")))
            .build()
            .unwrap();
        collection.add(route).unwrap();
    }
    Matcher::with_config(Arc::new(collection), config)
}

fn matcher(templates: &[&str]) -> Matcher {
    matcher_with(templates, &RouterConfig::default())
}

#[test]
fn test_trailing_slash_is_significant_by_default() {
    let m = matcher(&["/users", "/users/{id}"]);
    assert!(m.match_route("/users").unwrap().is_match());
    assert!(!m.match_route("/users/").unwrap().is_match());
}

#[test]
fn test_trailing_slash_trimmed_when_configured() {
    let config = RouterConfig {
        trim_trailing_slash: true,
        ..RouterConfig::default()
    };
    let m = matcher_with(&["/", "/users", "/users/{id}"], &config);
    assert_eq!(m.match_route("/users/").unwrap().route().unwrap().key, "/users");
    assert_eq!(m.match_route("/users/7//").unwrap().param("id"), Some(&ParamValue::from("7")));
    assert_eq!(m.match_route("/").unwrap().route().unwrap().key, "/");
}

#[test]
fn test_array_capture_uses_configured_delimiter() {
    let m = matcher(&["/files/{path*}"]);
    assert_eq!(
        m.match_route("/files/a/b/c.txt").unwrap().param("path"),
        Some(&ParamValue::List(vec!["a".into(), "b".into(), "c.txt".into()]))
    );

    let config = RouterConfig {
        array_delimiter: ",".to_string(),
        ..RouterConfig::default()
    };
    let m = matcher_with(&["/tags/{tags*:int}"], &config);
    assert_eq!(
        m.match_route("/tags/1,2,3").unwrap().param("tags"),
        Some(&ParamValue::List(vec![
            ParamValue::Int(1),
            ParamValue::Int(2),
            ParamValue::Int(3)
        ]))
    );
    assert!(matches!(
        m.match_route("/tags/1,x"),
        Err(RouteError::ParameterCast { .. })
    ));
}

#[test]
fn test_missing_required_capture_is_invalid_pattern() {
    // Hand-built definition whose parameter claims to be required although
    // its group sits inside an optional section.
    let template = compile_template("/a[/{b}]").unwrap();
    let mut parameters = template.parameters;
    parameters[0].optional = false;
    let route = RouteDefinition {
        key: "/a[/{b}]".to_string(),
        pattern: template.pattern,
        parameters,
        target: DispatchTarget::function("f"),
        middleware: BTreeMap::new(),
    };
    let mut collection = RouteCollection::new();
    collection.add(route).unwrap();
    let m = Matcher::new(Arc::new(collection));

    assert!(m.match_route("/a/x").unwrap().is_match());
    assert!(matches!(
        m.match_route("/a"),
        Err(RouteError::InvalidPattern { .. })
    ));
}

#[test]
fn test_exact_route_binds_nothing() {
    let m = matcher(&["/health"]);
    match m.match_route("/health").unwrap() {
        MatchResult::Matched { params, .. } => assert!(params.is_empty()),
        MatchResult::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn test_command_binding() {
    let mut collection = RouteCollection::new();
    collection
        .add(
            RouteBuilder::new("greet", DispatchTarget::function("greet"))
                .argument("name")
                .optional_argument("greeting")
                .option("shout", &["s"])
                .build()
                .unwrap(),
        )
        .unwrap();
    let m = Matcher::new(Arc::new(collection));

    let result = m
        .match_command("greet", &CommandArgs::parse(["bob", "-s"]))
        .unwrap();
    assert_eq!(result.param("name"), Some(&ParamValue::from("bob")));
    assert_eq!(result.param("greeting"), Some(&ParamValue::Null));
    assert_eq!(result.param("shout"), Some(&ParamValue::from("true")));

    let err = m
        .match_command("greet", &CommandArgs::parse(["bob", "hi", "extra"]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed input for 'greet': unexpected argument 'extra'"
    );

    let err = m.match_command("greet", &CommandArgs::new()).unwrap_err();
    assert!(err.to_string().ends_with("missing required argument '<name>'"));

    let err = m
        .match_command("greet", &CommandArgs::parse(["bob", "--loud"]))
        .unwrap_err();
    assert!(err.to_string().ends_with("unknown option '--loud'"));

    assert!(!m
        .match_command("wave", &CommandArgs::new())
        .unwrap()
        .is_match());
}
