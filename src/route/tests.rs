use super::*;
use crate::error::RouteError;

fn regex_of(source: &str) -> String {
    compile_template(source)
        .unwrap()
        .pattern
        .unwrap()
        .regex()
        .as_str()
        .to_string()
}

fn reason_of(source: &str) -> String {
    match compile_template(source).unwrap_err() {
        RouteError::InvalidPattern { reason, .. } => reason,
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_literal_template_has_no_pattern() {
    let template = compile_template("/health").unwrap();
    assert!(template.pattern.is_none());
    assert!(template.parameters.is_empty());
}

#[test]
fn test_segment_regex() {
    assert_eq!(regex_of("/users/{id}"), "^/users/([^/]+)$");
    assert_eq!(
        regex_of("/users/{user_id}/posts/{post_id}"),
        "^/users/([^/]+)/posts/([^/]+)$"
    );
}

#[test]
fn test_literal_text_is_escaped() {
    assert_eq!(regex_of("/v1.0/{id}"), r"^/v1\.0/([^/]+)$");
}

#[test]
fn test_optional_sections() {
    assert_eq!(regex_of("/docs[/{lang}]"), "^/docs(?:/([^/]+))?$");
    assert_eq!(
        regex_of("/a[/{b}[/{c}]]"),
        "^/a(?:/([^/]+)(?:/([^/]+))?)?$"
    );
    let template = compile_template("/a[/{b}[/{c}]]").unwrap();
    assert!(template.parameters.iter().all(|p| p.optional));
}

#[test]
fn test_array_and_custom_regex() {
    assert_eq!(regex_of("/files/{path*}"), "^/files/(.+)$");
    assert_eq!(regex_of("/posts/{slug<[a-z-]+>}"), "^/posts/([a-z-]+)$");
    // Braces inside a custom regex are part of the regex.
    assert_eq!(regex_of(r"/code/{id<\d{2}>}"), r"^/code/(\d{2})$");
}

#[test]
fn test_parameters_in_declaration_order() {
    let template = compile_template("/org/{org}/repo/{repo:int}[/{tab=code}]").unwrap();
    let names: Vec<&str> = template.parameters.iter().map(|p| p.name.as_ref()).collect();
    assert_eq!(names, ["org", "repo", "tab"]);
    assert_eq!(
        template.parameters[1].source,
        ParameterSource::Capture { group: 2 }
    );
    assert_eq!(
        template.parameters[1].cast,
        Some(CastSpec::eager(CastType::Int))
    );
    assert_eq!(template.parameters[2].default, Some(ParamValue::from("code")));
    assert_eq!(template.pattern.unwrap().group_count(), 3);
}

#[test]
fn test_compilation_is_deterministic() {
    let source = "/a/{b:int}[/{c*}]";
    assert_eq!(regex_of(source), regex_of(source));
}

#[test]
fn test_typed_default_is_cast() {
    let template = compile_template("/page[/{n:int=1}]").unwrap();
    assert_eq!(template.parameters[0].default, Some(ParamValue::Int(1)));

    let template = compile_template("/tags[/{t*=a,b}]").unwrap();
    assert_eq!(
        template.parameters[0].default,
        Some(ParamValue::List(vec!["a".into(), "b".into()]))
    );
}

#[test]
fn test_invalid_templates() {
    assert_eq!(reason_of("/a/{id"), "unbalanced '{'");
    assert_eq!(reason_of("/a/id}"), "unmatched '}'");
    assert_eq!(reason_of("/a[/{b}"), "unbalanced '['");
    assert_eq!(reason_of("/a/{b}]"), "unmatched ']'");
    assert_eq!(reason_of("/a/{b{c}}"), "nested '{'");
    assert_eq!(reason_of("/a[/x]/{b}"), "optional section without a parameter");
    assert_eq!(reason_of("/a/{}"), "malformed placeholder '{}'");
    assert_eq!(reason_of("/a/{x}/{x}"), "duplicate parameter 'x'");
    assert_eq!(reason_of("/a/{id:uuid}"), "unknown cast type 'uuid'");
    assert_eq!(
        reason_of("/a[/{x}]/{y}"),
        "required parameter 'y' follows an optional parameter"
    );
    assert_eq!(
        reason_of("/a/{rest*}/{tail}"),
        "array parameter 'rest' must be the last parameter"
    );
    assert_eq!(
        reason_of("/a/{id=3}"),
        "parameter 'id' has a default but is not inside an optional section"
    );
    assert_eq!(
        reason_of("/a/{id<(x|y)>}"),
        "custom parameter regex must not contain capture groups"
    );
    assert!(reason_of("/a[/{n:int=one}]").starts_with("default for 'n' is not valid"));
}

#[test]
fn test_pattern_serializes_as_source() {
    let pattern = compile_template("/post/{id:int}").unwrap().pattern.unwrap();
    let json = serde_json::to_string(&pattern).unwrap();
    assert_eq!(json, r#""/post/{id:int}""#);
    let back: CompiledPattern = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pattern);
}

#[test]
fn test_sample_key() {
    let template = compile_template("/post/{id:int}").unwrap();
    assert_eq!(
        sample_key("/post/{id:int}", &template.parameters).as_deref(),
        Some("/post/1")
    );
    let template = compile_template("/docs[/{lang}]").unwrap();
    assert_eq!(
        sample_key("/docs[/{lang}]", &template.parameters).as_deref(),
        Some("/docs/sample")
    );
}

#[test]
fn test_eager_casts() {
    let int = CastSpec::eager(CastType::Int);
    assert_eq!(int.apply("id", "42").unwrap(), ParamValue::Int(42));
    assert!(matches!(
        int.apply("id", "abc"),
        Err(RouteError::ParameterCast { .. })
    ));

    let float = CastSpec::eager(CastType::Float);
    assert_eq!(float.apply("x", "2.5").unwrap(), ParamValue::Float(2.5));
    assert!(float.apply("x", "inf").is_err());
    assert!(float.apply("x", "NaN").is_err());

    let boolean = CastSpec::eager(CastType::Bool);
    for raw in ["true", "1", "Yes", "ON"] {
        assert_eq!(boolean.apply("b", raw).unwrap(), ParamValue::Bool(true));
    }
    for raw in ["false", "0", "no", "Off"] {
        assert_eq!(boolean.apply("b", raw).unwrap(), ParamValue::Bool(false));
    }
    assert!(boolean.apply("b", "maybe").is_err());
}

#[test]
fn test_deferred_cast_wraps_raw_text() {
    let value = CastSpec::named("UserId").apply("id", "u-17").unwrap();
    assert_eq!(
        value,
        ParamValue::Typed {
            type_name: "UserId".into(),
            raw: "u-17".into()
        }
    );
    assert_eq!(value.as_str(), Some("u-17"));
    assert_eq!(value.to_string(), "UserId(u-17)");

    // A deferred scalar cast does not parse either.
    let value = CastSpec::deferred(CastType::Int).apply("id", "abc").unwrap();
    assert_eq!(value.as_str(), Some("abc"));
}

#[test]
fn test_absent_value() {
    let template = compile_template("/a[/{b}][/{c*}]").unwrap();
    assert_eq!(template.parameters[0].absent_value(), ParamValue::Null);
    assert_eq!(template.parameters[1].absent_value(), ParamValue::List(vec![]));
}

#[test]
fn test_bound_params_lookup() {
    let mut params = BoundParams::new();
    params.push("id".into(), ParamValue::Int(7));
    params.push("tab".into(), ParamValue::Null);
    assert_eq!(params.len(), 2);
    assert_eq!(params.get("id").and_then(ParamValue::as_i64), Some(7));
    assert!(params.get("tab").is_some_and(ParamValue::is_null));
    assert!(params.get("missing").is_none());
    assert_eq!(params.names().collect::<Vec<_>>(), ["id", "tab"]);
}

#[test]
fn test_definition_yaml_shape() {
    let route = RouteBuilder::new(
        "/post/{id:int}",
        crate::target::DispatchTarget::function("show_post"),
    )
    .middleware(Stage::Matched, "auth")
    .build()
    .unwrap();
    let yaml = serde_yaml::to_string(&route).unwrap();
    assert!(yaml.contains("/post/{id:int}"));
    assert!(yaml.contains("kind: function"));
    assert!(yaml.contains("matched:"));
    let back: RouteDefinition = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, route);
}
