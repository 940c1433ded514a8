//! End-to-end tests for `Router<Console>`
//!
//! # Test Coverage
//!
//! - Positional arguments, options, short aliases and flag clusters
//! - Array positionals and repeated options
//! - Usage errors (exit 2), unknown commands (exit 127) and failures (exit 1)
//! - Command names with captures
//! - Reply shapes on the console surface

use routeflow::prelude::*;
use serde_json::json;

fn cli_router() -> Router<Console> {
    let mut targets = TargetRegistry::new();
    targets
        .function("copy", |args| {
            let sources = args
                .param("sources")
                .and_then(ParamValue::as_list)
                .map(|items| items.iter().map(ToString::to_string).collect::<Vec<_>>())
                .unwrap_or_default();
            Ok(Reply::text(format!(
                "copy {} -> {} force={} retries={}",
                sources.join(","),
                args.text("destination")?,
                args.flag("force")?,
                args.int("retries")?
            )))
        })
        .function("tag", |args| {
            Ok(Reply::json(json!({
                "tags": args.param("tag").map(ToString::to_string),
            })))
        })
        .function("make", |args| {
            Ok(Reply::Command(CommandOutput::success(format!(
                "made {}",
                args.text("kind")?
            ))))
        })
        .function("fail", |_| Err(anyhow::anyhow!("remote refused")))
        .function("wrong", |_| Ok(Reply::Http(HttpResponse::no_content())));

    Router::<Console>::builder()
        .route(
            RouteBuilder::new("copy", DispatchTarget::function("copy"))
                .argument("destination")
                .array_argument("sources", false)
                .option("force", &["f"])
                .option("retries", &["r"])
                .cast("retries", CastSpec::eager(routeflow::route::CastType::Int))
                .default("retries", "3")
                .build()
                .unwrap(),
        )
        .route(
            RouteBuilder::new("tag", DispatchTarget::function("tag"))
                .array_option("tag", &["t"])
                .build()
                .unwrap(),
        )
        .route(
            RouteBuilder::new("make:{kind}", DispatchTarget::function("make"))
                .build()
                .unwrap(),
        )
        .route(
            RouteBuilder::new("fail", DispatchTarget::function("fail"))
                .build()
                .unwrap(),
        )
        .route(
            RouteBuilder::new("wrong", DispatchTarget::function("wrong"))
                .build()
                .unwrap(),
        )
        .targets(targets)
        .build()
        .unwrap()
}

fn run(router: &Router<Console>, tokens: &[&str]) -> CommandOutput {
    router.handle(CommandInput::parse(tokens))
}

#[test]
fn test_positionals_and_options() {
    let router = cli_router();

    let out = run(&router, &["copy", "/backup", "a.txt", "b.txt", "-f"]);
    assert_eq!(out.exit_code, 0, "{}", out.stderr);
    assert_eq!(out.stdout, "copy a.txt,b.txt -> /backup force=true retries=3");

    let out = run(&router, &["copy", "/backup", "a.txt", "--retries=5"]);
    assert_eq!(out.stdout, "copy a.txt -> /backup force=false retries=5");

    let out = run(&router, &["copy", "/backup", "a.txt", "-r=1", "--force"]);
    assert_eq!(out.stdout, "copy a.txt -> /backup force=true retries=1");
}

#[test]
fn test_usage_errors_exit_two() {
    let router = cli_router();

    let out = run(&router, &["copy", "/backup"]);
    assert_eq!(out.exit_code, 2);
    assert!(out.stderr.contains("missing required argument '<sources>'"), "{}", out.stderr);

    let out = run(&router, &["copy", "/backup", "a.txt", "--verbose"]);
    assert_eq!(out.exit_code, 2);
    assert!(out.stderr.contains("unknown option '--verbose'"));

    let out = run(&router, &["copy", "/backup", "a.txt", "--retries=many"]);
    assert_eq!(out.exit_code, 2);
    assert!(out.stderr.contains("parameter 'retries' expects int"));

    let out = run(&router, &["fail", "extra"]);
    assert_eq!(out.exit_code, 2);
    assert!(out.stderr.contains("unexpected argument 'extra'"));
}

#[test]
fn test_repeated_option_collects_values() {
    let router = cli_router();
    let out = run(&router, &["tag", "--tag=a", "-t=b"]);
    assert_eq!(out.exit_code, 0, "{}", out.stderr);
    let value: serde_json::Value = serde_json::from_str(&out.stdout).unwrap();
    assert_eq!(value, json!({ "tags": "[a, b]" }));
}

#[test]
fn test_command_name_with_capture() {
    let router = cli_router();
    let out = run(&router, &["make:model"]);
    assert_eq!(out, CommandOutput::success("made model"));
}

#[test]
fn test_unknown_command_exits_127() {
    let router = cli_router();
    let out = run(&router, &["deploy"]);
    assert_eq!(out.exit_code, 127);
    assert_eq!(out.stderr, "command 'deploy' is not defined");
}

#[test]
fn test_failures_exit_one() {
    let router = cli_router();

    let out = run(&router, &["fail"]);
    assert_eq!(out.exit_code, 1);
    assert_eq!(out.stderr, "error: remote refused");

    let out = run(&router, &["wrong"]);
    assert_eq!(out.exit_code, 1);
    assert!(out.stderr.starts_with("error: contract violation"));
}
