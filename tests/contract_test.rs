//! Public contract of the envelope builders and the logger, exercised
//! through the crate's public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use api_starter::config::Environment;
use api_starter::http::envelope::{build_error, build_success, is_error, is_success, Envelope, ErrorOptions, Issue, SuccessOptions};
use api_starter::http::pagination::{build_paginated, PaginatedOptions, Pagination};
use api_starter::http::StatusKey;
use api_starter::observability::{BufferConsole, LogLevel, Logger, LoggerSettings, MemoryCollector, RecordedCall};

fn settings(environment: Environment) -> LoggerSettings {
    LoggerSettings {
        environment,
        collector_enabled: true,
        collector_logging_enabled: true,
        colors: false,
    }
}

fn counting_ids() -> impl Fn() -> String + Send + Sync + 'static {
    let counter = AtomicUsize::new(0);
    move || format!("id{}", counter.fetch_add(1, Ordering::SeqCst))
}

#[test]
fn test_context_block_only_when_present() {
    let console = Arc::new(BufferConsole::new());
    let logger = Logger::new(settings(Environment::Development)).with_console(console.clone());

    for level in LogLevel::ALL {
        console_call(&logger, level, json!({}));
        assert!(!console.last().unwrap().contains('\n'), "{:?}", level);

        console_call(&logger, level, json!({ "userId": 7 }));
        let line = console.last().unwrap();
        assert_eq!(line.matches('\n').count(), 3, "{:?}", level);
        assert!(line.ends_with("{\n  \"userId\": 7\n}"));
    }
}

fn console_call(logger: &Logger, level: LogLevel, context: Value) {
    match level {
        LogLevel::Error => logger.error("msg", context),
        LogLevel::Warn => logger.warn("msg", context),
        LogLevel::Log => logger.log("msg", context),
        LogLevel::Debug => logger.debug("msg", context),
        LogLevel::Verbose => logger.verbose("msg", context),
    }
}

#[test]
fn test_identifier_only_for_error_warn_verbose() {
    let console = Arc::new(BufferConsole::new());
    let logger = Logger::new(settings(Environment::Development))
        .with_console(console.clone())
        .with_id_generator(Arc::new(counting_ids()));

    for level in LogLevel::ALL {
        console_call(&logger, level, json!({}));
        let has_id = console.last().unwrap().contains("[id");
        assert_eq!(has_id, level.carries_identifier(), "{:?}", level);
    }
}

#[test]
fn test_debug_not_forwarded_outside_development() {
    let collector = Arc::new(MemoryCollector::new());
    let logger = Logger::new(settings(Environment::Production))
        .with_console(Arc::new(BufferConsole::new()))
        .with_collector(collector.clone());

    logger.debug("hidden", ());
    logger.verbose("hidden", ());
    assert!(collector.is_empty());

    logger.log("shown", ());
    assert_eq!(collector.breadcrumbs().len(), 1);
}

#[test]
fn test_error_capture_tagged_with_console_identifier() {
    let console = Arc::new(BufferConsole::new());
    let collector = Arc::new(MemoryCollector::new());
    let logger = Logger::new(settings(Environment::Production))
        .with_console(console.clone())
        .with_collector(collector.clone())
        .with_id_generator(Arc::new(|| "fixed01".to_string()));

    logger.error("db down", json!({ "attempt": 3 }));

    assert!(console.last().unwrap().contains("[fixed01]"));
    let exception = collector
        .calls()
        .into_iter()
        .find_map(|call| match call {
            RecordedCall::Exception { message, scope } => Some((message, scope)),
            _ => None,
        })
        .unwrap();
    assert_eq!(exception.0, "db down");
    assert_eq!(exception.1.tags.get("log_identifier").map(String::as_str), Some("fixed01"));
    assert_eq!(exception.1.extra.get("attempt"), Some(&json!(3)));
}

#[test]
fn test_success_defaults_shape() {
    let value = serde_json::to_value(build_success::<Value>(SuccessOptions::new())).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();

    assert_eq!(keys, ["message", "statusCode", "success", "timestamp"]);
    assert_eq!(value["message"], "Operation completed successfully");
    assert_eq!(value["statusCode"], 200);
}

#[test]
fn test_no_content_drops_data() {
    let envelope = build_success(
        SuccessOptions::new()
            .status(StatusKey::NoContent)
            .data(json!({ "x": 1 })),
    );
    let value = serde_json::to_value(envelope).unwrap();
    assert!(value.get("data").is_none());
    assert_eq!(value["statusCode"], 204);
}

#[test]
fn test_error_shape() {
    let envelope = build_error(
        StatusKey::UnprocessableEntity,
        "bad input",
        ErrorOptions::new().include_timestamp(false),
    );
    assert_eq!(
        serde_json::to_value(envelope).unwrap(),
        json!({
            "success": false,
            "error": { "name": "Unprocessable Entity", "issues": [{ "message": "bad input" }] },
            "statusCode": 422
        })
    );
}

#[test]
fn test_supplied_issues_kept_in_order() {
    let issues = vec![
        Issue::new("Required").at("email"),
        Issue::new("Too short").at("password").code("too_small"),
    ];
    let envelope = build_error(StatusKey::BadRequest, "ignored", ErrorOptions::new().issues(issues.clone()));
    assert_eq!(envelope.error.issues, issues);
}

#[test]
fn test_paginated_flags() {
    let envelope = build_paginated(vec![1, 2, 3], Pagination::new(2, 3, 10, 4), PaginatedOptions::new());
    let value = serde_json::to_value(envelope).unwrap();

    assert_eq!(value["message"], "Retrieved 3 items");
    assert_eq!(value["data"]["pagination"]["hasNext"], true);
    assert_eq!(value["data"]["pagination"]["hasPrev"], true);
}

#[test]
fn test_predicates_are_total() {
    for value in [Value::Null, json!(42), json!({}), json!("success"), json!([true])] {
        assert!(!is_error(&value));
        assert!(!is_success(&value));
    }

    let error = serde_json::to_value(build_error(StatusKey::NotFound, "gone", ErrorOptions::new())).unwrap();
    assert!(is_error(&error));
    assert!(!is_success(&error));
}

#[test]
fn test_round_trip_keeps_variant() {
    let bodies = [
        serde_json::to_string(&build_success(SuccessOptions::new().data(json!({ "a": 1 })))).unwrap(),
        serde_json::to_string(&build_error(StatusKey::Conflict, "taken", ErrorOptions::new())).unwrap(),
        serde_json::to_string(&build_paginated(vec!["x"], Pagination::from_total(1, 10, 1), PaginatedOptions::new())).unwrap(),
    ];

    let parsed: Vec<Envelope> = bodies.iter().map(|b| serde_json::from_str(b).unwrap()).collect();
    assert!(parsed[0].is_success());
    assert!(parsed[1].is_error());
    assert_eq!(parsed[1].status_code(), 409);
    assert!(parsed[2].is_success());
}
