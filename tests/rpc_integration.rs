//! Integration tests for the JSON-RPC server public API.
//! Exercises RpcContext from outside the crate, including persistence across restarts.

use brandscaling::access::AccessControl;
use brandscaling::config::Config;
use brandscaling::quiz::{QuestionBank, RetakePolicy};
use brandscaling::rpc::{JsonRpcRequest, RpcContext, INVALID_PARAMS};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

fn day_one() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn day_thirty_one() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap()
}

fn make_request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: Some("2.0".to_string()),
        id: Some(json!(1)),
        method: method.to_string(),
        params: Some(params),
    }
}

fn answers(letter: &str) -> serde_json::Value {
    (1..=20)
        .map(|id| json!({ "questionId": id, "selectedOption": letter }))
        .collect()
}

fn standard_context() -> RpcContext {
    RpcContext::new(
        QuestionBank::standard(),
        AccessControl::standard(),
        RetakePolicy::default(),
    )
}

#[test]
fn retake_refusal_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let mut ctx = standard_context()
        .with_results_file(path.clone())
        .unwrap()
        .with_clock(day_one);
    let resp = ctx.handle_request(&make_request(
        "quiz/submit",
        json!({ "userId": "u1", "answers": answers("A") }),
    ));
    assert!(resp.error.is_none());
    drop(ctx);

    let mut restarted = standard_context()
        .with_results_file(path.clone())
        .unwrap()
        .with_clock(day_one);
    let resp = restarted.handle_request(&make_request(
        "quiz/submit",
        json!({ "userId": "u1", "answers": answers("B") }),
    ));
    let result = resp.result.expect("expected result");
    assert_eq!(result["archetype"], "Architect");
    assert_eq!(result["stored"], false);
    assert_eq!(restarted.results().count_for_user("u1"), 1);
}

#[test]
fn retake_allowed_after_cooldown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let mut ctx = standard_context()
        .with_results_file(path.clone())
        .unwrap()
        .with_clock(day_one);
    ctx.handle_request(&make_request(
        "quiz/submit",
        json!({ "userId": "u1", "answers": answers("A") }),
    ));

    let mut later = standard_context()
        .with_results_file(path)
        .unwrap()
        .with_clock(day_thirty_one);
    let resp = later.handle_request(&make_request(
        "quiz/eligibility",
        json!({ "userId": "u1" }),
    ));
    assert_eq!(resp.result.unwrap()["canRetake"], true);

    let resp = later.handle_request(&make_request(
        "quiz/submit",
        json!({ "userId": "u1", "answers": answers("B") }),
    ));
    let result = resp.result.unwrap();
    assert_eq!(result["archetype"], "Alchemist");
    assert_eq!(result["stored"], true);
    assert_eq!(later.results().count_for_user("u1"), 2);
}

#[test]
fn invalid_option_letter_is_invalid_params() {
    let mut list = answers("A");
    list[4]["selectedOption"] = json!("E");
    let resp = standard_context().handle_request(&make_request(
        "quiz/score",
        json!({ "answers": list }),
    ));
    let err = resp.error.expect("expected error");
    assert_eq!(err.code, INVALID_PARAMS);
    assert!(err.message.contains('5'));
}

#[test]
fn context_built_from_config_uses_its_tiers() {
    let config: Config = serde_json::from_str(
        r#"{ "tiers": { "intermediate": { "courses": "ALL", "qna": true, "events": true } } }"#,
    )
    .unwrap();
    let mut ctx = RpcContext::new(
        config.build_question_bank().unwrap(),
        config.build_access_control().unwrap(),
        config.retake_policy().unwrap(),
    );

    let resp = ctx.handle_request(&make_request(
        "access/check",
        json!({ "tier": "intermediate", "feature": "events" }),
    ));
    assert_eq!(resp.result.unwrap()["hasAccess"], true);

    let resp = ctx.handle_request(&make_request(
        "access/courses",
        json!({ "tier": "intermediate" }),
    ));
    assert_eq!(resp.result.unwrap()["courses"].as_array().unwrap().len(), 8);
}
