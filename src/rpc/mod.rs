//! Stdio JSON-RPC server for the quiz and access endpoints.
//!
//! One request per line, one response per line. Methods: quiz/submit,
//! quiz/score, quiz/eligibility, quiz/result, access/check, access/courses.

use crate::access::{AccessControl, AccessRequest};
use crate::quiz::{self, QuestionBank, QuizScorer, RetakePolicy, SubmittedAnswer};
use crate::results::{load_results, save_results, ResultsFile};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, error, warn};

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const NOT_FOUND: i32 = -32004;

/// JSON-RPC request
#[derive(Debug, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Option<String>,
    pub id: Option<serde_json::Value>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl JsonRpcResponse {
    fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<serde_json::Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitParams {
    user_id: String,
    #[serde(alias = "responses")]
    answers: Vec<SubmittedAnswer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreParams {
    #[serde(alias = "responses")]
    answers: Vec<SubmittedAnswer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserParams {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessParams {
    tier: String,
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    course_id: Option<String>,
}

#[derive(Deserialize)]
struct CoursesParams {
    tier: String,
}

/// Everything the endpoints need, built once at startup
pub struct RpcContext {
    bank: QuestionBank,
    access: AccessControl,
    policy: RetakePolicy,
    results: ResultsFile,
    results_path: Option<PathBuf>,
    clock: fn() -> DateTime<Utc>,
}

impl RpcContext {
    /// Context with an in-memory results store
    pub fn new(bank: QuestionBank, access: AccessControl, policy: RetakePolicy) -> Self {
        Self {
            bank,
            access,
            policy,
            results: ResultsFile::default(),
            results_path: None,
            clock: Utc::now,
        }
    }

    /// Load results from `path` and write them back after each stored
    /// submission. Fails if the file exists but cannot be read or parsed.
    pub fn with_results_file(mut self, path: PathBuf) -> anyhow::Result<Self> {
        self.results = load_results(&path)?;
        self.results_path = Some(path);
        Ok(self)
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn results(&self) -> &ResultsFile {
        &self.results
    }

    /// Handle a single JSON-RPC request and return a response.
    pub fn handle_request(&mut self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let id = req.id.clone();
        debug!(method = %req.method, "rpc request");
        match self.dispatch(&req.method, req.params.as_ref()) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                debug!(method = %req.method, code = err.code, message = %err.message, "rpc error");
                JsonRpcResponse::failure(id, err)
            }
        }
    }

    /// Handle one raw line; malformed JSON gets a parse-error response
    pub fn handle_line(&mut self, line: &str) -> JsonRpcResponse {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(req) => self.handle_request(&req),
            Err(e) => {
                warn!(error = %e, "unparseable rpc request");
                JsonRpcResponse::failure(None, JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)))
            }
        }
    }

    fn dispatch(
        &mut self,
        method: &str,
        params: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        match method {
            "initialize" => Ok(serde_json::json!({
                "serverInfo": { "name": "brandscaling", "version": env!("CARGO_PKG_VERSION") },
                "questions": self.bank.len(),
                "awarenessThreshold": self.bank.awareness_threshold(),
                "retakeCooldownDays": self.policy.cooldown_days(),
            })),
            "quiz/submit" => {
                let p: SubmitParams = parse_params(params)?;
                let now = (self.clock)();
                let outcome = quiz::submit(
                    &mut self.results,
                    &self.bank,
                    &self.policy,
                    &p.user_id,
                    &p.answers,
                    now,
                )
                .map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))?;
                if outcome.stored {
                    self.persist()?;
                }
                to_value(&outcome)
            }
            "quiz/score" => {
                let p: ScoreParams = parse_params(params)?;
                let result = QuizScorer::score_submitted(&self.bank, &p.answers)
                    .map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))?;
                to_value(&result)
            }
            "quiz/eligibility" => {
                let p: UserParams = parse_params(params)?;
                let last = self
                    .results
                    .latest_for_user(&p.user_id)
                    .map(|r| r.created_at);
                to_value(&self.policy.eligibility(last, (self.clock)()))
            }
            "quiz/result" => {
                let p: UserParams = parse_params(params)?;
                let outcome = quiz::latest_result(&self.results, &self.policy, &p.user_id, (self.clock)())
                    .ok_or_else(|| JsonRpcError::new(NOT_FOUND, "No quiz results found"))?;
                to_value(&outcome)
            }
            "access/check" => {
                let p: AccessParams = parse_params(params)?;
                let request = match (p.course_id.as_deref(), p.feature.as_deref()) {
                    (Some(course), _) => AccessRequest::Course(course),
                    (None, Some(feature)) => AccessRequest::Feature(feature),
                    (None, None) => {
                        return Err(JsonRpcError::new(
                            INVALID_PARAMS,
                            "Invalid params: one of 'feature' or 'courseId' is required",
                        ))
                    }
                };
                to_value(&self.access.check(&p.tier, request))
            }
            "access/courses" => {
                let p: CoursesParams = parse_params(params)?;
                let courses = self.access.allowed_courses_named(&p.tier);
                Ok(serde_json::json!({ "tier": p.tier, "courses": courses }))
            }
            _ => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            )),
        }
    }

    fn persist(&self) -> Result<(), JsonRpcError> {
        let Some(path) = &self.results_path else {
            return Ok(());
        };
        save_results(path, &self.results).map_err(|e| {
            error!(error = %e, "failed to persist quiz results");
            JsonRpcError::new(INTERNAL_ERROR, format!("Failed to save quiz result: {}", e))
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<&serde_json::Value>) -> Result<T, JsonRpcError> {
    let value = params.cloned().unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value)
        .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))
}

/// Run the JSON-RPC server loop (stdin / stdout).
pub fn run_rpc_server(mut ctx: RpcContext) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = ctx.handle_line(&line);
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}
