//! End-to-end generation tests against a scripted provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use toolgen::provider::ScriptedProvider;
use toolgen::tools::{blocking, derive_schema};
use toolgen::{
    generate, ChatMessage, ChatRole, FnTool, GenerateError, Generator, ProviderError, ToolRegistry,
};

#[derive(Deserialize, JsonSchema)]
struct CalculateParams {
    /// The mathematical expression to evaluate
    expression: String,
}

/// Adds `a+b` style expressions; enough to exercise the loop.
fn evaluate(expression: &str) -> anyhow::Result<f64> {
    let mut total = 0.0;
    for term in expression.split('+') {
        total += term.trim().parse::<f64>()?;
    }
    Ok(total)
}

fn calculator(calls: Arc<AtomicUsize>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(
            "calculate",
            blocking(
                "A tool for evaluating mathematical expressions.",
                move |p: CalculateParams| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    evaluate(&p.expression)
                },
            ),
        )
        .unwrap()
}

fn provider() -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::new())
}

#[tokio::test]
async fn calculate_scenario() {
    let provider = provider();
    provider
        .push_tool_calls(&[("calculate", r#"{"expression":"1+1"}"#)])
        .push_text("The answer is 2");

    let calls = Arc::new(AtomicUsize::new(0));
    let result = generate(
        provider.clone(),
        "gpt-4o-mini",
        "You are solving math problems.",
        "What is 1+1?",
        0.0,
        &calculator(calls.clone()),
    )
    .await
    .unwrap();

    assert_eq!(result.text, "The answer is 2");
    assert_eq!(result.roundtrips, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        result.transcript[3],
        ChatMessage::Tool {
            tool_call_id: "call_0_0".into(),
            name: "calculate".into(),
            content: "2.0".into(),
        }
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "gpt-4o-mini");
    assert_eq!(requests[0].tool_names, vec!["calculate".to_string()]);
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[1].messages.len(), 4);
}

#[tokio::test]
async fn text_on_first_roundtrip_returns_zero_roundtrips() {
    let provider = provider();
    provider.push_text("Just text.");

    let result = Generator::new(provider.clone(), "m")
        .generate(
            &calculator(Arc::default()),
            "sys",
            "hi",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.text, "Just text.");
    assert_eq!(result.roundtrips, 0);
    let roles: Vec<ChatRole> = result.transcript.iter().map(ChatMessage::role).collect();
    assert_eq!(roles, vec![ChatRole::System, ChatRole::User, ChatRole::Assistant]);
}

#[tokio::test]
async fn transcript_length_matches_tool_calls_per_roundtrip() {
    let per_round = [1usize, 3, 2];
    let provider = provider();
    for &k in &per_round {
        let calls: Vec<(&str, &str)> = (0..k)
            .map(|_| ("calculate", r#"{"expression":"2+3"}"#))
            .collect();
        provider.push_tool_calls(&calls);
    }
    provider.push_text("five, many times");

    let calls = Arc::new(AtomicUsize::new(0));
    let result = Generator::new(provider.clone(), "m")
        .generate(
            &calculator(calls.clone()),
            "s",
            "u",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let n = per_round.len();
    let expected = 2 + per_round.iter().map(|k| 1 + k).sum::<usize>() + 1;
    assert_eq!(result.roundtrips as usize, n);
    assert_eq!(result.transcript.len(), expected);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(provider.exchange_count(), n + 1);

    // Every tool turn answers a request made earlier in the transcript.
    for (i, msg) in result.transcript.iter().enumerate() {
        if let ChatMessage::Tool { tool_call_id, .. } = msg {
            let requested_before = result.transcript[..i]
                .iter()
                .flat_map(ChatMessage::tool_calls)
                .any(|tc| &tc.id == tool_call_id);
            assert!(requested_before, "orphan tool turn {tool_call_id}");
        }
    }
}

#[tokio::test]
async fn tool_bearing_turn_with_text_does_not_terminate() {
    let provider = provider();
    provider.push_response(toolgen::InferenceResponse {
        content: Some("Let me calculate that.".into()),
        ..toolgen::InferenceResponse::with_tool_calls(vec![toolgen::ToolCall {
            id: "a".into(),
            name: "calculate".into(),
            arguments: r#"{"expression":"1+2"}"#.into(),
        }])
    });
    provider.push_text("3");

    let result = Generator::new(provider.clone(), "m")
        .generate(&calculator(Arc::default()), "s", "u", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.text, "3");
    assert_eq!(result.roundtrips, 1);
}

#[tokio::test]
async fn unknown_tool_aborts_without_further_exchanges() {
    let provider = provider();
    provider
        .push_tool_calls(&[("calculate", r#"{"expression":"1+1"}"#)])
        .push_tool_calls(&[("search", r#"{"query":"langchain"}"#)])
        .push_text("unreachable");

    let err = Generator::new(provider.clone(), "m")
        .generate(&calculator(Arc::default()), "s", "u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::ToolNotFound { .. }));
    assert_eq!(err.tool_name(), Some("search"));
    assert_eq!(provider.exchange_count(), 2);
}

#[tokio::test]
async fn malformed_arguments_fail_without_running_the_tool() {
    let provider = provider();
    provider
        .push_tool_calls(&[("calculate", r#"{"expr": 1}"#)])
        .push_text("unreachable");

    let calls = Arc::new(AtomicUsize::new(0));
    let err = Generator::new(provider.clone(), "m")
        .generate(&calculator(calls.clone()), "s", "u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_decode(), "{err}");
    assert_eq!(err.tool_name(), Some("calculate"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.exchange_count(), 1);
}

#[tokio::test]
async fn failing_tool_aborts_the_generation() {
    let provider = provider();
    provider
        .push_tool_calls(&[("calculate", r#"{"expression":"1+x"}"#)])
        .push_text("unreachable");

    let err = Generator::new(provider.clone(), "m")
        .generate(&calculator(Arc::default()), "s", "u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_execution(), "{err}");
    assert!(err.to_string().starts_with("tool calculate failed"));
    assert_eq!(provider.exchange_count(), 1);
}

#[tokio::test]
async fn roundtrip_limit_is_exact() {
    let provider = provider();
    for _ in 0..11 {
        provider.push_tool_calls(&[("calculate", r#"{"expression":"1+1"}"#)]);
    }

    let err = Generator::new(provider.clone(), "m")
        .generate(&calculator(Arc::default()), "s", "u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::RoundtripLimitExceeded { limit: 10 }));
    assert_eq!(provider.exchange_count(), 10);
}

#[tokio::test]
async fn answer_on_last_allowed_roundtrip_succeeds() {
    let provider = provider();
    for _ in 0..9 {
        provider.push_tool_calls(&[("calculate", r#"{"expression":"1+1"}"#)]);
    }
    provider.push_text("finally");

    let result = Generator::new(provider.clone(), "m")
        .generate(&calculator(Arc::default()), "s", "u", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.roundtrips, 9);
    assert_eq!(provider.exchange_count(), 10);
}

#[tokio::test]
async fn provider_failure_is_not_retried() {
    let provider = provider();
    provider.push_error("upstream unavailable").push_text("unreachable");

    let err = Generator::new(provider.clone(), "m")
        .generate(&ToolRegistry::new(), "s", "u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Provider(ProviderError::Other(_))));
    assert!(err.to_string().contains("upstream unavailable"));
    assert_eq!(provider.exchange_count(), 1);
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_exchange() {
    let provider = provider();
    provider.push_hang();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = Generator::new(provider.clone(), "m")
        .generate(&ToolRegistry::new(), "s", "u", &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Cancelled));
}

#[tokio::test]
async fn registry_is_shared_across_concurrent_generations() {
    #[derive(Deserialize, JsonSchema)]
    struct Owner {
        owner: String,
        repo: String,
    }

    #[derive(Serialize)]
    struct Contributors {
        repo: String,
        count: usize,
    }

    let registry = Arc::new(
        ToolRegistry::new()
            .with_tool(
                "fetchRepoContributors",
                FnTool::new("Fetches all contributors of a repository", |p: Owner| async move {
                    tokio::task::yield_now().await;
                    Ok::<_, anyhow::Error>(Contributors {
                        repo: format!("{}/{}", p.owner, p.repo),
                        count: p.repo.len(),
                    })
                }),
            )
            .unwrap(),
    );

    let mut handles = Vec::new();
    for repo in ["langchain", "tokio"] {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let provider = Arc::new(ScriptedProvider::new());
            let args = format!(r#"{{"owner":"someone","repo":"{repo}"}}"#);
            provider
                .push_tool_calls(&[("fetchRepoContributors", args.as_str())])
                .push_text(repo);
            Generator::new(provider, "m")
                .generate(&registry, "s", "u", &CancellationToken::new())
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        let tool_turn = result.transcript[3].content().unwrap();
        assert!(tool_turn.contains(&format!("someone/{}", result.text)));
        assert_eq!(result.roundtrips, 1);
    }
}

#[test]
fn flat_schema_declares_one_string_property() {
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Params {
        #[serde(rename = "Expression")]
        expression: String,
    }

    let schema = derive_schema::<Params>();
    let props = schema["properties"].as_object().unwrap();
    assert_eq!(props.len(), 1);
    assert_eq!(props["Expression"]["type"], "string");
    assert!(schema.get("$schema").is_none());
    assert!(!schema.to_string().contains("$ref"));
}
