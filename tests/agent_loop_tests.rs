//! Thread continuity, isolation and serialization through the agent loop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockProvider;
use pretty_assertions::assert_eq;
use research_brief::agent_loop::{AgentLoop, LoopLimits, ReactLoop};
use research_brief::brief::BriefGenerator;
use research_brief::error::BriefError;
use research_brief::memory::{FileMemoryStore, InMemoryStore, MemoryStore};
use research_brief::types::{ModelMessage, Role};

#[tokio::test]
async fn reused_thread_id_continues_the_conversation() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("brief one");
    provider.queue_response("brief two");
    let agent = Arc::new(ReactLoop::new(provider.clone(), Arc::new(InMemoryStore::new())));
    let generator = BriefGenerator::with_agent_loop(agent, "mock-model");

    assert_eq!(
        generator.generate_brief("solar", Some("t1")).await.unwrap(),
        "brief one"
    );
    assert_eq!(
        generator.generate_brief("wind", Some("t1")).await.unwrap(),
        "brief two"
    );

    let requests = provider.requests.lock().unwrap();
    let second = &requests[1].messages;
    assert_eq!(second.len(), 3);
    assert!(second[0].text().contains("'solar'"));
    assert_eq!(second[1].text(), "brief one");
    assert!(second[2].text().contains("'wind'"));
}

#[tokio::test]
async fn distinct_threads_do_not_share_history() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("a");
    provider.queue_response("b");
    let store = Arc::new(InMemoryStore::new());
    let agent = Arc::new(ReactLoop::new(provider.clone(), store.clone()));
    let generator = BriefGenerator::with_agent_loop(agent, "mock-model");

    generator.generate_brief("first", Some("t1")).await.unwrap();
    generator.generate_brief("second", Some("t2")).await.unwrap();

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 1);
    assert!(requests[1].messages[0].text().contains("'second'"));

    let mut ids = store.thread_ids();
    ids.sort();
    assert_eq!(ids, vec!["t1".to_string(), "t2".to_string()]);
}

#[tokio::test]
async fn concurrent_submissions_on_one_thread_are_serialized() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("one");
    provider.queue_response("two");
    let store = Arc::new(InMemoryStore::new());
    let agent = ReactLoop::new(provider.clone(), store.clone());

    let (a, b) = futures::join!(
        agent.submit(vec![ModelMessage::user("a")], "shared"),
        agent.submit(vec![ModelMessage::user("b")], "shared"),
    );
    a.unwrap();
    b.unwrap();

    {
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
    }

    let history = store.get_history("shared").await.unwrap();
    let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn provider_failure_leaves_thread_untouched() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("kept");
    let store = Arc::new(InMemoryStore::new());
    let agent = ReactLoop::new(provider.clone(), store.clone());

    agent.submit(vec![ModelMessage::user("ok")], "t").await.unwrap();
    // Queue is empty now, so the provider errors.
    let err = agent
        .submit(vec![ModelMessage::user("fails")], "t")
        .await
        .unwrap_err();
    assert!(matches!(err, BriefError::Provider { .. }));
    assert_eq!(store.get_history("t").await.unwrap().len(), 2);
}

#[tokio::test]
async fn tool_call_without_matching_tool_still_finishes() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_tool_call("c1", "tavily_search_results_json", serde_json::json!({"query": "q"}));
    provider.queue_response("final");
    let agent = ReactLoop::new(provider.clone(), Arc::new(InMemoryStore::new()));

    let messages = agent.submit(vec![ModelMessage::user("q")], "t").await.unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].text(), "final");
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_limit_aborts_the_run() {
    struct SlowProvider;

    #[async_trait::async_trait]
    impl research_brief::provider::ModelProvider for SlowProvider {
        fn provider_name(&self) -> &str {
            "slow"
        }

        fn model_id(&self) -> &str {
            "slow-model"
        }

        async fn generate_text(
            &self,
            _request: &research_brief::provider::ProviderRequest,
        ) -> Result<research_brief::provider::ProviderResponse, BriefError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(BriefError::Provider {
                provider: "slow".into(),
                message: "unreachable".into(),
            })
        }
    }

    let store = Arc::new(InMemoryStore::new());
    let agent = ReactLoop::new(Arc::new(SlowProvider), store.clone())
        .with_limits(LoopLimits::new(5, Some(Duration::from_secs(2))).unwrap());

    let err = agent
        .submit(vec![ModelMessage::user("q")], "t")
        .await
        .unwrap_err();
    assert!(matches!(err, BriefError::Timeout(2000)));
    assert!(store.get_history("t").await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_carries_threads_across_generators() {
    let dir = tempfile::tempdir().unwrap();

    let first_provider = Arc::new(MockProvider::new());
    first_provider.queue_response("persisted brief");
    let first = ReactLoop::new(first_provider, Arc::new(FileMemoryStore::new(dir.path())));
    BriefGenerator::with_agent_loop(Arc::new(first), "mock-model")
        .generate_brief("hydrogen", Some("saved"))
        .await
        .unwrap();

    let second_provider = Arc::new(MockProvider::new());
    second_provider.queue_response("follow-up");
    let second = ReactLoop::new(
        second_provider.clone(),
        Arc::new(FileMemoryStore::new(dir.path())),
    );
    BriefGenerator::with_agent_loop(Arc::new(second), "mock-model")
        .generate_brief("storage", Some("saved"))
        .await
        .unwrap();

    let requests = second_provider.requests.lock().unwrap();
    assert_eq!(requests[0].messages.len(), 3);
    assert_eq!(requests[0].messages[1].text(), "persisted brief");
}
