//! End-to-end tests of the ingestion, enrichment, aggregation and context
//! pipeline against a scripted provider.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{lido_fixture, pool, service_with, test_config, StubProvider};
use lst_insight::cache::IngestionCache;
use lst_insight::enrich::enrich_all;
use lst_insight::error::IngestError;
use lst_insight::prompt::ChatMessage;

fn cache(provider: Arc<StubProvider>, ttl_secs: u64) -> IngestionCache {
    IngestionCache::new(provider, Duration::from_secs(ttl_secs), Duration::from_secs(1))
}

// ─── Ingestion cache ────────────────────────────────────────────────

#[tokio::test]
async fn test_fresh_cache_makes_one_remote_call() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let cache = cache(provider.clone(), 900);

    let first = cache.fetch(false).await.unwrap();
    let second = cache.fetch(false).await.unwrap();

    assert_eq!(provider.list_calls(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_force_refresh_bypasses_fresh_cache() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let cache = cache(provider.clone(), 900);

    cache.fetch(false).await.unwrap();
    cache.fetch(true).await.unwrap();

    assert_eq!(provider.list_calls(), 2);
}

#[tokio::test]
async fn test_expired_cache_refetches() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let cache = cache(provider.clone(), 0);

    cache.fetch(false).await.unwrap();
    cache.fetch(false).await.unwrap();

    assert_eq!(provider.list_calls(), 2);
}

#[tokio::test]
async fn test_allow_list_is_applied() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let cache = cache(provider, 900);

    let records = cache.fetch(false).await.unwrap();
    let projects: Vec<&str> = records.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(projects, vec!["lido", "lido"]);
}

#[tokio::test]
async fn test_failure_serves_stale_records() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let cache = cache(provider.clone(), 900);

    let before = cache.fetch(false).await.unwrap();
    provider.set_failing(true);
    let after = cache.fetch(true).await.unwrap();

    assert_eq!(provider.list_calls(), 2);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_failure_without_cache_is_upstream_unavailable() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    provider.set_failing(true);
    let cache = cache(provider, 900);

    let err = cache.fetch(false).await.unwrap_err();
    assert!(matches!(err, IngestError::UpstreamUnavailable(_)));
    assert!(cache.fetch_or_empty(false).await.is_empty());
}

#[tokio::test]
async fn test_slow_provider_hits_deadline() {
    let provider = Arc::new(StubProvider::new(lido_fixture()).with_delay(Duration::from_secs(3)));
    let cache = cache(provider, 900);

    let err = cache.fetch(false).await.unwrap_err();
    assert!(matches!(err, IngestError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_refresh() {
    let provider =
        Arc::new(StubProvider::new(lido_fixture()).with_delay(Duration::from_millis(50)));
    let cache = cache(provider.clone(), 900);

    let (a, b, c) = tokio::join!(cache.fetch(false), cache.fetch(false), cache.fetch(false));

    assert_eq!(provider.list_calls(), 1);
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);
    assert_eq!(c.unwrap().len(), 2);
}

// ─── Enrichment ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_history_failure_is_isolated_and_order_kept() {
    let records = vec![
        pool("lido", "Ethereum", "STETH", 10.0, 3.0),
        pool("jito", "Solana", "JITOSOL", 10.0, 7.0),
        pool("stride", "Cosmos", "STATOM", 10.0, 15.0),
    ];
    let provider = Arc::new(StubProvider::new(records.clone()));
    provider.fail_history_for(&records[1].pool);

    let enriched = enrich_all(provider.clone(), &records, 2, Duration::from_secs(1)).await;

    let projects: Vec<&str> = enriched.iter().map(|p| p.record.project.as_str()).collect();
    assert_eq!(projects, vec!["lido", "jito", "stride"]);
    assert_eq!(enriched[0].history.len(), 2);
    assert!(enriched[1].history.is_empty());
    assert_eq!(enriched[2].history.len(), 2);
}

#[tokio::test]
async fn test_record_without_pool_id_gets_empty_history() {
    let mut record = pool("lido", "Ethereum", "STETH", 10.0, 3.0);
    record.pool = String::new();
    let provider = Arc::new(StubProvider::new(vec![record.clone()]));

    let enriched = enrich_all(provider.clone(), &[record], 4, Duration::from_secs(1)).await;

    assert!(enriched[0].history.is_empty());
    assert_eq!(
        provider
            .history_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

// ─── Service ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lido_pair_aggregates_into_one_protocol() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    let protocols = service.protocols(false, true).await;

    assert_eq!(protocols.len(), 1);
    let lido = &protocols[0];
    assert_eq!(lido.name, "lido");
    assert_eq!(lido.tvl, 1_500_000.0);
    assert!((lido.apy - 10.0 / 3.0).abs() < 1e-9);
    assert!((lido.change_24h - 0.1).abs() < 1e-9);
    assert_eq!(lido.pools.len(), 2);
    assert!(lido.pools.iter().all(|p| p.history.len() == 2));
}

#[tokio::test]
async fn test_history_can_be_disabled() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let mut config = test_config();
    config.ingest.enrich_history = false;
    let service = service_with(provider.clone(), config);

    let protocols = service.protocols(false, true).await;

    assert!(protocols[0].pools.iter().all(|p| p.history.is_empty()));
    assert_eq!(
        provider
            .history_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_lido_query_returns_protocol_details_for_both_chains() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    let context = service.context("tell me about lido yields").await;

    assert!(context.starts_with("## Retrieved Information"));
    assert!(context.contains("### Protocol Details"));
    assert!(context.contains("Chain: Ethereum"));
    assert!(context.contains("Chain: Polygon"));
    assert!(context.contains("TVL: $1,000,000"));
    assert!(!context.contains("uniswap"));
}

#[tokio::test]
async fn test_highest_apy_query_includes_category_and_overview() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    let context = service.context("highest apy").await;

    assert!(context.starts_with("## Retrieved Information"));
    // Category document: grouped TVL with chain.
    let category = context
        .find("- lido (STMATIC): 4.00% APY, TVL: $500,000, Chain: Polygon")
        .unwrap();
    // Appended overview: compact TVL.
    let overview = context
        .find("- lido (STMATIC): 4.00% APY, TVL: $500.00K")
        .unwrap();
    assert!(category < overview);
    assert!(!context.contains("uniswap"));
}

#[tokio::test]
async fn test_unmatched_query_returns_overview_only() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    let context = service.context("asdkjasdk").await;

    assert!(!context.contains("## Retrieved Information"));
    assert!(context.contains("Top Performing Protocols by APY"));
    assert!(context.contains("Largest Protocols by TVL"));
}

#[tokio::test]
async fn test_context_survives_provider_outage() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    provider.set_failing(true);
    let service = service_with(provider, test_config());

    let context = service.context("tell me about lido yields").await;

    assert!(!context.trim().is_empty());
    assert!(context.contains("### Market Overview"));
}

#[tokio::test]
async fn test_refresh_reports_upstream_unavailable_then_recovers() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    provider.set_failing(true);
    let service = service_with(provider.clone(), test_config());

    assert!(matches!(
        service.refresh(false).await,
        Err(IngestError::UpstreamUnavailable(_))
    ));

    provider.set_failing(false);
    let outcome = service.refresh(true).await.unwrap();
    assert_eq!(outcome.records, 2);
    assert!(outcome.indexed);
    assert_eq!(service.knowledge().status().records, 2);
}

#[tokio::test]
async fn test_reindexing_same_input_keeps_ids_and_fingerprint() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    service.refresh(true).await.unwrap();
    let first = service.knowledge().status();
    let first_ids: Vec<String> = service
        .search("lido", 20)
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.document.id)
        .collect();

    service.refresh(true).await.unwrap();
    let second = service.knowledge().status();
    let second_ids: Vec<String> = service
        .search("lido", 20)
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.document.id)
        .collect();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.documents, second.documents);
    assert_eq!(first_ids, second_ids);
    assert!(first_ids.contains(&"protocol-lido-Ethereum".to_string()));
}

#[tokio::test]
async fn test_refresh_picks_up_new_records() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider.clone(), test_config());
    service.refresh(false).await.unwrap();

    provider.set_pools(vec![pool("jito", "Solana", "JITOSOL", 2_000_000.0, 7.5)]);
    service.refresh(true).await.unwrap();

    assert!(service.knowledge().records_for_project("lido").is_empty());
    assert_eq!(service.knowledge().records_for_project("jito").len(), 1);
}

#[tokio::test]
async fn test_prompt_embeds_context_for_last_user_message() {
    let provider = Arc::new(StubProvider::new(lido_fixture()));
    let service = service_with(provider, test_config());

    let built = service
        .prompt(
            vec![
                ChatMessage::user("hello"),
                ChatMessage::user("tell me about lido yields"),
            ],
            false,
        )
        .await;

    assert_eq!(built.messages.len(), 2);
    assert!(built.system_prompt.contains("Liquid Staking Insight Agent"));
    assert!(built.system_prompt.contains("Protocol: lido"));
}
