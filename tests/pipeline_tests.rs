// Monitored pipeline tests with scripted collaborators
// Author: kelexine (https://github.com/kelexine)

mod common;

use common::{profile_results, service, ScriptedLlm, ScriptedSearch, Step};
use std::sync::Arc;
use twinrag::models::InterviewType;
use twinrag::pipeline::{HealthStatus, QueryOptions, APOLOGY_RESPONSE, NO_RESULTS_RESPONSE};

fn ok(text: &str) -> Step<String> {
    Step::Return(text.to_string())
}

fn options(timeout_ms: u64, fallback_to_basic: bool) -> QueryOptions {
    QueryOptions {
        use_cache: true,
        timeout_ms,
        fallback_to_basic,
    }
}

#[tokio::test(start_paused = true)]
async fn test_second_identical_query_is_cached() {
    let llm = Arc::new(ScriptedLlm::new(ok("strengths skills"), ok("I am strong.")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm.clone(), search.clone());

    let first = svc
        .monitored_query("What are your strengths?", None, QueryOptions::default())
        .await;
    let second = svc
        .monitored_query("What are your strengths?", None, QueryOptions::default())
        .await;

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.response, second.response);
    assert_eq!(llm.enhance_calls.lock().len(), 1);
    assert_eq!(search.queries.lock().len(), 1);

    // Cache hits are not recorded by the monitor
    let stats = svc.get_performance_stats();
    assert_eq!(stats.performance.total_queries, 1);
    assert_eq!(stats.cache.hits, 1);
    assert_eq!(stats.cache.misses, 1);
    assert_eq!(second.metrics.cache_hit_rate, 0.5);
}

#[tokio::test(start_paused = true)]
async fn test_stage_timings_and_tokens() {
    let llm = Arc::new(ScriptedLlm::new(
        Step::Delay(100, "enhanced".to_string()),
        Step::Delay(300, "formatted answer".to_string()),
    ));
    let search = Arc::new(ScriptedSearch::new(Step::Delay(200, profile_results())));
    let svc = service(llm, search);

    let result = svc
        .monitored_query("What are your strengths?", None, QueryOptions::default())
        .await;

    assert!(result.success);
    assert_eq!(result.response, "formatted answer");
    let m = &result.metrics;
    assert_eq!(m.query_enhancement_time_ms, 100);
    assert_eq!(m.vector_search_time_ms, 200);
    assert_eq!(m.response_formatting_time_ms, 300);
    assert_eq!(m.total_time_ms, 600);
    // ceil((24 + 16) / 4)
    assert_eq!(m.tokens_used, 10);
    assert_eq!(m.result_count, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_empty_search_skips_formatting() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("should not be used")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(Vec::new())));
    let svc = service(llm.clone(), search);

    let result = svc
        .monitored_query("Tell me about Kubernetes", None, QueryOptions::default())
        .await;

    assert!(result.success);
    assert_eq!(result.response, NO_RESULTS_RESPONSE);
    assert_eq!(result.metrics.response_formatting_time_ms, 0);
    assert_eq!(result.metrics.result_count, Some(0));
    assert!(llm.format_calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_enhancement_searches_original_question() {
    let llm = Arc::new(ScriptedLlm::new(Step::Fail, ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search.clone());

    let result = svc
        .monitored_query("What are your strengths?", None, options(15_000, true))
        .await;

    assert!(result.success);
    assert_eq!(result.response, "formatted");
    let queries = search.queries.lock();
    assert_eq!(queries.as_slice(), &[("What are your strengths?".to_string(), false)]);
}

#[tokio::test(start_paused = true)]
async fn test_enhanced_query_reaches_search_without_reenhancement() {
    let llm = Arc::new(ScriptedLlm::new(ok("api backend fastapi"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search.clone());

    svc.monitored_query("APIs?", None, QueryOptions::default()).await;

    assert_eq!(
        search.queries.lock().as_slice(),
        &[("api backend fastapi".to_string(), false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_degrades_to_no_results() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Fail));
    let svc = service(llm.clone(), search);

    let result = svc.monitored_query("q", None, options(15_000, true)).await;

    assert!(result.success);
    assert_eq!(result.response, NO_RESULTS_RESPONSE);
    assert!(llm.format_calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_formatting_returns_raw_results() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), Step::Fail));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search);

    let result = svc.monitored_query("q", None, options(15_000, true)).await;

    assert!(result.success);
    assert_eq!(
        result.response,
        "Built 10+ production APIs\n\nLed a team of 5 developers"
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_without_fallback_returns_apology() {
    let llm = Arc::new(ScriptedLlm::new(Step::Fail, ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search.clone());

    let result = svc.monitored_query("q", None, options(15_000, false)).await;

    assert!(!result.success);
    assert!(!result.cached);
    assert_eq!(result.response, APOLOGY_RESPONSE);
    assert!(search.queries.lock().is_empty());

    // Failures are recorded but never cached
    assert_eq!(svc.get_performance_stats().performance.total_queries, 1);
    assert_eq!(svc.get_cache_stats().size, 0);
    let retry = svc.monitored_query("q", None, options(15_000, false)).await;
    assert!(!retry.cached);
}

#[tokio::test(start_paused = true)]
async fn test_search_failure_without_fallback_skips_formatting() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Fail));
    let svc = service(llm.clone(), search);

    let result = svc.monitored_query("q", None, options(15_000, false)).await;

    assert!(!result.success);
    assert!(!result.cached);
    assert_eq!(result.response, APOLOGY_RESPONSE);
    assert_eq!(result.metrics.result_count, Some(0));
    assert!(llm.format_calls.lock().is_empty());
    assert_eq!(svc.get_cache_stats().size, 0);
    assert_eq!(svc.get_performance_stats().performance.total_queries, 1);
}

#[tokio::test(start_paused = true)]
async fn test_format_failure_without_fallback_returns_apology() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), Step::Fail));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm.clone(), search);

    let result = svc.monitored_query("q", None, options(15_000, false)).await;

    assert!(!result.success);
    assert!(!result.cached);
    assert_eq!(result.response, APOLOGY_RESPONSE);
    assert_eq!(llm.format_calls.lock().len(), 1);
    assert_eq!(svc.get_cache_stats().size, 0);

    let retry = svc.monitored_query("q", None, options(15_000, false)).await;
    assert!(!retry.cached);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_keeps_completed_stage_timings() {
    let llm = Arc::new(ScriptedLlm::new(
        Step::Delay(100, "enhanced".to_string()),
        ok("formatted"),
    ));
    let search = Arc::new(ScriptedSearch::new(Step::Hang));
    let svc = service(llm, search);

    let result = svc.monitored_query("q", None, options(1_000, true)).await;

    assert!(!result.success);
    assert_eq!(result.response, APOLOGY_RESPONSE);
    assert_eq!(result.metrics.query_enhancement_time_ms, 100);
    assert_eq!(result.metrics.vector_search_time_ms, 0);
    assert!(result.metrics.total_time_ms >= 1_000);
    assert!(result.metrics.total_time_ms < 1_100);
    assert_eq!(svc.get_cache_stats().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_llm_concatenates_results() {
    let llm = Arc::new(ScriptedLlm::unavailable());
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm.clone(), search.clone());

    let result = svc.monitored_query("q", None, QueryOptions::default()).await;

    assert!(result.success);
    assert_eq!(
        result.response,
        "Built 10+ production APIs\n\nLed a team of 5 developers"
    );
    assert_eq!(result.metrics.query_enhancement_time_ms, 0);
    assert_eq!(result.metrics.response_formatting_time_ms, 0);
    assert!(llm.enhance_calls.lock().is_empty());
    assert_eq!(search.queries.lock()[0].0, "q");
}

#[tokio::test(start_paused = true)]
async fn test_cache_disabled_per_query() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search.clone());
    let no_cache = QueryOptions {
        use_cache: false,
        ..QueryOptions::default()
    };

    let first = svc.monitored_query("q", None, no_cache.clone()).await;
    let second = svc.monitored_query("q", None, no_cache).await;

    assert!(!first.cached && !second.cached);
    assert_eq!(search.queries.lock().len(), 2);
    assert_eq!(svc.get_cache_stats().size, 0);
    assert_eq!(svc.get_performance_stats().performance.total_queries, 2);
}

#[tokio::test(start_paused = true)]
async fn test_interview_config_separates_cache_entries() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search.clone());
    let technical = InterviewType::Technical.config();

    svc.monitored_query("q", None, QueryOptions::default()).await;
    let with_config = svc
        .monitored_query("q", Some(&technical), QueryOptions::default())
        .await;

    assert!(!with_config.cached);
    assert_eq!(
        with_config.metrics.interview_type.as_deref(),
        Some("technical_interview")
    );
    assert_eq!(search.queries.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clear_monitoring_resets_everything() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search);

    svc.monitored_query("q", None, QueryOptions::default()).await;
    svc.monitored_query("q", None, QueryOptions::default()).await;
    svc.clear_monitoring();

    let stats = svc.get_performance_stats();
    assert_eq!(stats.cache.size, 0);
    assert_eq!(stats.cache.hits, 0);
    assert_eq!(stats.cache.misses, 0);
    assert_eq!(stats.performance.total_queries, 0);
    assert!(stats.performance.averages.is_empty());

    let after = svc.monitored_query("q", None, QueryOptions::default()).await;
    assert!(!after.cached);
}

#[tokio::test(start_paused = true)]
async fn test_export_and_health_views() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search);

    svc.monitored_query("q", None, QueryOptions::default()).await;

    let export = svc.export_metrics();
    assert_eq!(export.performance.total_queries, 1);
    assert_eq!(export.health.status, HealthStatus::Degraded);
    assert!(export.health.recommendations[0].starts_with("Low cache hit rate"));

    // Warm-up: under 10 queries the liveness view stays healthy
    assert_eq!(svc.health_summary().status, HealthStatus::Healthy);

    for _ in 0..3 {
        svc.monitored_query("q", None, QueryOptions::default()).await;
    }
    let export = svc.export_metrics();
    assert_eq!(export.cache.hits, 3);
    assert_eq!(export.health.status, HealthStatus::Healthy);
    assert_eq!(
        export.health.recommendations,
        vec!["System is performing optimally.".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_reports_progress_in_order() {
    let llm = Arc::new(ScriptedLlm::new(ok("enhanced"), ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Delay(50, profile_results())));
    let svc = service(llm, search);
    let questions = vec![
        "first".to_string(),
        "second".to_string(),
        "first".to_string(),
    ];

    let mut progress = Vec::new();
    let results = svc
        .monitored_batch_query(&questions, None, 1, |p| progress.push(p.clone()))
        .await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    assert!(!results[0].cached);
    assert!(results[2].cached);

    assert_eq!(progress.len(), 3);
    assert_eq!(progress[0].completed, 1);
    assert_eq!(progress[2].completed, 3);
    assert_eq!(progress[2].failed, 0);
    assert_eq!(progress[2].estimated_time_remaining_ms, 0);
}

#[tokio::test(start_paused = true)]
async fn test_batch_counts_failures() {
    let llm = Arc::new(ScriptedLlm::new(Step::Fail, ok("formatted")));
    let search = Arc::new(ScriptedSearch::new(Step::Return(profile_results())));
    let svc = service(llm, search).with_default_options(QueryOptions {
        fallback_to_basic: false,
        ..QueryOptions::default()
    });

    let mut last = None;
    let results = svc
        .monitored_batch_query(&["a".to_string(), "b".to_string()], None, 2, |p| {
            last = Some(p.clone())
        })
        .await;

    assert!(results.iter().all(|r| !r.success));
    let last = last.unwrap();
    assert_eq!(last.failed, 2);
    assert_eq!(last.completed, 0);
}
