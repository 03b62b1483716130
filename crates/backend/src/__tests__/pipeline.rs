#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use seqscan_core::{ConfigError, PipelineConfig, classify};

  use crate::{
    __tests__::helpers::{PipelineTestContext, generate_tokens},
    pipeline::{PipelineError, PipelinePhase},
  };

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_reference_run() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("GTC AAA GGTCC").await;

    let result = ctx.run(&ctx.config(2, 2, 2)).await.expect("pipeline run");

    assert_eq!(result.tokens_read, 3);
    assert_eq!(result.results_classified, 3);
    assert_eq!(result.matches, 2);
    assert_eq!(result.results_written, 3);
    assert_eq!(result.phase, PipelinePhase::WriterDone);
    assert_eq!(ctx.sorted_output().await, vec!["AAA no", "GGTCC si", "GTC si"]);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_no_trailing_separator() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("GTTC\nGCGT\n").await;

    ctx.run(&ctx.config(1, 1, 1)).await.expect("pipeline run");

    let raw = ctx.read_output().await;
    assert!(!raw.ends_with('\n'));
    assert_eq!(raw.split('\n').count(), 2);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_single_worker_preserves_order() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("AAAA GTCC\n  GCGT\tGGTTC\n").await;

    ctx.run(&ctx.config(1, 2, 2)).await.expect("pipeline run");

    assert_eq!(ctx.read_output().await, "AAAA no\nGTCC si\nGCGT no\nGGTTC si");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_empty_input() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("").await;

    let result = ctx.run(&ctx.config(3, 1, 1)).await.expect("pipeline run");

    assert_eq!(result.tokens_read, 0);
    assert_eq!(result.results_written, 0);
    assert_eq!(result.workers.len(), 3);
    assert_eq!(ctx.read_output().await, "");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_whitespace_only_input() {
    let ctx = PipelineTestContext::new();
    ctx.write_input(" \n\t\n\n   ").await;

    let result = ctx.run(&ctx.config(2, 3, 3)).await.expect("pipeline run");

    assert_eq!(result.tokens_read, 0);
    assert_eq!(ctx.read_output().await, "");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_more_workers_than_slots_terminates() {
    for workers in 1..=16 {
      let ctx = PipelineTestContext::new();
      ctx.write_input("GTC AAA GGTCC GTTTTC CCCC").await;

      let result = ctx.run(&ctx.config(workers, 1, 1)).await.expect("pipeline run");

      assert_eq!(result.workers.len(), workers);
      assert_eq!(result.results_written, 5, "workers = {workers}");
      assert_eq!(result.input_queue.end_markers_sent, workers as u64);
      assert_eq!(result.output_queue.end_markers_sent, 1);
    }
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_large_input_is_complete() {
    let tokens = generate_tokens(5_000, 42);
    let ctx = PipelineTestContext::new();
    let content = tokens.chunks(7).map(|line| line.join(" ")).collect::<Vec<_>>().join("\n");
    ctx.write_input(&content).await;

    let result = ctx.run(&ctx.config(4, 3, 2)).await.expect("pipeline run");

    let mut expected: Vec<String> = tokens.iter().map(|t| format!("{t} {}", classify(t))).collect();
    expected.sort();

    assert_eq!(result.tokens_read, tokens.len());
    assert_eq!(result.results_classified, tokens.len());
    assert_eq!(result.results_written, tokens.len());
    assert_eq!(
      result.matches,
      tokens.iter().filter(|t| classify(t).is_match()).count()
    );
    assert_eq!(ctx.sorted_output().await, expected);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_queues_stay_bounded() {
    let ctx = PipelineTestContext::new();
    ctx.write_input(&generate_tokens(1_000, 7).join(" ")).await;

    let result = ctx.run(&ctx.config(3, 4, 2)).await.expect("pipeline run");

    assert!(result.input_queue.peak_len <= 4);
    assert!(result.output_queue.peak_len <= 2);
    assert_eq!(result.input_queue.inserted, 1_000);
    assert_eq!(result.output_queue.removed, 1_000);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_per_worker_counts_add_up() {
    let ctx = PipelineTestContext::new();
    ctx.write_input(&generate_tokens(500, 3).join("\n")).await;

    let result = ctx.run(&ctx.config(5, 2, 2)).await.expect("pipeline run");

    let mut ids: Vec<usize> = result.workers.iter().map(|w| w.worker_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..5).collect::<Vec<_>>());
    assert_eq!(result.workers.iter().map(|w| w.classified).sum::<usize>(), 500);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_minus_one_token_is_plain_data() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("GTC -1 AAA").await;

    let result = ctx.run(&ctx.config(2, 1, 1)).await.expect("pipeline run");

    assert_eq!(result.results_written, 3);
    assert_eq!(ctx.sorted_output().await, vec!["-1 no", "AAA no", "GTC si"]);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_existing_output_is_truncated() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("GTC").await;
    tokio::fs::write(ctx.output_path(), "old line one\nold line two\nold line three")
      .await
      .expect("seed output");

    ctx.run(&ctx.config(1, 1, 1)).await.expect("pipeline run");

    assert_eq!(ctx.read_output().await, "GTC si");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_missing_source() {
    let ctx = PipelineTestContext::new();

    let err = ctx.run(&ctx.config(8, 1, 1)).await.unwrap_err();

    assert!(matches!(err, PipelineError::SourceNotFound { .. }), "got {err:?}");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_unopenable_sink_with_backlog() {
    let ctx = PipelineTestContext::new();
    // more tokens than both queues together can hold
    ctx.write_input(&generate_tokens(200, 11).join(" ")).await;
    let config = PipelineConfig::new(ctx.input_path(), ctx.dir.path().join("no-such-dir").join("out.txt"), 2)
      .with_capacities(1, 1);

    let err = ctx.run(&config).await.unwrap_err();

    assert!(matches!(err, PipelineError::SinkUnopenable { .. }), "got {err:?}");
  }

  #[tokio::test]
  async fn test_invalid_config_is_rejected() {
    let ctx = PipelineTestContext::new();
    ctx.write_input("GTC").await;

    let err = ctx.run(&ctx.config(0, 1, 1)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::ZeroWorkers)));

    let err = ctx.run(&ctx.config(1, 0, 1)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::ZeroInputCapacity)));

    let err = ctx.run(&ctx.config(1, 1, 0)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::ZeroOutputCapacity)));

    // rejected before the sink is touched
    assert!(!ctx.output_path().exists());
  }
}
