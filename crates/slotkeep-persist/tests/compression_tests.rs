//! Integration tests for request/reply correlation in the compression service

mod common;

use common::*;
use futures::future::join_all;
use slotkeep_core::CompressionConfig;
use slotkeep_persist::{codec, CompressionError, CompressionService};
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_callers_get_their_own_results() {
    let service = pooled_compression();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let text = format!("{{\"slot\":{},\"steps\":{}}}", i, i * 997);
                let compact = service.compress(text.clone()).await?;
                let restored = service.decompress(compact).await?;
                Ok::<_, CompressionError>((text, restored))
            })
        })
        .collect();

    for result in join_all(tasks).await {
        let (text, restored) = result.unwrap().unwrap();
        assert_eq!(text, restored);
    }
    assert_eq!(service.pending(), 0);
}

#[tokio::test]
async fn test_pooled_output_matches_inline_codec() {
    let service = pooled_compression();
    let text = "the same bytes either way";

    let pooled = service.compress(text).await.unwrap();
    assert_eq!(pooled, codec::compress(text).unwrap());
    assert_eq!(codec::decompress(&pooled).unwrap(), text);
}

#[tokio::test]
async fn test_malformed_input_fails_without_leaking() {
    let service = pooled_compression();

    let results = join_all((0..8).map(|_| service.decompress("not base64 at all!").wait())).await;
    assert!(results.iter().all(|r| r.is_err()));
    assert_eq!(service.pending(), 0);
}

#[tokio::test]
async fn test_disabled_background_runs_inline() {
    let service = CompressionService::start(&CompressionConfig::inline());
    assert!(!service.is_background());

    let compact = service.compress("inline").await.unwrap();
    assert_eq!(service.decompress(compact).await.unwrap(), "inline");
}
