use context_cache::{AsyncDedupCache, CacheError};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_gets_share_one_computation() {
    let cache: AsyncDedupCache<String, String> = AsyncDedupCache::new(16, Duration::from_secs(30));
    let calls = Arc::new(AtomicUsize::new(0));

    let requests = (0..8).map(|_| {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        async move {
            cache
                .get("src/main.rs:12".to_string(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok("fn main() {...}".to_string())
                })
                .await
        }
    });
    let results = futures::future::join_all(requests).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        assert_eq!(result.unwrap(), "fn main() {...}");
    }
}

#[tokio::test]
async fn test_failure_reaches_every_waiter() {
    let cache: AsyncDedupCache<u32, u32> = AsyncDedupCache::new(16, Duration::from_secs(30));
    let calls = Arc::new(AtomicUsize::new(0));

    let request = |cache: AsyncDedupCache<u32, u32>, calls: Arc<AtomicUsize>| async move {
        cache
            .get(42, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(anyhow::anyhow!("definition provider unavailable"))
            })
            .await
    };

    let (a, b, c) = tokio::join!(
        request(cache.clone(), Arc::clone(&calls)),
        request(cache.clone(), Arc::clone(&calls)),
        request(cache.clone(), Arc::clone(&calls)),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for outcome in [a, b, c] {
        let err = outcome.unwrap_err();
        assert!(matches!(err, CacheError::Computation(_)));
        assert!(err.to_string().contains("definition provider unavailable"));
    }
    assert!(cache.is_empty());
    assert!(!cache.is_pending(&42));
}

#[tokio::test]
async fn test_computation_completes_after_callers_drop() {
    let cache: AsyncDedupCache<&'static str, usize> =
        AsyncDedupCache::new(16, Duration::from_secs(30));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        cache.get("slow", || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(3)
        }),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(cache.is_pending(&"slow"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.peek(&"slow"), Some(3));
    assert!(!cache.is_pending(&"slow"));

    let cached = cache
        .get("slow", || async { anyhow::bail!("factory must not run again") })
        .await
        .unwrap();
    assert_eq!(cached, 3);
}

#[tokio::test(start_paused = true)]
async fn test_expired_value_is_recomputed() {
    let ttl = Duration::from_secs(10);
    let cache: AsyncDedupCache<u8, usize> = AsyncDedupCache::new(4, ttl);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = Arc::clone(&calls);
        cache
            .get(1, move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) })
            .await
            .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(ttl + Duration::from_millis(1)).await;
    let calls_after = Arc::clone(&calls);
    let value = cache
        .get(1, move || async move { Ok(calls_after.fetch_add(1, Ordering::SeqCst)) })
        .await
        .unwrap();
    assert_eq!(value, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
