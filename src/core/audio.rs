//! Audio asset cache with single-flight synthesis
//!
//! Memoizes synthesized speech by normalized (text, language) key.
//! Guarantees: at most one backend call in flight per key; concurrent
//! requests coalesce onto that call and all receive the same reference;
//! a failed synthesis is never cached - the entry is cleared and the
//! next request retries. Entries are never evicted within a process
//! lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::core::backends::SpeechBackend;
use crate::types::{AudioError, LanguageCode};

/// Cheap-to-clone handle to one synthesized audio asset
#[derive(Debug, Clone)]
pub struct AudioRef {
    key: Arc<CacheKey>,
    bytes: Arc<Vec<u8>>,
}

impl AudioRef {
    /// The synthesized audio payload
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Normalized prompt text this asset was synthesized from
    pub fn text(&self) -> &str {
        &self.key.text
    }

    /// Language of the asset
    pub fn language(&self) -> &LanguageCode {
        &self.key.language
    }

    /// Do two refs point at the same cached asset?
    pub fn same_asset(&self, other: &AudioRef) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

/// Normalized cache key. Whitespace and case are folded so trivially
/// identical prompts share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    language: LanguageCode,
}

impl CacheKey {
    fn new(text: &str, language: &LanguageCode) -> Self {
        Self {
            text: normalize_text(text),
            language: language.clone(),
        }
    }
}

/// Fold case and collapse runs of whitespace
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Per-key cache slot
enum Entry {
    /// Payload populated; immutable from here on
    Ready(AudioRef),
    /// Synthesis in flight; waiters subscribe for the result
    InFlight(broadcast::Sender<Result<AudioRef, AudioError>>),
}

/// Speech-guidance outcome, distinguishing "voice assist is off for this
/// tier" from an actual failure
#[derive(Debug, Clone)]
pub enum SpeechOutcome {
    Spoken(AudioRef),
    VoiceDisabled,
}

/// The shared audio cache. The one genuinely concurrent resource in the
/// engine: different screens (and users) race on the same prompt keys.
pub struct AudioCache {
    entries: Arc<Mutex<HashMap<CacheKey, Entry>>>,
    backend: Arc<dyn SpeechBackend>,
}

impl AudioCache {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            backend,
        }
    }

    /// Get the cached asset for a prompt, synthesizing it on first use.
    ///
    /// Concurrent callers for the same key coalesce onto one backend
    /// call; the synthesis runs in a spawned task, so a caller dropping
    /// its wait does not cancel the call for the remaining waiters. No
    /// timeout is imposed here - callers wrap their own.
    pub async fn get_or_synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> Result<AudioRef, AudioError> {
        let key = CacheKey::new(text, language);

        let mut rx = {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(Entry::Ready(asset)) => return Ok(asset.clone()),
                // Subscribe under the lock: the in-flight task also
                // publishes under the lock, so a send cannot slip in
                // between observing InFlight and subscribing.
                Some(Entry::InFlight(tx)) => tx.subscribe(),
                None => {
                    let (tx, rx) = broadcast::channel(4);
                    entries.insert(key.clone(), Entry::InFlight(tx.clone()));
                    self.spawn_synthesis(key.clone(), tx);
                    debug!(text = %key.text, language = %key.language, "synthesis started");
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(result) => result,
            // Sender dropped without publishing (synthesis task died)
            Err(_) => Err(AudioError::SynthesisFailed {
                message: "synthesis task dropped".to_string(),
            }),
        }
    }

    fn spawn_synthesis(
        &self,
        key: CacheKey,
        tx: broadcast::Sender<Result<AudioRef, AudioError>>,
    ) {
        let backend = self.backend.clone();
        let entries = self.entries.clone();
        tokio::spawn(async move {
            let result = backend.synthesize(&key.text, &key.language).await;

            let mut entries = entries.lock().await;
            let outcome = match result {
                Ok(bytes) => {
                    let asset = AudioRef {
                        key: Arc::new(key.clone()),
                        bytes: Arc::new(bytes),
                    };
                    entries.insert(key, Entry::Ready(asset.clone()));
                    Ok(asset)
                }
                Err(err) => {
                    // Never cache a failure: clear the slot so the next
                    // request retries synthesis.
                    entries.remove(&key);
                    warn!(text = %key.text, error = %err, "synthesis failed");
                    Err(AudioError::SynthesisFailed { message: err.message })
                }
            };
            // Publish under the lock; waiters subscribed under it too.
            let _ = tx.send(outcome);
        });
    }

    /// Number of populated or in-flight entries
    pub async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SynthesisError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Backend that counts calls and can be told to fail
    struct CountingBackend {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail: AtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl SpeechBackend for CountingBackend {
        async fn synthesize(
            &self,
            text: &str,
            language: &LanguageCode,
        ) -> Result<Vec<u8>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(SynthesisError::new("backend down"));
            }
            Ok(format!("{}|{}", language, text).into_bytes())
        }
    }

    #[test]
    fn test_normalization_folds_whitespace_and_case() {
        assert_eq!(normalize_text("Water  the\tField"), "water the field");
        assert_eq!(normalize_text("  water the field  "), "water the field");
    }

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let backend = Arc::new(CountingBackend::new());
        let cache = AudioCache::new(backend.clone());
        let en = LanguageCode::new("en");

        let first = cache.get_or_synthesize("Water the field", &en).await.unwrap();
        let second = cache.get_or_synthesize("water  THE field", &en).await.unwrap();

        assert!(first.same_asset(&second));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_languages_do_not_share_entries() {
        let backend = Arc::new(CountingBackend::new());
        let cache = AudioCache::new(backend.clone());

        let en = cache
            .get_or_synthesize("tap the button", &LanguageCode::new("en"))
            .await
            .unwrap();
        let ta = cache
            .get_or_synthesize("tap the button", &LanguageCode::new("ta"))
            .await
            .unwrap();

        assert!(!en.same_asset(&ta));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_sticky() {
        let backend = Arc::new(CountingBackend::new());
        let cache = AudioCache::new(backend.clone());
        let en = LanguageCode::new("en");

        backend.fail.store(true, Ordering::SeqCst);
        let err = cache.get_or_synthesize("take a photo", &en).await.unwrap_err();
        assert!(matches!(err, AudioError::SynthesisFailed { .. }));
        assert_eq!(cache.entry_count().await, 0, "failed entry must be cleared");

        backend.fail.store(false, Ordering::SeqCst);
        let asset = cache.get_or_synthesize("take a photo", &en).await.unwrap();
        assert_eq!(asset.bytes(), b"en|take a photo");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
