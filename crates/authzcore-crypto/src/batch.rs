//! Batch signature verification with optional parallelization, cooperative
//! cancellation, and a revocation-safe LRU verification cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::hash::sha256_bytes;
use crate::keys::{verify_signature, Ed25519PublicKey, Ed25519Signature};

/// One `(message, signature, public_key)` triple to verify.
pub struct BatchVerifyRequest<'a> {
    pub message: &'a [u8],
    pub signature: Ed25519Signature,
    pub public_key: Ed25519PublicKey,
}

/// A cooperative cancellation flag a caller can share with an in-flight
/// batch verification. Checked between items, not preemptively.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Above this many requests, verification is split across worker threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Verify a batch of signatures, returning one result per input in order.
/// `None` marks an entry left unverified because `cancel` was signalled
/// before it was reached.
pub fn verify_batch(
    requests: &[BatchVerifyRequest<'_>],
    parallel_threshold: usize,
    cancel: Option<&CancellationToken>,
) -> Vec<Option<bool>> {
    if requests.len() <= parallel_threshold {
        return verify_sequential(requests, cancel);
    }

    let worker_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(requests.len());
    let chunk_size = requests.len().div_ceil(worker_count);

    let mut results = vec![None; requests.len()];
    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for (chunk_index, chunk) in requests.chunks(chunk_size).enumerate() {
            let cancel = cancel.cloned();
            let offset = chunk_index * chunk_size;
            handles.push((offset, scope.spawn(move || verify_sequential(chunk, cancel.as_ref()))));
        }
        for (offset, handle) in handles {
            let chunk_results = handle.join().expect("verification worker panicked");
            results[offset..offset + chunk_results.len()].clone_from_slice(&chunk_results);
        }
    });
    results
}

fn verify_sequential(
    requests: &[BatchVerifyRequest<'_>],
    cancel: Option<&CancellationToken>,
) -> Vec<Option<bool>> {
    let mut results = Vec::with_capacity(requests.len());
    for req in requests {
        if cancel.map(|c| c.is_cancelled()).unwrap_or(false) {
            results.push(None);
            continue;
        }
        let verified = verify_signature(req.message, &req.signature, &req.public_key).unwrap_or(false);
        results.push(Some(verified));
    }
    results
}

type CacheKey = ([u8; 32], [u8; 64], [u8; 32]);

/// Memoizes `(message_hash, signature, public_key) -> bool` with bounded LRU
/// eviction. Caches only the pure signature check; it never observes
/// revocation, so a cache hit cannot mask a capability being revoked.
pub struct VerificationCache {
    capacity: usize,
    entries: HashMap<CacheKey, (bool, u64)>,
    clock: u64,
}

impl VerificationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    fn key(message: &[u8], signature: &Ed25519Signature, public_key: &Ed25519PublicKey) -> CacheKey {
        (sha256_bytes(message), signature.0, public_key.0)
    }

    /// Verify with memoization; returns the cached or freshly computed result.
    pub fn verify_cached(
        &mut self,
        message: &[u8],
        signature: &Ed25519Signature,
        public_key: &Ed25519PublicKey,
    ) -> bool {
        let key = Self::key(message, signature, public_key);
        self.clock += 1;
        if let Some((result, last_used)) = self.entries.get_mut(&key) {
            *last_used = self.clock;
            return *result;
        }
        let result = verify_signature(message, signature, public_key).unwrap_or(false);
        self.insert(key, result);
        result
    }

    fn insert(&mut self, key: CacheKey, result: bool) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if let Some(lru_key) = self
                .entries
                .iter()
                .min_by_key(|(_, (_, last_used))| *last_used)
                .map(|(k, _)| *k)
            {
                self.entries.remove(&lru_key);
            }
        }
        self.entries.insert(key, (result, self.clock));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Ed25519KeyPair;

    #[test]
    fn batch_verifies_all_valid() {
        let kp = Ed25519KeyPair::generate();
        let msg = b"request".to_vec();
        let sig = kp.sign(&msg);
        let pk = kp.public_key();
        let requests = vec![BatchVerifyRequest {
            message: &msg,
            signature: sig,
            public_key: pk,
        }];
        let results = verify_batch(&requests, DEFAULT_PARALLEL_THRESHOLD, None);
        assert_eq!(results, vec![Some(true)]);
    }

    #[test]
    fn batch_parallel_path_matches_sequential() {
        let kp = Ed25519KeyPair::generate();
        let msg = b"m".to_vec();
        let sig = kp.sign(&msg);
        let pk = kp.public_key();
        let requests: Vec<_> = (0..200)
            .map(|_| BatchVerifyRequest {
                message: &msg,
                signature: sig,
                public_key: pk,
            })
            .collect();
        let results = verify_batch(&requests, 8, None);
        assert!(results.iter().all(|r| *r == Some(true)));
        assert_eq!(results.len(), 200);
    }

    #[test]
    fn cancellation_leaves_a_partial_result() {
        let kp = Ed25519KeyPair::generate();
        let msg = b"m".to_vec();
        let sig = kp.sign(&msg);
        let pk = kp.public_key();
        let token = CancellationToken::new();
        token.cancel();
        let requests = vec![BatchVerifyRequest {
            message: &msg,
            signature: sig,
            public_key: pk,
        }];
        let results = verify_batch(&requests, DEFAULT_PARALLEL_THRESHOLD, Some(&token));
        assert_eq!(results, vec![None]);
    }

    #[test]
    fn verification_cache_evicts_least_recently_used() {
        let mut cache = VerificationCache::new(2);
        let kp = Ed25519KeyPair::generate();
        let pk = kp.public_key();
        let sig_a = kp.sign(b"a");
        let sig_b = kp.sign(b"b");
        let sig_c = kp.sign(b"c");

        cache.verify_cached(b"a", &sig_a, &pk);
        cache.verify_cached(b"b", &sig_b, &pk);
        cache.verify_cached(b"c", &sig_c, &pk);

        assert_eq!(cache.len(), 2);
    }
}
