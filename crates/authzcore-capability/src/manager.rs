//! Issue, verify, delegate, and revoke capabilities; cache sessions; and run
//! the full and fast authorization paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::time::Instant;

use authzcore_core::{micros_between, unix_timestamp, CapabilityId, SessionId};
use authzcore_crypto::{verify_signature, Ed25519KeyPair, Ed25519PublicKey};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AuthzError, AuthzResult, ConfigError, VerifyError};
use crate::scope;
use crate::session::SessionCache;
use crate::token::Capability;

pub const MAX_DELEGATION_DEPTH: usize = 5;

/// Exact denial reason string tags carried into the audit plane.
pub mod denial {
    pub const NO_CAPABILITY: &str = "NO_CAPABILITY";
    pub const EXPIRED: &str = "EXPIRED";
    pub const REVOKED: &str = "REVOKED";
    pub const SCOPE_MISMATCH: &str = "SCOPE_MISMATCH";
    pub const SIGNATURE_INVALID: &str = "SIGNATURE_INVALID";
    pub const CHAIN_DEPTH_EXCEEDED: &str = "CHAIN_DEPTH_EXCEEDED";
    pub const CHAIN_INVALID: &str = "CHAIN_INVALID";
    pub const SESSION_UNKNOWN: &str = "SESSION_UNKNOWN";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const TOOL_NOT_ALLOWED: &str = "TOOL_NOT_ALLOWED";
    pub const UNKNOWN_TENANT: &str = "UNKNOWN_TENANT";
}

/// The outcome of an authorization decision. Never an `Err`: a denial is a
/// value, not a failure, so it always reaches the audit emitter.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub allowed: bool,
    pub capability_id: Option<CapabilityId>,
    pub denial_reason: Option<&'static str>,
    pub latency_us: u64,
}

impl AuthResult {
    fn allow(capability_id: CapabilityId) -> Self {
        Self {
            allowed: true,
            capability_id: Some(capability_id),
            denial_reason: None,
            latency_us: 0,
        }
    }

    fn deny(reason: &'static str) -> Self {
        Self {
            allowed: false,
            capability_id: None,
            denial_reason: Some(reason),
            latency_us: 0,
        }
    }

    fn with_latency(mut self, latency_us: u64) -> Self {
        self.latency_us = latency_us;
        self
    }
}

fn verify_error_reason(err: &VerifyError) -> &'static str {
    match err {
        VerifyError::SignatureInvalid => denial::SIGNATURE_INVALID,
        VerifyError::Expired => denial::EXPIRED,
        VerifyError::Revoked => denial::REVOKED,
        VerifyError::ChainDepthExceeded { .. } => denial::CHAIN_DEPTH_EXCEEDED,
        VerifyError::ChainInvalid { .. } => denial::CHAIN_INVALID,
    }
}

/// Issues and verifies every capability in one trust domain. A manager is
/// the sole signer for the capabilities it issues and delegates; it does
/// not resolve third-party issuer keys (see DESIGN.md — there is no DID
/// resolver in this core).
pub struct CapabilityManager {
    issuer_id: String,
    signing_key: Ed25519KeyPair,
    capabilities: RwLock<HashMap<CapabilityId, Capability>>,
    revoked: RwLock<HashSet<CapabilityId>>,
    session_cache: SessionCache,
}

impl CapabilityManager {
    pub fn new(issuer_id: impl Into<String>) -> Self {
        Self::with_session_cache_size(issuer_id, crate::session::DEFAULT_SESSION_CACHE_SIZE)
    }

    pub fn with_session_cache_size(issuer_id: impl Into<String>, session_cache_size: usize) -> Self {
        Self::with_signing_key(issuer_id, Ed25519KeyPair::generate(), session_cache_size)
    }

    /// Rebuild a manager around a known signing key instead of generating a
    /// fresh one. Lets a long-lived issuer (or a CLI invocation re-supplying
    /// `--issuer-seed`) recover the same `issuer` identity across process
    /// restarts; the capability store and revocation set still start empty,
    /// since the core holds no on-disk state (§6).
    pub fn with_signing_key(
        issuer_id: impl Into<String>,
        signing_key: Ed25519KeyPair,
        session_cache_size: usize,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            signing_key,
            capabilities: RwLock::new(HashMap::new()),
            revoked: RwLock::new(HashSet::new()),
            session_cache: SessionCache::new(session_cache_size),
        }
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.signing_key.public_key()
    }

    /// The raw signing secret, for a caller that needs to persist and later
    /// reconstruct this exact manager identity via [`Self::with_signing_key`].
    pub fn signing_key_secret(&self) -> [u8; 32] {
        self.signing_key.to_secret_bytes()
    }

    /// Construct, sign, and register a fresh root capability.
    pub fn grant(
        &self,
        subject: impl Into<String>,
        scope: impl Into<String>,
        constraints: BTreeMap<String, serde_json::Value>,
        expires_in: i64,
        delegatable: bool,
    ) -> AuthzResult<Capability> {
        let scope = scope.into();
        scope::validate(&scope).map_err(|e| ConfigError::InvalidScope(e.to_string()))?;
        if expires_in <= 0 {
            return Err(ConfigError::NonPositiveExpiry(expires_in).into());
        }

        let now = unix_timestamp();
        let mut cap = Capability {
            id: CapabilityId::new(),
            issuer: self.issuer_id.clone(),
            subject: subject.into(),
            scope,
            constraints,
            issued_at: now,
            expires_at: now + expires_in as u64,
            delegatable,
            delegation_chain: Vec::new(),
            signature: authzcore_crypto::Ed25519Signature([0u8; 64]),
        };
        let bytes = cap.canonical_bytes()?;
        cap.signature = self.signing_key.sign(&bytes);

        debug!(capability_id = %cap.id, scope = %cap.scope, "granted capability");
        self.capabilities.write().expect("capability store poisoned").insert(cap.id, cap.clone());
        Ok(cap)
    }

    fn verify_signature_only(&self, cap: &Capability) -> Result<(), VerifyError> {
        let bytes = cap
            .canonical_bytes()
            .map_err(|e| VerifyError::ChainInvalid { reason: e.to_string() })?;
        let ok = verify_signature(&bytes, &cap.signature, &self.public_key()).unwrap_or(false);
        if ok {
            Ok(())
        } else {
            Err(VerifyError::SignatureInvalid)
        }
    }

    fn is_revoked_id(&self, id: &CapabilityId) -> bool {
        self.revoked.read().expect("revocation set poisoned").contains(id)
    }

    /// A capability is revoked if it or any ancestor in its delegation
    /// chain is revoked.
    fn is_capability_revoked(&self, cap: &Capability) -> bool {
        if self.is_revoked_id(&cap.id) {
            return true;
        }
        cap.delegation_chain.iter().any(|id| self.is_revoked_id(id))
    }

    /// Checks signature, expiry, revocation, and (for non-root capabilities)
    /// recursively verifies every link in the delegation chain.
    pub fn verify(&self, cap: &Capability) -> Result<(), VerifyError> {
        self.verify_signature_only(cap)?;

        let now = unix_timestamp();
        if !cap.is_valid_time(now) {
            return Err(VerifyError::Expired);
        }
        if self.is_capability_revoked(cap) {
            return Err(VerifyError::Revoked);
        }
        if cap.delegation_chain.len() > MAX_DELEGATION_DEPTH {
            return Err(VerifyError::ChainDepthExceeded {
                depth: cap.delegation_chain.len(),
                max: MAX_DELEGATION_DEPTH,
            });
        }

        // Walk the chain from the immediate parent outward, confirming each
        // ancestor verifies, is delegatable, and its scope covers the
        // narrower scope below it. Does not check `subject == next.issuer`
        // (§4.4 step d): every link in one manager's chains shares the same
        // constant `issuer`, matching the Python original, so that check
        // would reject every delegation rather than catch a forged link.
        let mut effective_scope = cap.scope.clone();
        for ancestor_id in cap.delegation_chain.iter().rev() {
            let ancestor = self
                .capabilities
                .read()
                .expect("capability store poisoned")
                .get(ancestor_id)
                .cloned()
                .ok_or_else(|| VerifyError::ChainInvalid {
                    reason: format!("missing ancestor {ancestor_id}"),
                })?;

            self.verify_signature_only(&ancestor)?;
            if !ancestor.is_valid_time(now) {
                return Err(VerifyError::ChainInvalid {
                    reason: format!("ancestor {ancestor_id} expired"),
                });
            }
            if self.is_revoked_id(&ancestor.id) {
                return Err(VerifyError::Revoked);
            }
            if !ancestor.delegatable {
                return Err(VerifyError::ChainInvalid {
                    reason: format!("ancestor {ancestor_id} is not delegatable"),
                });
            }
            scope::narrow(&ancestor.scope, &effective_scope).map_err(|_| VerifyError::ChainInvalid {
                reason: format!("ancestor {ancestor_id} does not cover child scope"),
            })?;
            effective_scope = ancestor.scope.clone();
        }

        Ok(())
    }

    /// Full authorization path: verify the presented capability, then match
    /// its scope against the requested `(tool, method)`.
    pub fn authorize(&self, cap: &Capability, tool: &str, method: &str) -> AuthResult {
        let start = Instant::now();
        let result = match self.verify(cap) {
            Err(e) => {
                let reason = verify_error_reason(&e);
                warn!(capability_id = %cap.id, reason, "authorization denied");
                AuthResult::deny(reason)
            }
            Ok(()) => match scope::matches(&cap.scope, tool, method) {
                Ok(true) => AuthResult::allow(cap.id),
                _ => {
                    warn!(capability_id = %cap.id, tool, method, "scope mismatch");
                    AuthResult::deny(denial::SCOPE_MISMATCH)
                }
            },
        };
        result.with_latency(micros_between(start, Instant::now()))
    }

    /// Construct a child capability narrowing `parent`'s scope, signed by
    /// this manager.
    pub fn delegate(
        &self,
        parent: &Capability,
        new_subject: impl Into<String>,
        narrowed_scope: impl Into<String>,
        expires_in: Option<i64>,
        delegatable: Option<bool>,
    ) -> AuthzResult<Capability> {
        self.verify(parent).map_err(AuthzError::Verify)?;
        if !parent.delegatable {
            // `verify` only checks `delegatable` on ancestors reached via a
            // chain walk, which is empty for a root parent — without this,
            // delegating a non-delegatable root mints a child that is
            // permanently denied (via CHAIN_INVALID) the moment it is
            // authorized, a stored but dead token rather than a rejection.
            return Err(AuthzError::Verify(VerifyError::ChainInvalid {
                reason: format!("parent {} is not delegatable", parent.id),
            }));
        }

        let narrowed_scope = narrowed_scope.into();
        let narrowed = scope::narrow(&parent.scope, &narrowed_scope)?;

        let mut chain = parent.delegation_chain.clone();
        chain.push(parent.id);
        if chain.len() > MAX_DELEGATION_DEPTH {
            return Err(AuthzError::Verify(VerifyError::ChainDepthExceeded {
                depth: chain.len(),
                max: MAX_DELEGATION_DEPTH,
            }));
        }

        let now = unix_timestamp();
        let requested_expiry = expires_in.map(|e| now + e.max(0) as u64).unwrap_or(parent.expires_at);
        let expires_at = requested_expiry.min(parent.expires_at);
        let delegatable_final = parent.delegatable && delegatable.unwrap_or(true);

        let mut child = Capability {
            id: CapabilityId::new(),
            issuer: self.issuer_id.clone(),
            subject: new_subject.into(),
            scope: narrowed,
            constraints: parent.constraints.clone(),
            issued_at: now,
            expires_at,
            delegatable: delegatable_final,
            delegation_chain: chain,
            signature: authzcore_crypto::Ed25519Signature([0u8; 64]),
        };
        let bytes = child.canonical_bytes()?;
        child.signature = self.signing_key.sign(&bytes);

        debug!(parent_id = %parent.id, child_id = %child.id, scope = %child.scope, "delegated capability");
        self.capabilities
            .write()
            .expect("capability store poisoned")
            .insert(child.id, child.clone());
        Ok(child)
    }

    /// Idempotently revoke a capability. Revocation is transitive: any
    /// capability carrying this id in its own `delegation_chain` becomes
    /// invalid too, without needing to walk or mutate descendants.
    pub fn revoke(&self, capability_id: CapabilityId) {
        self.revoked.write().expect("revocation set poisoned").insert(capability_id);
        warn!(capability_id = %capability_id, "capability revoked");
    }

    /// Record a successful full authorization as a fast-path session.
    pub fn cache_session(&self, session_id: SessionId, cap: &Capability) {
        self.session_cache.insert(session_id, cap.id, cap.expires_at);
    }

    /// Fast path: O(1) session lookup, expiry check, revocation check, scope
    /// match. Falls back to denial (never to the full path) on a cache miss.
    pub fn authorize_fast(&self, session_id: &SessionId, tool: &str, method: &str) -> AuthResult {
        let start = Instant::now();

        let result = match self.session_cache.get(session_id) {
            None => AuthResult::deny(denial::SESSION_UNKNOWN),
            Some(entry) => {
                let now = unix_timestamp();
                if now > entry.expires_at {
                    AuthResult::deny(denial::EXPIRED)
                } else {
                    let cap = self
                        .capabilities
                        .read()
                        .expect("capability store poisoned")
                        .get(&entry.capability_id)
                        .cloned();
                    match cap {
                        None => AuthResult::deny(denial::NO_CAPABILITY),
                        Some(cap) if self.is_capability_revoked(&cap) => AuthResult::deny(denial::REVOKED),
                        Some(cap) => match scope::matches(&cap.scope, tool, method) {
                            Ok(true) => AuthResult::allow(cap.id),
                            _ => AuthResult::deny(denial::SCOPE_MISMATCH),
                        },
                    }
                }
            }
        };

        result.with_latency(micros_between(start, Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_grant_and_authorize() {
        let mgr = CapabilityManager::new("did:example:issuer");
        let cap = mgr
            .grant("did:example:subject", "tool:fs/method:read", BTreeMap::new(), 3600, true)
            .unwrap();

        let allowed = mgr.authorize(&cap, "fs", "read");
        assert!(allowed.allowed);
        assert_eq!(allowed.capability_id, Some(cap.id));

        let denied = mgr.authorize(&cap, "fs", "write");
        assert!(!denied.allowed);
        assert_eq!(denied.denial_reason, Some(denial::SCOPE_MISMATCH));
    }

    #[test]
    fn grant_rejects_malformed_scope_and_bad_expiry() {
        let mgr = CapabilityManager::new("issuer");
        assert!(mgr.grant("s", "not-a-scope", BTreeMap::new(), 10, true).is_err());
        assert!(mgr.grant("s", "tool:fs/method:read", BTreeMap::new(), 0, true).is_err());
    }

    #[test]
    fn session_fast_path_after_caching() {
        let mgr = CapabilityManager::new("issuer");
        let cap = mgr
            .grant("subject", "tool:fs/method:read", BTreeMap::new(), 3600, true)
            .unwrap();
        let session_id = SessionId::new();
        mgr.cache_session(session_id, &cap);

        for _ in 0..100 {
            let result = mgr.authorize_fast(&session_id, "fs", "read");
            assert!(result.allowed);
        }
    }

    #[test]
    fn unknown_session_denies() {
        let mgr = CapabilityManager::new("issuer");
        let result = mgr.authorize_fast(&SessionId::new(), "fs", "read");
        assert!(!result.allowed);
        assert_eq!(result.denial_reason, Some(denial::SESSION_UNKNOWN));
    }

    #[test]
    fn delegation_narrows_and_rejects_widening() {
        let mgr = CapabilityManager::new("issuer");
        let cap = mgr
            .grant("subject", "tool:fs/method:read", BTreeMap::new(), 3600, true)
            .unwrap();

        let delegated = mgr.delegate(&cap, "subagent", "tool:fs/method:read", None, None).unwrap();
        assert_eq!(delegated.delegation_chain, vec![cap.id]);

        let widened = mgr.delegate(&cap, "subagent", "tool:net/method:*", None, None);
        assert!(widened.is_err());
    }

    #[test]
    fn chain_depth_six_is_rejected() {
        let mgr = CapabilityManager::new("issuer");
        let mut current = mgr
            .grant("s0", "tool:*/method:*", BTreeMap::new(), 3600, true)
            .unwrap();
        for i in 1..=MAX_DELEGATION_DEPTH {
            current = mgr
                .delegate(&current, format!("s{i}"), "tool:*/method:*", None, None)
                .unwrap();
        }
        let overflow = mgr.delegate(&current, "s-overflow", "tool:*/method:*", None, None);
        assert!(overflow.is_err());
    }

    #[test]
    fn revocation_reaches_fast_path() {
        let mgr = CapabilityManager::new("issuer");
        let cap = mgr
            .grant("subject", "tool:fs/method:read", BTreeMap::new(), 3600, true)
            .unwrap();
        let session_id = SessionId::new();
        mgr.cache_session(session_id, &cap);
        assert!(mgr.authorize_fast(&session_id, "fs", "read").allowed);

        mgr.revoke(cap.id);

        let result = mgr.authorize_fast(&session_id, "fs", "read");
        assert!(!result.allowed);
        assert_eq!(result.denial_reason, Some(denial::REVOKED));
    }

    #[test]
    fn revoking_a_parent_revokes_delegated_children() {
        let mgr = CapabilityManager::new("issuer");
        let parent = mgr
            .grant("subject", "tool:fs/method:read", BTreeMap::new(), 3600, true)
            .unwrap();
        let child = mgr.delegate(&parent, "subagent", "tool:fs/method:read", None, None).unwrap();

        mgr.revoke(parent.id);

        let result = mgr.authorize(&child, "fs", "read");
        assert!(!result.allowed);
        assert_eq!(result.denial_reason, Some(denial::REVOKED));
    }

    #[test]
    fn with_signing_key_reproduces_the_same_public_key() {
        let original = CapabilityManager::new("issuer");
        let secret = original.signing_key_secret();
        let rebuilt = CapabilityManager::with_signing_key(
            "issuer",
            authzcore_crypto::Ed25519KeyPair::from_secret_bytes(&secret),
            crate::session::DEFAULT_SESSION_CACHE_SIZE,
        );
        assert_eq!(original.public_key(), rebuilt.public_key());
    }

    #[test]
    fn non_delegatable_parent_rejects_delegation_up_front() {
        let mgr = CapabilityManager::new("issuer");
        let parent = mgr
            .grant("subject", "tool:fs/method:*", BTreeMap::new(), 3600, false)
            .unwrap();
        let result = mgr.delegate(&parent, "subagent", "tool:fs/method:read", None, None);
        assert!(result.is_err());
    }

    #[test]
    fn delegated_child_marked_non_delegatable_blocks_grandchild() {
        let mgr = CapabilityManager::new("issuer");
        let parent = mgr
            .grant("subject", "tool:fs/method:*", BTreeMap::new(), 3600, true)
            .unwrap();
        let child = mgr
            .delegate(&parent, "subagent", "tool:fs/method:read", None, Some(false))
            .unwrap();
        assert!(!child.delegatable);

        let grandchild = mgr.delegate(&child, "sub-subagent", "tool:fs/method:read", None, None);
        assert!(grandchild.is_err());
    }

    #[test]
    fn delegated_child_actually_authorizes() {
        let mgr = CapabilityManager::new("issuer");
        let parent = mgr
            .grant("subject", "tool:fs/method:*", BTreeMap::new(), 3600, true)
            .unwrap();
        let child = mgr
            .delegate(&parent, "subagent", "tool:fs/method:read", None, None)
            .unwrap();

        let result = mgr.authorize(&child, "fs", "read");
        assert!(result.allowed);
        assert_eq!(result.capability_id, Some(child.id));
    }
}
