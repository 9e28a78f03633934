//! InMemoryAuth - 開発用・テスト用の認証コンテキスト
//!
//! # 実装詳細
//! - 資格情報スロット（サインイン / サインアウト）
//! - 権限ディレクトリ（identifier → capability 集合）を「バックエンドの正本」とみなす
//! - `revalidate()` はディレクトリから権限スナップショットを再計算する
//! - 呼び出し回数を数える（テストでの観測用）
//! - 資格情報と権限キャッシュは 1 つのロックで保護する
//!   （revalidate 中に sign_out されても古い権限が残らない）

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ActorCredential, CapabilityKey, PermissionSnapshot};
use crate::ports::AuthCollaborator;

/// サインイン中の資格情報と、その資格情報に対して計算された権限
#[derive(Default)]
struct Session {
    actor: Option<ActorCredential>,
    snapshot: PermissionSnapshot,
}

#[derive(Default)]
pub struct InMemoryAuth {
    session: RwLock<Session>,
    directory: RwLock<HashMap<String, BTreeSet<CapabilityKey>>>,
    revalidations: AtomicUsize,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// サインイン済みの状態で作成
    pub fn signed_in(actor: ActorCredential) -> Self {
        let auth = Self::new();
        auth.sign_in(actor);
        auth
    }

    pub fn sign_in(&self, actor: ActorCredential) {
        self.session.write().unwrap_or_else(PoisonError::into_inner).actor = Some(actor);
    }

    /// 資格情報とキャッシュ済み権限を破棄
    pub fn sign_out(&self) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.actor = None;
        session.snapshot = PermissionSnapshot::empty();
    }

    /// バックエンド側の権限を更新（キャッシュには次の revalidate まで反映されない）
    pub fn grant(&self, identifier: impl Into<String>, keys: impl IntoIterator<Item = CapabilityKey>) {
        self.directory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.into(), keys.into_iter().collect());
    }

    pub fn revoke_all(&self, identifier: &str) {
        self.directory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identifier);
    }

    pub fn revalidation_count(&self) -> usize {
        self.revalidations.load(Ordering::SeqCst)
    }

    fn lookup(&self, identifier: &str) -> PermissionSnapshot {
        let directory = self.directory.read().unwrap_or_else(PoisonError::into_inner);
        directory
            .get(identifier)
            .map(|keys| PermissionSnapshot::new(keys.iter().cloned()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuthCollaborator for InMemoryAuth {
    fn current_actor(&self) -> Option<ActorCredential> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).actor.clone()
    }

    fn permissions(&self) -> PermissionSnapshot {
        self.session.read().unwrap_or_else(PoisonError::into_inner).snapshot.clone()
    }

    async fn revalidate(&self) {
        self.revalidations.fetch_add(1, Ordering::SeqCst);

        // actor の読み取りと snapshot の書き込みは同じロック区間で行う
        // ロック順序: session → directory
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        let fresh = match &session.actor {
            Some(actor) if actor.is_complete() => self.lookup(&actor.identifier),
            _ => PermissionSnapshot::empty(),
        };
        debug!(granted = fresh.granted.len(), "permission snapshot recomputed");
        session.snapshot = fresh;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn ana() -> ActorCredential {
        ActorCredential::new("ana@mvsat", "s3cret")
    }

    #[tokio::test]
    async fn revalidate_picks_up_backend_changes() {
        let auth = InMemoryAuth::signed_in(ana());
        auth.grant("ana@mvsat", [CapabilityKey::from(CapabilityKey::CLIENTS)]);

        // キャッシュは revalidate まで空のまま
        assert!(auth.permissions().is_empty());

        auth.revalidate().await;
        assert!(auth.permissions().allows(CapabilityKey::CLIENTS));

        auth.grant("ana@mvsat", [CapabilityKey::from(CapabilityKey::BILLING)]);
        auth.revalidate().await;
        let snap = auth.permissions();
        assert!(snap.allows(CapabilityKey::BILLING));
        assert!(!snap.allows(CapabilityKey::CLIENTS));
        assert_eq!(auth.revalidation_count(), 2);
    }

    #[tokio::test]
    async fn unknown_actor_gets_empty_snapshot() {
        let auth = InMemoryAuth::signed_in(ActorCredential::new("ghost", "x"));
        auth.revalidate().await;
        assert!(auth.permissions().is_empty());
    }

    #[tokio::test]
    async fn sign_out_clears_actor_and_cache() {
        let auth = InMemoryAuth::signed_in(ana());
        auth.grant("ana@mvsat", CapabilityKey::all());
        auth.revalidate().await;
        assert!(auth.has_credentials());

        auth.sign_out();
        assert!(!auth.has_credentials());
        assert!(auth.permissions().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sign_out_racing_revalidate_never_leaves_permissions_behind() {
        for _ in 0..2_000 {
            let auth = Arc::new(InMemoryAuth::signed_in(ana()));
            auth.grant("ana@mvsat", CapabilityKey::all());

            let revalidating = tokio::spawn({
                let auth = auth.clone();
                async move { auth.revalidate().await }
            });
            let signing_out = tokio::spawn({
                let auth = auth.clone();
                async move { auth.sign_out() }
            });
            revalidating.await.unwrap();
            signing_out.await.unwrap();

            assert!(auth.current_actor().is_none());
            assert!(auth.permissions().is_empty());
        }
    }
}
