//! AuthCollaborator port - 認証コンテキストの抽象化
//!
//! 資格情報と権限キャッシュの正本はこの trait の実装側にある。
//! Revalidator は `revalidate()` を起動するだけで、結果は見ない。

use async_trait::async_trait;

use crate::domain::{ActorCredential, PermissionSnapshot};

/// AuthCollaborator は現在のアクターと権限スナップショットを管理
///
/// # 設計原則
/// - `revalidate()` は fire-and-forget（失敗は実装側で処理する）
/// - 権限キャッシュの直列化も実装側の責務
/// - `Send + Sync` を要求（spawn したタスクから呼ぶため）
#[async_trait]
pub trait AuthCollaborator: Send + Sync {
    /// サインイン中のアクター（いなければ None）
    fn current_actor(&self) -> Option<ActorCredential>;

    /// 最後に計算された権限スナップショット
    fn permissions(&self) -> PermissionSnapshot;

    /// バックエンドに問い合わせて権限を再計算する（キャッシュは破棄）
    async fn revalidate(&self);

    /// アクターが揃った資格情報を持っているか
    fn has_credentials(&self) -> bool {
        self.current_actor()
            .is_some_and(|actor| actor.is_complete())
    }
}
