//! InMemory ClientRegistry 実装
//!
//! ドメイン層が定義する ClientRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! The map is private to this type; nothing outside can lock it. Each trait
//! operation takes the lock once, does pure map work and releases it.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientRegistry, RegistryError, SessionHandle, Username};

/// インメモリ ClientRegistry 実装
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    /// Key: username, Value: handle to that session's outbound queue
    clients: Mutex<HashMap<Username, SessionHandle>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn try_insert(
        &self,
        username: Username,
        handle: SessionHandle,
    ) -> Result<Vec<Username>, RegistryError> {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&username) {
            return Err(RegistryError::UsernameTaken(username.into_string()));
        }
        clients.insert(username, handle);

        let mut roster: Vec<Username> = clients.keys().cloned().collect();
        roster.sort();
        Ok(roster)
    }

    async fn remove(&self, username: &Username) -> bool {
        let mut clients = self.clients.lock().await;
        clients.remove(username).is_some()
    }

    async fn snapshot_all(&self) -> Vec<(Username, SessionHandle)> {
        let mut snapshot: Vec<(Username, SessionHandle)> = {
            let clients = self.clients.lock().await;
            clients
                .iter()
                .map(|(username, handle)| (username.clone(), handle.clone()))
                .collect()
        };
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }

    async fn contains_any(&self) -> bool {
        !self.clients.lock().await.is_empty()
    }

    async fn count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::domain::SessionId;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - try_insert の原子性（同名の同時登録は 1 つだけ成功する）
    // - remove の冪等性
    // - snapshot_all がロック外で使えるコピーを返すこと
    // ========================================

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn handle() -> SessionHandle {
        // receiver is dropped; these tests never push
        SessionHandle::channel(SessionId::generate(), 4, CancellationToken::new()).0
    }

    #[tokio::test]
    async fn test_try_insert_returns_sorted_roster() {
        // テスト項目: 登録成功時にソート済みの参加者一覧が返される
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        registry.try_insert(username("charlie"), handle()).await.unwrap();
        registry.try_insert(username("alice"), handle()).await.unwrap();

        // when (操作):
        let roster = registry.try_insert(username("bob"), handle()).await.unwrap();

        // then (期待する結果):
        let names: Vec<&str> = roster.iter().map(Username::as_str).collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
        assert_eq!(registry.count().await, 3);
    }

    #[tokio::test]
    async fn test_try_insert_duplicate_is_rejected() {
        // テスト項目: 既に登録済みのユーザー名は UsernameTaken になる
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        let first = handle();
        let first_id = first.id();
        registry.try_insert(username("alice"), first).await.unwrap();

        // when (操作):
        let result = registry.try_insert(username("alice"), handle()).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::UsernameTaken("alice".to_string())));
        let snapshot = registry.snapshot_all().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].1.id(), first_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_try_insert_same_name_exactly_one_wins() {
        // テスト項目: 同名の同時登録は常にちょうど 1 つだけ成功する
        // given (前提条件):
        let registry = Arc::new(InMemoryClientRegistry::new());

        // when (操作):
        let attempts: Vec<_> = (0..32)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.try_insert(username("alice"), handle()).await })
            })
            .collect();
        let mut successes = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(successes, 1);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        // テスト項目: 存在しないユーザーの削除もエラーにならない（冪等性）
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        registry.try_insert(username("alice"), handle()).await.unwrap();

        // when (操作):
        let first = registry.remove(&username("alice")).await;
        let second = registry.remove(&username("alice")).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(!registry.contains_any().await);
    }

    #[tokio::test]
    async fn test_name_is_reusable_after_remove() {
        // テスト項目: 削除後は同じ名前で再登録できる
        let registry = InMemoryClientRegistry::new();
        registry.try_insert(username("alice"), handle()).await.unwrap();
        registry.remove(&username("alice")).await;
        assert!(registry.try_insert(username("alice"), handle()).await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time_copy() {
        // テスト項目: スナップショット取得後の変更はスナップショットに影響しない
        // given (前提条件):
        let registry = InMemoryClientRegistry::new();
        registry.try_insert(username("bob"), handle()).await.unwrap();
        registry.try_insert(username("alice"), handle()).await.unwrap();

        // when (操作):
        let snapshot = registry.snapshot_all().await;
        registry.remove(&username("alice")).await;

        // then (期待する結果):
        let names: Vec<&str> = snapshot.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_contains_any_on_empty_registry() {
        let registry = InMemoryClientRegistry::new();
        assert!(!registry.contains_any().await);
        assert_eq!(registry.count().await, 0);
    }
}
