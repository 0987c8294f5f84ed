//! 会话注册表
//!
//! 参与者标识到可发送会话的唯一映射，是"当前谁可达"的唯一事实来源。
//! 锁只在更新映射时持有，关闭旧会话、发送消息都在锁外进行。

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use domain::ParticipantId;

use crate::session::SessionHandle;

pub type SharedSession = Arc<dyn SessionHandle>;

struct Registration {
    handle: SharedSession,
    /// 注册顺序，快照按此排序
    order: u64,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<ParticipantId, Registration>,
    next_order: u64,
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册会话，替换并关闭同一标识下已有的会话。
    ///
    /// 重复注册同一个会话不做任何事；被替换的注册移动到顺序末尾。
    pub async fn register(&self, id: ParticipantId, handle: SharedSession) {
        let replaced = {
            let mut inner = self.write();
            if let Some(existing) = inner.sessions.get(&id) {
                if Arc::ptr_eq(&existing.handle, &handle) {
                    return;
                }
            }
            let order = inner.next_order;
            inner.next_order += 1;
            inner
                .sessions
                .insert(id.clone(), Registration { handle, order })
                .map(|registration| registration.handle)
        };

        match replaced {
            Some(previous) => {
                tracing::info!(participant_id = %id, "会话已替换，关闭旧会话");
                previous.close().await;
            }
            None => tracing::info!(participant_id = %id, "会话已注册"),
        }
    }

    /// 注销会话并返回被移除的会话；不存在时什么也不做，也不会关闭会话。
    pub fn unregister(&self, id: &ParticipantId) -> Option<SharedSession> {
        let removed = self
            .write()
            .sessions
            .remove(id)
            .map(|registration| registration.handle);
        if removed.is_some() {
            tracing::info!(participant_id = %id, "会话已注销");
        }
        removed
    }

    /// 仅当注册的仍是给定会话时才注销，避免旧连接的失败把新注册挤掉
    pub fn unregister_if_current(&self, id: &ParticipantId, handle: &SharedSession) -> bool {
        let mut inner = self.write();
        let is_current = inner
            .sessions
            .get(id)
            .is_some_and(|registration| Arc::ptr_eq(&registration.handle, handle));
        if is_current {
            inner.sessions.remove(id);
        }
        is_current
    }

    pub fn lookup(&self, id: &ParticipantId) -> Option<SharedSession> {
        self.read()
            .sessions
            .get(id)
            .map(|registration| registration.handle.clone())
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.read().sessions.contains_key(id)
    }

    /// 按注册顺序返回当前所有会话的快照
    pub fn all(&self) -> Vec<(ParticipantId, SharedSession)> {
        let inner = self.read();
        let mut snapshot: Vec<_> = inner
            .sessions
            .iter()
            .map(|(id, registration)| {
                (registration.order, id.clone(), registration.handle.clone())
            })
            .collect();
        drop(inner);

        snapshot.sort_unstable_by_key(|(order, _, _)| *order);
        snapshot
            .into_iter()
            .map(|(_, id, handle)| (id, handle))
            .collect()
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        self.all().into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().sessions.is_empty()
    }

    /// 清空注册表并关闭所有会话（服务停止时调用）
    pub async fn shutdown(&self) {
        let drained: Vec<(ParticipantId, SharedSession)> = {
            let mut inner = self.write();
            inner
                .sessions
                .drain()
                .map(|(id, registration)| (id, registration.handle))
                .collect()
        };

        tracing::info!(sessions = drained.len(), "关闭所有会话");
        for (_, handle) in drained {
            handle.close().await;
        }
    }

    // 临界区内只有映射操作，不会出现中间状态，所以中毒的锁可以继续使用
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
