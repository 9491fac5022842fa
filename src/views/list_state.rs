use crate::{
    error::ErrorDisplay,
    models::{follow::FollowEntry, message::Message, notification::Notification, post::Post},
    utils::view_scope::ViewScope,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// 可以按 id 定位、用服务端数据刷新的列表项
pub trait Entity: Clone + Send + Sync + 'static {
    fn entity_id(&self) -> i64;

    /// 用服务端的新数据覆盖，保留仅界面使用的字段
    fn absorb(&mut self, fresh: Self) {
        *self = fresh;
    }
}

impl Entity for Post {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn absorb(&mut self, fresh: Self) {
        let is_expanded = self.is_expanded;
        let comments = std::mem::take(&mut self.comments);
        *self = fresh;
        self.is_expanded = is_expanded;
        // 列表接口不一定带评论，已加载的评论保留
        if self.comments.is_empty() {
            self.comments = comments;
        }
    }
}

impl Entity for FollowEntry {
    fn entity_id(&self) -> i64 {
        self.user.id
    }
}

impl Entity for Notification {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Entity for Message {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug)]
struct ListData<E> {
    items: Arc<Vec<E>>,
    error: Option<ErrorDisplay>,
    loading: bool,
}

/// 一个视图持有的列表状态
///
/// 读取拿到的是不可变快照；每次修改都会生成新的集合，
/// 之前拿到快照的组件不会看到改动。
#[derive(Debug, Clone)]
pub struct ListState<E> {
    inner: Arc<RwLock<ListData<E>>>,
    scope: ViewScope,
}

impl<E: Entity> Default for ListState<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ListState<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ListData {
                items: Arc::new(Vec::new()),
                error: None,
                loading: false,
            })),
            scope: ViewScope::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn items(&self) -> Arc<Vec<E>> {
        self.inner.read().items.clone()
    }

    pub fn get(&self, id: i64) -> Option<E> {
        self.inner
            .read()
            .items
            .iter()
            .find(|item| item.entity_id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 整体替换；已存在的项通过 absorb 保留界面字段
    pub fn replace(&self, fresh: Vec<E>) {
        let mut data = self.inner.write();
        let items: Vec<E> = fresh
            .into_iter()
            .map(|item| {
                match data.items.iter().find(|old| old.entity_id() == item.entity_id()) {
                    Some(old) => {
                        let mut merged = old.clone();
                        merged.absorb(item);
                        merged
                    }
                    None => item,
                }
            })
            .collect();
        data.items = Arc::new(items);
    }

    /// 追加一页，已存在的 id 不重复加入
    pub fn extend(&self, page: Vec<E>) {
        let mut data = self.inner.write();
        let mut items = data.items.as_ref().clone();
        for item in page {
            if !items.iter().any(|old| old.entity_id() == item.entity_id()) {
                items.push(item);
            }
        }
        data.items = Arc::new(items);
    }

    /// 只刷新列表中已有的项
    pub fn merge(&self, fresh: Vec<E>) {
        let mut data = self.inner.write();
        let mut items = data.items.as_ref().clone();
        for item in fresh {
            if let Some(old) = items.iter_mut().find(|old| old.entity_id() == item.entity_id()) {
                old.absorb(item);
            }
        }
        data.items = Arc::new(items);
    }

    /// 修改单个项，返回是否找到
    pub fn update<F>(&self, id: i64, f: F) -> bool
    where
        F: FnOnce(&mut E),
    {
        let mut data = self.inner.write();
        let Some(index) = data.items.iter().position(|item| item.entity_id() == id) else {
            return false;
        };

        let mut items = data.items.as_ref().clone();
        f(&mut items[index]);
        data.items = Arc::new(items);
        true
    }

    pub fn remove(&self, id: i64) -> Option<E> {
        let mut data = self.inner.write();
        let index = data.items.iter().position(|item| item.entity_id() == id)?;
        let mut items = data.items.as_ref().clone();
        let removed = items.remove(index);
        data.items = Arc::new(items);
        Some(removed)
    }

    pub fn clear(&self) {
        self.inner.write().items = Arc::new(Vec::new());
    }

    pub fn error(&self) -> Option<ErrorDisplay> {
        self.inner.read().error.clone()
    }

    pub fn set_error(&self, error: Option<ErrorDisplay>) {
        self.inner.write().error = error;
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.write().loading = loading;
    }

    /// 离开视图：丢弃之后到达的响应
    pub fn leave(&self) {
        self.scope.leave();
        self.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::follow::UserSummary;

    fn entry(id: i64, name: &str) -> FollowEntry {
        FollowEntry::new(
            UserSummary {
                id,
                username: name.to_string(),
                profile_pic: None,
            },
            true,
        )
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let state = ListState::new();
        state.replace(vec![entry(1, "ana"), entry(2, "bo")]);

        let before = state.items();
        state.update(1, |e| e.set_following(false));

        assert!(before[0].following);
        assert!(!state.items()[0].following);
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let state = ListState::new();
        state.extend(vec![entry(1, "ana"), entry(2, "bo")]);
        state.extend(vec![entry(2, "bo"), entry(3, "cy")]);
        let ids: Vec<i64> = state.items().iter().map(|e| e.user.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_only_touches_known_items() {
        let state = ListState::new();
        state.replace(vec![entry(1, "ana")]);
        state.merge(vec![entry(1, "ana-renamed"), entry(9, "ghost")]);
        assert_eq!(state.len(), 1);
        assert_eq!(state.items()[0].user.username, "ana-renamed");
    }

    #[test]
    fn test_update_and_remove_missing_id() {
        let state: ListState<FollowEntry> = ListState::new();
        assert!(!state.update(42, |_| {}));
        assert!(state.remove(42).is_none());
    }
}
