use crate::{
    models::follow::{FollowEntry, UserId},
    services::{
        api::report_error,
        follow::FollowService,
        session::SharedSessionStore,
        toggle::{FollowToggle, ToggleOutcome, ToggleReconciler},
    },
    utils::pagination::Paginator,
    views::{list_state::ListState, ViewResult},
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowListKind {
    Followers,
    Following,
}

/// 粉丝 / 关注列表，支持“加载更多”和关注切换
#[derive(Clone)]
pub struct FollowListView {
    kind: FollowListKind,
    follows: FollowService,
    session: SharedSessionStore,
    reconciler: ToggleReconciler,
    toggle: FollowToggle,
    pager: Arc<Mutex<Paginator>>,
    state: ListState<FollowEntry>,
}

impl FollowListView {
    pub fn new(
        kind: FollowListKind,
        follows: FollowService,
        session: SharedSessionStore,
        reconciler: ToggleReconciler,
        per_page: usize,
    ) -> Self {
        Self {
            kind,
            toggle: FollowToggle::new(follows.clone(), per_page),
            follows,
            session,
            reconciler,
            pager: Arc::new(Mutex::new(Paginator::new(per_page))),
            state: ListState::new(),
        }
    }

    pub fn kind(&self) -> FollowListKind {
        self.kind
    }

    pub fn state(&self) -> &ListState<FollowEntry> {
        &self.state
    }

    pub fn has_more(&self) -> bool {
        self.pager.lock().has_more()
    }

    /// 加载下一页；没有更多或上一页仍在加载时返回 false 且不发请求
    pub async fn load_more(&self) -> ViewResult<bool> {
        let Some(query) = self.pager.lock().begin() else {
            return Ok(false);
        };

        let ticket = self.state.scope().ticket();
        self.state.set_loading(true);
        let result = match self.kind {
            FollowListKind::Followers => self.follows.followers(query).await,
            FollowListKind::Following => self.follows.following(query).await,
        };
        if !ticket.is_current() {
            debug!("Discarding {:?} page {}: view left", self.kind, query.page);
            self.pager.lock().abort();
            return Ok(false);
        }
        self.state.set_loading(false);

        match result {
            Ok(users) => {
                let received = users.len();
                let following = self.kind == FollowListKind::Following;
                self.state.extend(
                    users
                        .into_iter()
                        .map(|user| FollowEntry::new(user, following))
                        .collect(),
                );
                self.pager.lock().record_page(received);
                Ok(true)
            }
            Err(e) => {
                self.pager.lock().abort();
                let display = report_error(self.session.as_ref(), &e);
                self.state.set_error(Some(display.clone()));
                Err(display)
            }
        }
    }

    pub async fn toggle_follow(&self, user_id: UserId) -> ToggleOutcome {
        self.reconciler
            .toggle(&self.state, &self.toggle, user_id)
            .await
    }

    pub fn leave(&self) {
        self.state.leave();
    }
}
