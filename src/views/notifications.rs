use crate::{
    models::notification::Notification,
    services::{
        api::report_error, notification::NotificationService, session::SharedSessionStore,
    },
    utils::pagination::Paginator,
    views::{list_state::ListState, ViewResult},
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// 通知列表（无限滚动）
#[derive(Clone)]
pub struct NotificationsView {
    service: NotificationService,
    session: SharedSessionStore,
    pager: Arc<Mutex<Paginator>>,
    state: ListState<Notification>,
}

impl NotificationsView {
    pub fn new(service: NotificationService, session: SharedSessionStore, per_page: usize) -> Self {
        Self {
            service,
            session,
            pager: Arc::new(Mutex::new(Paginator::new(per_page))),
            state: ListState::new(),
        }
    }

    pub fn state(&self) -> &ListState<Notification> {
        &self.state
    }

    pub fn has_more(&self) -> bool {
        self.pager.lock().has_more()
    }

    pub fn unread_count(&self) -> usize {
        self.state.items().iter().filter(|n| !n.read).count()
    }

    /// 加载下一页；返回的条数少于每页大小后不再加载，
    /// 上一页仍在加载时返回 false 且不发请求
    pub async fn load_more(&self) -> ViewResult<bool> {
        let Some(query) = self.pager.lock().begin() else {
            return Ok(false);
        };

        let ticket = self.state.scope().ticket();
        self.state.set_loading(true);
        let result = self.service.list(query.page).await;
        if !ticket.is_current() {
            debug!("Discarding notifications page {}: view left", query.page);
            self.pager.lock().abort();
            return Ok(false);
        }
        self.state.set_loading(false);

        match result {
            Ok(notifications) => {
                let received = notifications.len();
                self.state.extend(notifications);
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

    pub async fn mark_read(&self, id: i64) -> ViewResult<()> {
        self.set_read(id, true).await
    }

    pub async fn mark_unread(&self, id: i64) -> ViewResult<()> {
        self.set_read(id, false).await
    }

    async fn set_read(&self, id: i64, read: bool) -> ViewResult<()> {
        match self.service.set_read(id, read).await {
            Ok(()) => {
                self.state.update(id, |n| n.read = read);
                Ok(())
            }
            Err(e) => {
                let display = report_error(self.session.as_ref(), &e);
                self.state.set_error(Some(display.clone()));
                Err(display)
            }
        }
    }

    pub fn leave(&self) {
        self.state.leave();
    }
}
