use crate::{
    error::ClientError,
    models::message::{ConversationMessage, Message},
    services::{api::report_error, message::MessageService, session::SharedSessionStore},
    views::{list_state::ListState, ViewResult},
};
use parking_lot::RwLock;
use std::sync::Arc;

/// 收件箱与当前打开的会话
#[derive(Clone)]
pub struct InboxView {
    messages: MessageService,
    session: SharedSessionStore,
    state: ListState<Message>,
    selected: Arc<RwLock<Option<i64>>>,
    thread: Arc<RwLock<Arc<Vec<ConversationMessage>>>>,
}

impl InboxView {
    pub fn new(messages: MessageService, session: SharedSessionStore) -> Self {
        Self {
            messages,
            session,
            state: ListState::new(),
            selected: Arc::new(RwLock::new(None)),
            thread: Arc::new(RwLock::new(Arc::new(Vec::new()))),
        }
    }

    pub fn state(&self) -> &ListState<Message> {
        &self.state
    }

    pub fn selected(&self) -> Option<i64> {
        *self.selected.read()
    }

    pub fn thread(&self) -> Arc<Vec<ConversationMessage>> {
        self.thread.read().clone()
    }

    fn fail(&self, err: ClientError) -> crate::error::ErrorDisplay {
        let display = report_error(self.session.as_ref(), &err);
        self.state.set_error(Some(display.clone()));
        display
    }

    pub async fn load(&self) -> ViewResult<()> {
        let ticket = self.state.scope().ticket();
        let result = self.messages.inbox().await;
        if !ticket.is_current() {
            return Ok(());
        }

        match result {
            Ok(messages) => {
                self.state.replace(messages);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// 打开一条消息：本地标记已读并加载会话
    pub async fn open(&self, message_id: i64) -> ViewResult<()> {
        if !self.state.update(message_id, |m| m.read = true) {
            return Err(self.fail(ClientError::InvalidState(format!(
                "message {} is not in the inbox",
                message_id
            ))));
        }
        *self.selected.write() = Some(message_id);
        self.load_thread(message_id).await
    }

    async fn load_thread(&self, message_id: i64) -> ViewResult<()> {
        let ticket = self.state.scope().ticket();
        let result = self.messages.conversation(message_id).await;
        if !ticket.is_current() || self.selected() != Some(message_id) {
            return Ok(());
        }

        match result {
            Ok(thread) => {
                *self.thread.write() = Arc::new(thread);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// 标记为未读并回到收件箱
    pub fn mark_unread(&self, message_id: i64) {
        self.state.update(message_id, |m| m.read = false);
        self.close();
    }

    pub fn close(&self) {
        *self.selected.write() = None;
        *self.thread.write() = Arc::new(Vec::new());
    }

    /// 回复当前打开的消息，空白内容不会发出请求
    pub async fn reply(&self, content: &str) -> ViewResult<()> {
        let Some(message_id) = self.selected() else {
            return Err(self.fail(ClientError::validation("Select a message to reply to.")));
        };

        match self.messages.reply(message_id, content).await {
            Ok(()) => self.load_thread(message_id).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn leave(&self) {
        self.state.leave();
        self.close();
    }
}
