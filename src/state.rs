use crate::{
    config::Config,
    error::Result,
    services::{
        ApiClient, AuthService, CommentService, FileSessionStore, FollowService, MessageService,
        NotificationService, PostService, SharedSessionStore, ToggleReconciler, UserService,
    },
    views::{FeedView, FollowListKind, FollowListView, InboxView, NotificationsView},
};
use std::sync::Arc;

/// 客户端的共享状态
/// 包含配置、会话存储和所有服务
#[derive(Clone)]
pub struct AppState {
    /// 客户端配置
    pub config: Config,

    /// 会话存储
    pub session: SharedSessionStore,

    /// 带认证的请求封装
    pub api: ApiClient,

    /// 乐观切换协调器，所有视图共用
    pub reconciler: ToggleReconciler,

    pub auth_service: AuthService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub notification_service: NotificationService,
    pub message_service: MessageService,
    pub user_service: UserService,
}

impl AppState {
    /// 使用配置中的会话文件
    pub fn new(config: Config) -> Result<Self> {
        let session: SharedSessionStore = Arc::new(FileSessionStore::new(&config.session_file));
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: SharedSessionStore) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone())?;

        Ok(Self {
            auth_service: AuthService::new(api.clone(), &config),
            post_service: PostService::new(api.clone(), &config),
            comment_service: CommentService::new(api.clone()),
            follow_service: FollowService::new(api.clone()),
            notification_service: NotificationService::new(api.clone()),
            message_service: MessageService::new(api.clone()),
            user_service: UserService::new(api.clone()),
            reconciler: ToggleReconciler::new(session.clone()),
            config,
            session,
            api,
        })
    }

    pub fn feed_view(&self) -> FeedView {
        FeedView::new(
            self.post_service.clone(),
            self.comment_service.clone(),
            self.session.clone(),
            self.reconciler.clone(),
        )
    }

    pub fn follow_list_view(&self, kind: FollowListKind) -> FollowListView {
        FollowListView::new(
            kind,
            self.follow_service.clone(),
            self.session.clone(),
            self.reconciler.clone(),
            self.config.follows_per_page,
        )
    }

    pub fn notifications_view(&self) -> NotificationsView {
        NotificationsView::new(
            self.notification_service.clone(),
            self.session.clone(),
            self.config.notifications_per_page,
        )
    }

    pub fn inbox_view(&self) -> InboxView {
        InboxView::new(self.message_service.clone(), self.session.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated()
    }
}
