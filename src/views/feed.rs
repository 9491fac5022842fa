use crate::{
    error::ClientError,
    models::{comment::Comment, post::{Post, PostId}},
    services::{
        api::report_error,
        comment::CommentService,
        post::PostService,
        session::SharedSessionStore,
        toggle::{FavoriteToggle, RatingToggle, ToggleOutcome, ToggleReconciler},
    },
    views::{list_state::ListState, ViewResult},
};
use tracing::{debug, warn};

/// 本地追加评论时显示的作者名
const LOCAL_AUTHOR: &str = "You";

/// 首页信息流
#[derive(Clone)]
pub struct FeedView {
    posts: PostService,
    comments: CommentService,
    session: SharedSessionStore,
    reconciler: ToggleReconciler,
    like: RatingToggle,
    dislike: RatingToggle,
    favorite: FavoriteToggle,
    state: ListState<Post>,
}

impl FeedView {
    pub fn new(
        posts: PostService,
        comments: CommentService,
        session: SharedSessionStore,
        reconciler: ToggleReconciler,
    ) -> Self {
        Self {
            like: RatingToggle::like(posts.clone()),
            dislike: RatingToggle::dislike(posts.clone()),
            favorite: FavoriteToggle::new(posts.clone()),
            posts,
            comments,
            session,
            reconciler,
            state: ListState::new(),
        }
    }

    pub fn state(&self) -> &ListState<Post> {
        &self.state
    }

    fn fail(&self, err: ClientError) -> crate::error::ErrorDisplay {
        let display = report_error(self.session.as_ref(), &err);
        self.state.set_error(Some(display.clone()));
        display
    }

    pub async fn load(&self) -> ViewResult<()> {
        let ticket = self.state.scope().ticket();
        self.state.set_loading(true);
        let result = self.posts.list_posts().await;
        if !ticket.is_current() {
            debug!("Discarding feed response: view left");
            return Ok(());
        }
        self.state.set_loading(false);

        match result {
            Ok(posts) => {
                self.state.replace(posts);
                self.state.set_error(None);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// 展开时按需加载评论
    pub async fn toggle_expanded(&self, post_id: PostId) -> ViewResult<()> {
        let mut expanded = false;
        let found = self.state.update(post_id, |post| {
            post.is_expanded = !post.is_expanded;
            expanded = post.is_expanded;
        });

        if found && expanded {
            self.load_comments(post_id).await?;
        }
        Ok(())
    }

    pub async fn load_comments(&self, post_id: PostId) -> ViewResult<()> {
        let ticket = self.state.scope().ticket();
        let result = self.comments.list_comments(post_id).await;
        if !ticket.is_current() {
            return Ok(());
        }

        match result {
            Ok(comments) => {
                self.state.update(post_id, |post| post.comments = comments);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn like(&self, post_id: PostId) -> ToggleOutcome {
        self.reconciler.toggle(&self.state, &self.like, post_id).await
    }

    pub async fn dislike(&self, post_id: PostId) -> ToggleOutcome {
        self.reconciler.toggle(&self.state, &self.dislike, post_id).await
    }

    pub async fn favorite(&self, post_id: PostId) -> ToggleOutcome {
        self.reconciler
            .toggle(&self.state, &self.favorite, post_id)
            .await
    }

    /// 发表评论，成功后把评论追加到末尾
    pub async fn submit_comment(&self, post_id: PostId, content: &str) -> ViewResult<()> {
        let ticket = self.state.scope().ticket();
        let result = self.comments.add_comment(post_id, content).await;
        if !ticket.is_current() {
            return Ok(());
        }

        match result {
            Ok(content) => {
                if !self.state.update(post_id, |post| {
                    post.append_comment(Comment::pending(&content, LOCAL_AUTHOR))
                }) {
                    warn!("Commented on post {} which is no longer in the feed", post_id);
                }
                self.state.set_error(None);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn leave(&self) {
        self.state.leave();
    }
}
