use crate::{
    error::{ClientError, ErrorDisplay, Result},
    models::{
        follow::FollowEntry,
        post::{Post, PostId, Rating},
    },
    services::{
        api::report_error, follow::FollowService, post::PostService, session::SharedSessionStore,
    },
    utils::{pagination::Paginator, view_scope::ViewTicket},
    views::list_state::{Entity, ListState},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 一类可切换的状态（点赞、收藏、关注……）及其对应的接口
#[async_trait]
pub trait ToggleTarget: Send + Sync {
    type Entity: Entity;

    /// 同一实体同一通道上同时只允许一个请求
    fn channel(&self) -> &'static str;

    fn is_active(&self, entity: &Self::Entity) -> bool;

    /// 乐观修改：翻转标志并调整计数
    fn apply(&self, entity: &mut Self::Entity, activate: bool);

    /// 请求失败时撤销 apply 的修改
    fn restore(&self, entity: &mut Self::Entity, previous: &Self::Entity);

    /// 部分请求已生效且无法重新拉取时的本地状态
    fn settle_partial(&self, entity: &mut Self::Entity, previous: &Self::Entity) {
        self.restore(entity, previous);
    }

    async fn activate(&self, previous: &Self::Entity) -> Result<()>;

    async fn deactivate(&self, previous: &Self::Entity) -> Result<()>;

    /// 成功后取回服务端的权威数据
    async fn refetch(&self, current: &Self::Entity) -> Result<Vec<Self::Entity>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// 请求成功，状态已与服务端同步
    Applied,
    /// 请求失败，本地修改已撤销
    Reverted(ErrorDisplay),
    /// 同一实体已有请求在进行中
    Ignored,
    NotFound,
    /// 视图已离开，响应被丢弃
    Discarded,
}

type InFlightKey = (&'static str, i64);

struct InFlightGuard {
    in_flight: Arc<DashMap<InFlightKey, ()>>,
    key: InFlightKey,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<DashMap<InFlightKey, ()>>, key: InFlightKey) -> Option<Self> {
        match in_flight.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self {
                    in_flight: in_flight.clone(),
                    key,
                })
            }
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// 乐观切换：先改本地状态，再发请求，成功后重新拉取，失败则撤销
#[derive(Clone)]
pub struct ToggleReconciler {
    session: SharedSessionStore,
    in_flight: Arc<DashMap<InFlightKey, ()>>,
}

impl ToggleReconciler {
    pub fn new(session: SharedSessionStore) -> Self {
        Self {
            session,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn is_in_flight(&self, channel: &'static str, entity_id: i64) -> bool {
        self.in_flight.contains_key(&(channel, entity_id))
    }

    pub async fn toggle<T: ToggleTarget>(
        &self,
        state: &ListState<T::Entity>,
        target: &T,
        entity_id: i64,
    ) -> ToggleOutcome {
        let channel = target.channel();
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, (channel, entity_id)) else {
            debug!("Ignoring {} toggle on {}: request in flight", channel, entity_id);
            return ToggleOutcome::Ignored;
        };

        let Some(previous) = state.get(entity_id) else {
            return ToggleOutcome::NotFound;
        };

        let ticket = state.scope().ticket();
        let was_active = target.is_active(&previous);
        state.update(entity_id, |entity| target.apply(entity, !was_active));
        state.set_error(None);

        let result = if was_active {
            target.deactivate(&previous).await
        } else {
            target.activate(&previous).await
        };

        if !ticket.is_current() {
            debug!("Discarding {} result for {}: view left", channel, entity_id);
            return ToggleOutcome::Discarded;
        }

        if let Err(e) = result {
            warn!("{} toggle on {} failed: {}", channel, entity_id, e);
            let display = report_error(self.session.as_ref(), &e);
            if e.is_partially_applied() {
                if !self.resync(state, target, entity_id, &previous, &ticket).await {
                    return ToggleOutcome::Discarded;
                }
            } else {
                state.update(entity_id, |entity| target.restore(entity, &previous));
            }
            state.set_error(Some(display.clone()));
            return ToggleOutcome::Reverted(display);
        }

        let Some(current) = state.get(entity_id) else {
            return ToggleOutcome::Applied;
        };
        match target.refetch(&current).await {
            Ok(_) if !ticket.is_current() => return ToggleOutcome::Discarded,
            Ok(fresh) => state.merge(fresh),
            // 拉取失败时保留乐观状态，它与服务端已确认的结果一致
            Err(e) => warn!("Refetch after {} toggle failed: {}", channel, e),
        }

        ToggleOutcome::Applied
    }

    /// 服务端已部分改变：以服务端数据为准，拉取失败再按 settle_partial 处理
    ///
    /// 视图已离开时返回 false。
    async fn resync<T: ToggleTarget>(
        &self,
        state: &ListState<T::Entity>,
        target: &T,
        entity_id: i64,
        previous: &T::Entity,
        ticket: &ViewTicket,
    ) -> bool {
        let Some(current) = state.get(entity_id) else {
            return true;
        };

        let fresh = target.refetch(&current).await;
        if !ticket.is_current() {
            return false;
        }
        match fresh {
            Ok(fresh) => state.merge(fresh),
            Err(e) => {
                warn!("Resync after partial {} toggle failed: {}", target.channel(), e);
                state.update(entity_id, |entity| target.settle_partial(entity, previous));
            }
        }
        true
    }
}

/// 评价切换用到的接口
#[async_trait]
pub trait RatingApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn rate(&self, post_id: PostId, rating: Rating) -> Result<()>;

    async fn delete_rating(&self, post_id: PostId, rating_id: i64) -> Result<()>;
}

#[async_trait]
impl RatingApi for PostService {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        PostService::list_posts(self).await
    }

    async fn rate(&self, post_id: PostId, rating: Rating) -> Result<()> {
        PostService::rate(self, post_id, rating).await
    }

    async fn delete_rating(&self, post_id: PostId, rating_id: i64) -> Result<()> {
        PostService::delete_rating(self, post_id, rating_id).await
    }
}

/// 点赞 / 点踩，两者互斥
#[derive(Clone)]
pub struct RatingToggle<A = PostService> {
    api: A,
    button: Rating,
}

impl<A: RatingApi> RatingToggle<A> {
    pub fn like(api: A) -> Self {
        Self {
            api,
            button: Rating::Liked,
        }
    }

    pub fn dislike(api: A) -> Self {
        Self {
            api,
            button: Rating::Disliked,
        }
    }

    /// 本地没有评价 id 时（上次拉取失败）向服务端查询
    async fn existing_rating_id(&self, previous: &Post) -> Result<i64> {
        if let Some(rating_id) = previous.rating_id {
            return Ok(rating_id);
        }

        debug!("Looking up rating id for post {}", previous.id);
        self.api
            .list_posts()
            .await?
            .into_iter()
            .find(|post| post.id == previous.id)
            .and_then(|post| post.rating_id)
            .ok_or_else(|| {
                ClientError::InvalidState(format!("post {} has no rating id", previous.id))
            })
    }
}

#[async_trait]
impl<A: RatingApi> ToggleTarget for RatingToggle<A> {
    type Entity = Post;

    fn channel(&self) -> &'static str {
        "rating"
    }

    fn is_active(&self, post: &Post) -> bool {
        post.rating == self.button
    }

    fn apply(&self, post: &mut Post, activate: bool) {
        let next = if activate { self.button } else { Rating::None };
        post.set_rating(next);
        // 旧的评价 id 已失效，等待重新拉取
        post.rating_id = None;
    }

    fn restore(&self, post: &mut Post, previous: &Post) {
        post.set_rating(previous.rating);
        post.rating_id = previous.rating_id;
    }

    /// 旧评价已删除、新评价未建立
    fn settle_partial(&self, post: &mut Post, _previous: &Post) {
        post.set_rating(Rating::None);
        post.rating_id = None;
    }

    async fn activate(&self, previous: &Post) -> Result<()> {
        // 已有相反的评价时先删除，后端不允许同一用户重复评价
        if previous.rating != Rating::None {
            let rating_id = self.existing_rating_id(previous).await?;
            self.api.delete_rating(previous.id, rating_id).await?;
            return self
                .api
                .rate(previous.id, self.button)
                .await
                .map_err(ClientError::partially_applied);
        }
        self.api.rate(previous.id, self.button).await
    }

    async fn deactivate(&self, previous: &Post) -> Result<()> {
        let rating_id = self.existing_rating_id(previous).await?;
        self.api.delete_rating(previous.id, rating_id).await
    }

    async fn refetch(&self, _current: &Post) -> Result<Vec<Post>> {
        self.api.list_posts().await
    }
}

#[derive(Clone)]
pub struct FavoriteToggle {
    posts: PostService,
}

impl FavoriteToggle {
    pub fn new(posts: PostService) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl ToggleTarget for FavoriteToggle {
    type Entity = Post;

    fn channel(&self) -> &'static str {
        "favorite"
    }

    fn is_active(&self, post: &Post) -> bool {
        post.favorited
    }

    fn apply(&self, post: &mut Post, activate: bool) {
        post.set_favorited(activate);
    }

    fn restore(&self, post: &mut Post, previous: &Post) {
        post.set_favorited(previous.favorited);
    }

    async fn activate(&self, previous: &Post) -> Result<()> {
        self.posts.favorite(previous.id).await
    }

    async fn deactivate(&self, previous: &Post) -> Result<()> {
        self.posts.unfavorite(previous.id).await
    }

    async fn refetch(&self, _current: &Post) -> Result<Vec<Post>> {
        self.posts.list_posts().await
    }
}

/// 关注列表的分页上限，防止后端忽略 per_page 时无限翻页
const MAX_FOLLOWING_PAGES: u32 = 50;

#[derive(Clone)]
pub struct FollowToggle {
    follows: FollowService,
    per_page: usize,
}

impl FollowToggle {
    pub fn new(follows: FollowService, per_page: usize) -> Self {
        Self { follows, per_page }
    }
}

#[async_trait]
impl ToggleTarget for FollowToggle {
    type Entity = FollowEntry;

    fn channel(&self) -> &'static str {
        "follow"
    }

    fn is_active(&self, entry: &FollowEntry) -> bool {
        entry.following
    }

    fn apply(&self, entry: &mut FollowEntry, activate: bool) {
        entry.set_following(activate);
    }

    fn restore(&self, entry: &mut FollowEntry, previous: &FollowEntry) {
        entry.set_following(previous.following);
    }

    async fn activate(&self, previous: &FollowEntry) -> Result<()> {
        self.follows.follow(previous.user.id).await
    }

    async fn deactivate(&self, previous: &FollowEntry) -> Result<()> {
        self.follows.unfollow(previous.user.id).await
    }

    /// 关注关系以 /myfollowing 为准；计数沿用本地值
    async fn refetch(&self, current: &FollowEntry) -> Result<Vec<FollowEntry>> {
        let mut pager = Paginator::new(self.per_page);
        let mut found = false;

        while let Some(query) = pager.next_query() {
            if query.page > MAX_FOLLOWING_PAGES {
                break;
            }
            let page = self.follows.following(query).await?;
            if page.iter().any(|user| user.id == current.user.id) {
                found = true;
                break;
            }
            pager.record_page(page.len());
        }

        let mut fresh = current.clone();
        fresh.set_following(found);
        Ok(vec![fresh])
    }
}
