use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::comment::Comment;
use crate::utils::serde_helpers::{lenient_timestamp, null_as_default};

pub type PostId = i64;

/// 当前用户对帖子的评价，同一时刻只能有一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    #[default]
    None,
    Liked,
    Disliked,
}

impl Rating {
    /// 点击某个评价按钮后的新状态：再次点击取消，点击另一侧则切换
    pub fn pressed(self, button: Rating) -> Rating {
        if self == button {
            Rating::None
        } else {
            button
        }
    }

    /// POST /ratings 使用的 status 值
    pub fn status(self) -> Option<&'static str> {
        match self {
            Rating::Liked => Some("like"),
            Rating::Disliked => Some("dislike"),
            Rating::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub favorites_count: i64,
    pub comments_count: i64,
    pub rating: Rating,
    pub rating_id: Option<i64>,
    pub favorited: bool,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    /// 仅界面使用，不会发送给后端
    pub is_expanded: bool,
}

/// 后端返回的帖子格式，liked/disliked 是两个独立的布尔值
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostRecord {
    id: PostId,
    title: String,
    content: String,
    #[serde(default)]
    author: String,
    #[serde(with = "lenient_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    likes_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    dislikes_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    favorites_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    comments_count: i64,
    #[serde(default)]
    liked: bool,
    #[serde(default)]
    disliked: bool,
    #[serde(default)]
    favorited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    comments: Vec<Comment>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        // 两个标志同时为真时以点赞为准
        let rating = match (record.liked, record.disliked) {
            (true, _) => Rating::Liked,
            (false, true) => Rating::Disliked,
            (false, false) => Rating::None,
        };

        Post {
            id: record.id,
            title: record.title,
            content: record.content,
            author: record.author,
            created_at: record.created_at,
            likes_count: record.likes_count,
            dislikes_count: record.dislikes_count,
            favorites_count: record.favorites_count,
            comments_count: record.comments_count,
            rating,
            rating_id: record.rating_id,
            favorited: record.favorited,
            tags: record.tags,
            comments: record.comments,
            is_expanded: false,
        }
    }
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        PostRecord {
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: post.created_at,
            likes_count: post.likes_count,
            dislikes_count: post.dislikes_count,
            favorites_count: post.favorites_count,
            comments_count: post.comments_count,
            liked: post.rating == Rating::Liked,
            disliked: post.rating == Rating::Disliked,
            favorited: post.favorited,
            rating_id: post.rating_id,
            tags: post.tags,
            comments: post.comments,
        }
    }
}

impl<'de> Deserialize<'de> for Post {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        PostRecord::deserialize(deserializer).map(Post::from)
    }
}

impl Serialize for Post {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        PostRecord::from(self.clone()).serialize(serializer)
    }
}

impl Post {
    pub fn liked(&self) -> bool {
        self.rating == Rating::Liked
    }

    pub fn disliked(&self) -> bool {
        self.rating == Rating::Disliked
    }

    /// 切换评价并同步调整两侧计数
    pub fn set_rating(&mut self, rating: Rating) {
        match self.rating {
            Rating::Liked => self.likes_count -= 1,
            Rating::Disliked => self.dislikes_count -= 1,
            Rating::None => {}
        }
        match rating {
            Rating::Liked => self.likes_count += 1,
            Rating::Disliked => self.dislikes_count += 1,
            Rating::None => {}
        }
        self.rating = rating;
    }

    pub fn set_favorited(&mut self, favorited: bool) {
        if self.favorited == favorited {
            return;
        }
        self.favorites_count += if favorited { 1 } else { -1 };
        self.favorited = favorited;
    }

    /// 乐观追加评论，显示在列表末尾
    pub fn append_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.comments_count += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRatingRequest {
    pub post_id: PostId,
    pub status: String,
}
