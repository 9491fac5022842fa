use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// 关注/粉丝列表中的用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRequest {
    pub followed_user_id: UserId,
}

/// 列表中的一个用户及当前用户是否已关注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowEntry {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub followers_count: i64,
}

impl FollowEntry {
    pub fn new(user: UserSummary, following: bool) -> Self {
        Self {
            user,
            following,
            followers_count: 0,
        }
    }

    pub fn set_following(&mut self, following: bool) {
        if self.following == following {
            return;
        }
        self.followers_count += if following { 1 } else { -1 };
        self.following = following;
    }
}
