//! Community feed: farmers' posts with likes and a category tag.
//!
//! Posts are kept newest first under the `posts` key; see
//! [`FarmStore::posts`](crate::FarmStore::posts).

use serde::{Deserialize, Serialize};

use crate::generate::{Clock, IdGenerator};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Question,
    Tip,
    Success,
    Problem,
}

impl PostCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PostCategory::Question => "question",
            PostCategory::Tip => "tip",
            PostCategory::Success => "success",
            PostCategory::Problem => "problem",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub verified: bool,
}

impl Author {
    /// The person using this install. Never verified.
    pub fn local(name: Option<&str>, location: Option<&str>) -> Self {
        let pick = |v: Option<&str>, fallback: &str| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            name: pick(name, "You"),
            location: pick(location, "Your Location"),
            verified: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: Author,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    /// Whether the local user has liked this post.
    #[serde(default)]
    pub is_liked: bool,
    pub category: PostCategory,
}

impl Post {
    /// Flip the local user's like and move the count with it.
    pub fn toggle_like(&mut self) {
        if self.is_liked {
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.likes += 1;
        }
        self.is_liked = !self.is_liked;
    }
}

/// Build a fresh post with no likes or comments. Blank content is rejected.
pub fn new_post(
    author: Author,
    content: &str,
    category: PostCategory,
    image: Option<String>,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<Post> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Validation("post content must not be blank".into()));
    }
    Ok(Post {
        id: ids.next_id(),
        author,
        content: content.to_string(),
        image: image.filter(|i| !i.trim().is_empty()),
        created_at: clock.now(),
        likes: 0,
        comments: 0,
        is_liked: false,
        category,
    })
}

/// Posts in the given category, or all of them. Order is preserved.
pub fn filter(posts: &[Post], category: Option<PostCategory>) -> Vec<&Post> {
    posts
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect()
}
