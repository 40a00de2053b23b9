//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Both repositories share one state behind an async `RwLock`, so the checks
//! the database would do (foreign keys, slug per publish date, protected
//! authors) run atomically with the write they guard.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::admin::{ChangeList, ChangeListQuery, POST_ADMIN, compare_posts};
use blog_core::domain::{Post, User};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
}

impl State {
    fn slug_taken(&self, post: &Post) -> bool {
        let date = post.publish_date();
        self.posts
            .values()
            .any(|other| other.id != post.id && other.slug == post.slug && other.publish_date() == date)
    }

    fn check_post(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Protected(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if self.slug_taken(post) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already used on {}",
                post.slug,
                post.publish_date()
            )));
        }
        Ok(())
    }

    fn sorted_posts<F>(&self, keep: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self.posts.values().filter(|p| keep(p)).cloned().collect();
        posts.sort_by(|a, b| compare_posts(a, b, Post::DEFAULT_ORDERING));
        posts
    }
}

/// Shared in-memory store handing out post and user repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            state: self.state.clone(),
        }
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            state: self.state.clone(),
        }
    }
}

/// In-memory post repository.
#[derive(Clone)]
pub struct InMemoryPostRepository {
    state: Arc<RwLock<State>>,
}

/// In-memory user repository.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<State>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if state.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        state.check_post(&post)?;

        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        let created = state
            .posts
            .get(&post.id)
            .map(|existing| existing.created)
            .ok_or(RepoError::NotFound)?;
        state.check_post(&post)?;

        post.created = created;
        post.touch(Utc::now());
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.sorted_posts(|_| true))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.sorted_posts(|post| post.author_id == author_id))
    }

    async fn find_by_slug_on_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .find(|post| post.slug == slug && post.publish_date() == date)
            .cloned())
    }

    async fn change_list(&self, query: &ChangeListQuery) -> Result<ChangeList<Post>, RepoError> {
        query
            .validate(&POST_ADMIN)
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let criteria = query
            .criteria(&POST_ADMIN)
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let ordering = query.ordering(&POST_ADMIN);
        let per_page = query.per_page(&POST_ADMIN);

        let state = self.state.read().await;
        let mut matching: Vec<&Post> = state
            .posts
            .values()
            .filter(|post| criteria.iter().all(|c| c.matches(post)))
            .collect();
        matching.sort_by(|a, b| compare_posts(a, b, &ordering));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset(&POST_ADMIN)).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(ChangeList {
            items,
            total,
            page: query.page,
            per_page,
        })
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id)
            || state.users.values().any(|u| u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "user '{}' already exists",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "user '{}' already exists",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let authored = state.posts.values().filter(|p| p.author_id == id).count();
        if authored > 0 {
            tracing::warn!(user_id = %id, authored, "Refusing to delete author of posts");
            return Err(RepoError::Protected(format!(
                "user {id} is the author of {authored} post(s)"
            )));
        }
        state.users.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }
}
