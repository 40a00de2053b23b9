//! Generic admin operations over the post repository.

use std::sync::Arc;

use uuid::Uuid;

use super::{ChangeList, ChangeListQuery, ModelAdmin, POST_ADMIN, PostForm};
use crate::domain::{Post, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};

/// Create, read, update, delete and list posts the way the admin does.
#[derive(Clone)]
pub struct PostAdminService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    admin: &'static ModelAdmin,
}

impl PostAdminService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            posts,
            users,
            admin: &POST_ADMIN,
        }
    }

    pub fn admin(&self) -> &'static ModelAdmin {
        self.admin
    }

    pub async fn create(&self, mut form: PostForm) -> Result<Post, DomainError> {
        form.prepopulate(self.admin);
        let post = form.into_post();
        post.validate()?;

        self.lookup_author(post.author_id).await?;
        self.check_slug_for_date(&post).await?;

        let saved = self.posts.insert(post).await?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post created");
        Ok(saved)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        tracing::debug!(post_id = %id, "Loading post");
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })
    }

    pub async fn update(&self, id: Uuid, mut form: PostForm) -> Result<Post, DomainError> {
        let mut post = self.get(id).await?;

        form.prepopulate(self.admin);
        form.apply_to(&mut post);
        post.validate()?;

        self.lookup_author(post.author_id).await?;
        self.check_slug_for_date(&post).await?;

        let saved = self.posts.update(post).await.map_err(|e| not_found(e, id))?;
        tracing::info!(post_id = %saved.id, status = %saved.status, "Post updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| not_found(e, id))?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn change_list(
        &self,
        query: &ChangeListQuery,
    ) -> Result<ChangeList<Post>, DomainError> {
        query.validate(self.admin)?;
        tracing::debug!(
            search = ?query.search,
            filters = query.filters.len(),
            page = query.page,
            "Building change list"
        );
        Ok(self.posts.change_list(query).await?)
    }

    /// Resolve a raw author id to its user.
    pub async fn lookup_author(&self, author_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| DomainError::validation("author", format!("no user with id {author_id}")))
    }

    async fn check_slug_for_date(&self, post: &Post) -> Result<(), DomainError> {
        let date = post.publish_date();
        match self.posts.find_by_slug_on_date(&post.slug, date).await? {
            Some(existing) if existing.id != post.id => Err(DomainError::Duplicate(format!(
                "slug '{}' is already used on {date}",
                post.slug
            ))),
            _ => Ok(()),
        }
    }
}

fn not_found(err: RepoError, id: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound {
            entity_type: "Post",
            id,
        },
        other => other.into(),
    }
}
