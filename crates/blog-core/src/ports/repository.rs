use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::admin::{ChangeList, ChangeListQuery};
use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Deleting a user that still authors posts fails with
/// [`RepoError::Protected`].
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Every list is ordered newest `publish` first unless the
/// query says otherwise. `update` keeps `created` and refreshes `updated`.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// The post holding `slug` on the given publish date, if any.
    async fn find_by_slug_on_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError>;

    /// Admin change list: filters, search, ordering and paging.
    async fn change_list(&self, query: &ChangeListQuery) -> Result<ChangeList<Post>, RepoError>;
}
