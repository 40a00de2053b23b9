use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use blog_core::error::RepoError;
use blog_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    /// Accepts an owned connection or a shared handle to one.
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }
}

/// Translate a SeaORM error into the repository error vocabulary.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    if let Some(mapped) = err.sql_err().and_then(map_sql_err) {
        return mapped;
    }

    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        other => RepoError::Query(other.to_string()),
    }
}

/// Constraint violations reported by the database.
///
/// A foreign-key violation means a row is still referenced (deleting an
/// author with posts) or references nothing, and surfaces as `Protected`.
fn map_sql_err(err: SqlErr) -> Option<RepoError> {
    match err {
        SqlErr::UniqueConstraintViolation(msg) => Some(RepoError::Constraint(msg)),
        SqlErr::ForeignKeyConstraintViolation(msg) => Some(RepoError::Protected(msg)),
        _ => None,
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(self.db.as_ref()).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = active_model.insert(self.db.as_ref()).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = active_model.update(self.db.as_ref()).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_violation_is_protected() {
        let err = map_sql_err(SqlErr::ForeignKeyConstraintViolation(
            "fk_posts_author_id".to_owned(),
        ));
        assert!(matches!(err, Some(RepoError::Protected(msg)) if msg == "fk_posts_author_id"));
    }

    #[test]
    fn test_unique_violation_is_constraint() {
        let err = map_sql_err(SqlErr::UniqueConstraintViolation(
            "uq_posts_slug_publish_date".to_owned(),
        ));
        assert!(matches!(err, Some(RepoError::Constraint(_))));
    }

    #[test]
    fn test_map_db_err_without_sql_error() {
        assert!(matches!(
            map_db_err(DbErr::RecordNotUpdated),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_db_err(DbErr::RecordNotFound("posts".to_owned())),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_db_err(DbErr::Custom("boom".to_owned())),
            RepoError::Query(msg) if msg.contains("boom")
        ));
    }
}
