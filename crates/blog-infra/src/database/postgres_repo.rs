//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use blog_core::admin::{ChangeList, ChangeListQuery, Criterion, POST_ADMIN};
use blog_core::domain::{Post, PostField, User};
use blog_core::error::RepoError;
use blog_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::Publish)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::Publish)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug_on_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let mut select = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start));
        if let Some(next) = date.checked_add_days(Days::new(1)) {
            let end = next.and_time(NaiveTime::MIN).and_utc();
            select = select.filter(post::Column::Publish.lt(end));
        }

        let result = select
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn change_list(&self, query: &ChangeListQuery) -> Result<ChangeList<Post>, RepoError> {
        query
            .validate(&POST_ADMIN)
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let criteria = query
            .criteria(&POST_ADMIN)
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut select = PostEntity::find().filter(criteria_condition(&criteria));
        for order in query.ordering(&POST_ADMIN) {
            let direction = if order.descending {
                Order::Desc
            } else {
                Order::Asc
            };
            select = select.order_by(column(order.field), direction);
        }

        let per_page = query.per_page(&POST_ADMIN);
        let paginator = select.paginate(self.db.as_ref(), per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator
            .fetch_page(query.page.saturating_sub(1))
            .await
            .map_err(map_db_err)?;

        tracing::debug!(total, page = query.page, "Change list fetched");

        Ok(ChangeList {
            items: models.into_iter().map(Into::into).collect(),
            total,
            page: query.page,
            per_page,
        })
    }
}

fn column(field: PostField) -> post::Column {
    match field {
        PostField::Id => post::Column::Id,
        PostField::Title => post::Column::Title,
        PostField::Slug => post::Column::Slug,
        PostField::Author => post::Column::AuthorId,
        PostField::Body => post::Column::Body,
        PostField::Publish => post::Column::Publish,
        PostField::Created => post::Column::Created,
        PostField::Updated => post::Column::Updated,
        PostField::Status => post::Column::Status,
    }
}

fn criteria_condition(criteria: &[Criterion]) -> Condition {
    criteria
        .iter()
        .fold(Condition::all(), |condition, criterion| match criterion {
            Criterion::Status(status) => {
                condition.add(post::Column::Status.eq(post::Status::from(*status)))
            }
            Criterion::Author(author_id) => condition.add(post::Column::AuthorId.eq(*author_id)),
            Criterion::CreatedBetween(start, end) => condition
                .add(post::Column::Created.gte(*start))
                .add(post::Column::Created.lt(*end)),
            Criterion::PublishBetween(start, end) => condition
                .add(post::Column::Publish.gte(*start))
                .add(post::Column::Publish.lt(*end)),
            Criterion::Search { term, fields } => {
                let pattern = format!("%{}%", escape_like(term));
                let any_field = fields
                    .iter()
                    .filter(|field| matches!(field, PostField::Title | PostField::Slug | PostField::Body))
                    .fold(Condition::any(), |any, field| {
                        any.add(
                            Expr::expr(Func::lower(Expr::col((PostEntity, column(*field)))))
                                .like(LikeExpr::new(pattern.clone()).escape('\\')),
                        )
                    });
                condition.add(any_field)
            }
        })
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
