//! Admin registration for posts.
//!
//! [`POST_ADMIN`] is the process-wide table a serving layer consults to lay
//! out the change list, the filter sidebar, the search box and the entry
//! form. It is registered once and never mutated.

mod changelist;
mod form;
mod service;

pub use changelist::{
    ChangeList, ChangeListQuery, Criterion, DateDrillDown, DateRange, ListFilter,
    compare_posts, date_hierarchy_buckets,
};
pub use form::PostForm;
pub use service::PostAdminService;

use crate::domain::{OrderBy, Post, PostField};

/// Declarative admin options for one entity.
#[derive(Debug)]
pub struct ModelAdmin {
    /// Columns of the change list.
    pub list_display: &'static [PostField],
    /// Fields offered in the filter sidebar.
    pub list_filter: &'static [PostField],
    /// Fields matched by the search box.
    pub search_fields: &'static [PostField],
    /// `(target, sources)` pairs; target is suggested from the sources.
    pub prepopulated_fields: &'static [(PostField, &'static [PostField])],
    /// Foreign keys edited through an id lookup instead of a dropdown.
    pub raw_id_fields: &'static [PostField],
    pub date_hierarchy: Option<PostField>,
    pub ordering: &'static [OrderBy],
    pub list_per_page: u64,
}

pub static POST_ADMIN: ModelAdmin = ModelAdmin {
    list_display: &[
        PostField::Title,
        PostField::Slug,
        PostField::Author,
        PostField::Publish,
        PostField::Status,
    ],
    list_filter: &[
        PostField::Status,
        PostField::Created,
        PostField::Publish,
        PostField::Author,
    ],
    search_fields: &[PostField::Title, PostField::Body],
    prepopulated_fields: &[(PostField::Slug, &[PostField::Title])],
    raw_id_fields: &[PostField::Author],
    date_hierarchy: Some(PostField::Publish),
    ordering: &[OrderBy::asc(PostField::Status), OrderBy::asc(PostField::Publish)],
    list_per_page: 100,
};

impl ModelAdmin {
    pub fn is_filterable(&self, field: PostField) -> bool {
        self.list_filter.contains(&field)
    }

    pub fn is_searchable(&self, field: PostField) -> bool {
        self.search_fields.contains(&field)
    }

    pub fn is_raw_id(&self, field: PostField) -> bool {
        self.raw_id_fields.contains(&field)
    }

    /// Column headers of the change list.
    pub fn headers(&self) -> Vec<&'static str> {
        self.list_display.iter().map(|field| field.label()).collect()
    }

    /// Render one change list row.
    pub fn display_row(&self, post: &Post) -> Vec<String> {
        self.list_display
            .iter()
            .map(|&field| display_value(post, field))
            .collect()
    }
}

/// String shown for `field` of `post` in list cells.
pub fn display_value(post: &Post, field: PostField) -> String {
    match field {
        PostField::Id => post.id.to_string(),
        PostField::Title => post.title.clone(),
        PostField::Slug => post.slug.clone(),
        PostField::Author => post.author_id.to_string(),
        PostField::Body => post.body.clone(),
        PostField::Publish => post.publish.format("%Y-%m-%d %H:%M").to_string(),
        PostField::Created => post.created.format("%Y-%m-%d %H:%M").to_string(),
        PostField::Updated => post.updated.format("%Y-%m-%d %H:%M").to_string(),
        PostField::Status => post.status.label().to_string(),
    }
}
