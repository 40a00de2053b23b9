use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ModelAdmin;
use crate::domain::slug::slugify;
use crate::domain::{Post, PostField, PostStatus};

/// Add/change form submitted from the admin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    /// Left empty to have it suggested from the title.
    #[serde(default)]
    pub slug: String,
    /// Entered through the raw id lookup.
    pub author_id: Uuid,
    pub body: String,
    #[serde(default)]
    pub publish: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

impl PostForm {
    /// Fill empty prepopulated fields from their source fields.
    pub fn prepopulate(&mut self, admin: &ModelAdmin) {
        for (target, sources) in admin.prepopulated_fields {
            if *target != PostField::Slug || !self.slug.trim().is_empty() {
                continue;
            }
            let source_text = sources
                .iter()
                .filter_map(|field| self.text(*field))
                .collect::<Vec<_>>()
                .join(" ");
            self.slug = slugify(&source_text);
        }
    }

    fn text(&self, field: PostField) -> Option<&str> {
        match field {
            PostField::Title => Some(&self.title),
            PostField::Slug => Some(&self.slug),
            PostField::Body => Some(&self.body),
            _ => None,
        }
    }

    /// Build a new post; omitted publish time and status take their defaults.
    pub fn into_post(self) -> Post {
        let mut post = Post::new(self.author_id, self.title, self.slug, self.body);
        if let Some(publish) = self.publish {
            post.publish = publish;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        post
    }

    /// Copy the submitted values onto an existing post. `created` is untouched.
    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title;
        post.slug = self.slug;
        post.author_id = self.author_id;
        post.body = self.body;
        if let Some(publish) = self.publish {
            post.publish = publish;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::POST_ADMIN;

    fn form() -> PostForm {
        PostForm {
            title: "Hello, World!".to_string(),
            author_id: Uuid::new_v4(),
            body: "First post".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prepopulate_slug_from_title() {
        let mut form = form();
        form.prepopulate(&POST_ADMIN);
        assert_eq!(form.slug, "hello-world");
    }

    #[test]
    fn test_prepopulate_keeps_explicit_slug() {
        let mut form = form();
        form.slug = "custom".to_string();
        form.prepopulate(&POST_ADMIN);
        assert_eq!(form.slug, "custom");
    }

    #[test]
    fn test_into_post_defaults() {
        let post = form().into_post();
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.publish, post.created);
    }

    #[test]
    fn test_deserialize_minimal_form() {
        let author_id = Uuid::new_v4();
        let json = format!(r#"{{"title":"T","author_id":"{author_id}","body":"B"}}"#);
        let form: PostForm = serde_json::from_str(&json).unwrap();
        assert_eq!(form.slug, "");
        assert_eq!(form.status, None);
        assert_eq!(form.author_id, author_id);
    }
}
