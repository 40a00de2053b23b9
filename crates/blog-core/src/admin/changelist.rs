//! Change list queries: filter sidebar, search box, date drill-down and paging.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ModelAdmin;
use crate::domain::{OrderBy, Post, PostField, PostStatus};
use crate::error::DomainError;

/// Choices offered by a date filter, resolved against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl DateRange {
    /// Half-open `[start, end)` interval in UTC.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        match self {
            DateRange::Today => (midnight(today), midnight(tomorrow)),
            DateRange::PastSevenDays => {
                let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN);
                (midnight(week_ago), midnight(tomorrow))
            }
            DateRange::ThisMonth => {
                let start = first_of_month(today.year(), today.month());
                (midnight(start), midnight(next_month(start)))
            }
            DateRange::ThisYear => (
                midnight(first_of_month(today.year(), 1)),
                midnight(first_of_month(today.year() + 1, 1)),
            ),
        }
    }
}

/// One entry of the filter sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ListFilter {
    Status(PostStatus),
    Author(Uuid),
    Created(DateRange),
    Publish(DateRange),
}

impl ListFilter {
    pub fn field(&self) -> PostField {
        match self {
            ListFilter::Status(_) => PostField::Status,
            ListFilter::Author(_) => PostField::Author,
            ListFilter::Created(_) => PostField::Created,
            ListFilter::Publish(_) => PostField::Publish,
        }
    }
}

/// Position in the `publish` date hierarchy: a year, a month or a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDrillDown {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateDrillDown {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: None,
        }
    }

    pub fn day(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Half-open `[start, end)` interval covered by this level.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
        let invalid = || DomainError::validation("date", format!("no such date: {self}"));
        match (self.month, self.day) {
            (None, None) => {
                let start = NaiveDate::from_ymd_opt(self.year, 1, 1).ok_or_else(invalid)?;
                let end = NaiveDate::from_ymd_opt(self.year + 1, 1, 1).ok_or_else(invalid)?;
                Ok((midnight(start), midnight(end)))
            }
            (Some(month), None) => {
                let start = NaiveDate::from_ymd_opt(self.year, month, 1).ok_or_else(invalid)?;
                Ok((midnight(start), midnight(next_month(start))))
            }
            (Some(month), Some(day)) => {
                let start = NaiveDate::from_ymd_opt(self.year, month, day).ok_or_else(invalid)?;
                Ok((midnight(start), midnight(start + Days::new(1))))
            }
            (None, Some(_)) => Err(DomainError::validation("date", "a day needs a month")),
        }
    }
}

impl std::fmt::Display for DateDrillDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
        }
        if let Some(day) = self.day {
            write!(f, "-{day:02}")?;
        }
        Ok(())
    }
}

/// Distinct values of the next hierarchy level below `level`.
///
/// With no level this lists years, under a year it lists months, under a
/// month it lists days. A day level has nothing below it.
pub fn date_hierarchy_buckets<I>(level: Option<&DateDrillDown>, dates: I) -> Vec<i32>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let buckets: BTreeSet<i32> = dates
        .into_iter()
        .filter_map(|date| match level {
            None => Some(date.year()),
            Some(DateDrillDown {
                year, month: None, ..
            }) => (date.year() == *year).then(|| date.month() as i32),
            Some(DateDrillDown {
                year,
                month: Some(month),
                day: None,
            }) => (date.year() == *year && date.month() == *month).then(|| date.day() as i32),
            Some(_) => None,
        })
        .collect();
    buckets.into_iter().collect()
}

/// A resolved restriction on the post set. Repositories translate these to
/// their own query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Status(PostStatus),
    Author(Uuid),
    CreatedBetween(DateTime<Utc>, DateTime<Utc>),
    PublishBetween(DateTime<Utc>, DateTime<Utc>),
    /// Case-insensitive substring match on any of `fields`.
    Search {
        term: String,
        fields: &'static [PostField],
    },
}

impl Criterion {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Criterion::Status(status) => post.status == *status,
            Criterion::Author(author_id) => post.author_id == *author_id,
            Criterion::CreatedBetween(start, end) => *start <= post.created && post.created < *end,
            Criterion::PublishBetween(start, end) => *start <= post.publish && post.publish < *end,
            Criterion::Search { term, fields } => fields.iter().any(|field| {
                search_text(post, *field)
                    .is_some_and(|text| text.to_lowercase().contains(term.as_str()))
            }),
        }
    }
}

fn search_text(post: &Post, field: PostField) -> Option<&str> {
    match field {
        PostField::Title => Some(&post.title),
        PostField::Slug => Some(&post.slug),
        PostField::Body => Some(&post.body),
        _ => None,
    }
}

/// Request for one page of the admin change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeListQuery {
    pub search: Option<String>,
    pub filters: Vec<ListFilter>,
    pub date: Option<DateDrillDown>,
    /// Overrides the registration ordering when set.
    pub ordering: Option<Vec<OrderBy>>,
    /// 1-based.
    pub page: u64,
    pub per_page: Option<u64>,
    /// Reference time for relative date filters.
    pub now: DateTime<Utc>,
}

impl Default for ChangeListQuery {
    fn default() -> Self {
        Self {
            search: None,
            filters: Vec::new(),
            date: None,
            ordering: None,
            page: 1,
            per_page: None,
            now: Utc::now(),
        }
    }
}

impl ChangeListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, filter: ListFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn drill_down(mut self, date: DateDrillDown) -> Self {
        self.date = Some(date);
        self
    }

    pub fn order_by(mut self, ordering: Vec<OrderBy>) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        self.page = page;
        self.per_page = Some(per_page);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Reject queries the registration does not allow.
    pub fn validate(&self, admin: &ModelAdmin) -> Result<(), DomainError> {
        if self.page == 0 {
            return Err(DomainError::validation("page", "pages start at 1"));
        }
        if let Some(per_page) = self.per_page {
            if per_page == 0 || per_page > admin.list_per_page {
                return Err(DomainError::validation(
                    "per_page",
                    format!("must be between 1 and {}", admin.list_per_page),
                ));
            }
        }
        // The last row of the page must be addressable.
        if self.page.checked_mul(self.per_page(admin)).is_none() {
            return Err(DomainError::validation("page", "out of range"));
        }
        if let Some(filter) = self.filters.iter().find(|f| !admin.is_filterable(f.field())) {
            return Err(DomainError::validation(
                "filters",
                format!("'{}' is not filterable", filter.field()),
            ));
        }
        if let Some(date) = &self.date {
            if admin.date_hierarchy.is_none() {
                return Err(DomainError::validation("date", "no date hierarchy registered"));
            }
            date.bounds()?;
        }
        Ok(())
    }

    pub fn per_page(&self, admin: &ModelAdmin) -> u64 {
        self.per_page.unwrap_or(admin.list_per_page)
    }

    pub fn offset(&self, admin: &ModelAdmin) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page(admin))
    }

    /// Effective ordering, always ending with a unique tiebreaker.
    pub fn ordering(&self, admin: &ModelAdmin) -> Vec<OrderBy> {
        let mut ordering = self
            .ordering
            .clone()
            .unwrap_or_else(|| admin.ordering.to_vec());
        if !ordering.iter().any(|o| o.field == PostField::Id) {
            ordering.push(OrderBy::desc(PostField::Id));
        }
        ordering
    }

    /// Resolve filters, drill-down and search terms. Call after `validate`.
    pub fn criteria(&self, admin: &ModelAdmin) -> Result<Vec<Criterion>, DomainError> {
        let mut criteria: Vec<Criterion> = self
            .filters
            .iter()
            .map(|filter| match *filter {
                ListFilter::Status(status) => Criterion::Status(status),
                ListFilter::Author(author_id) => Criterion::Author(author_id),
                ListFilter::Created(range) => {
                    let (start, end) = range.bounds(self.now);
                    Criterion::CreatedBetween(start, end)
                }
                ListFilter::Publish(range) => {
                    let (start, end) = range.bounds(self.now);
                    Criterion::PublishBetween(start, end)
                }
            })
            .collect();

        if let Some(date) = &self.date {
            let (start, end) = date.bounds()?;
            criteria.push(Criterion::PublishBetween(start, end));
        }

        if let Some(search) = &self.search {
            criteria.extend(search.split_whitespace().map(|term| Criterion::Search {
                term: term.to_lowercase(),
                fields: admin.search_fields,
            }));
        }

        Ok(criteria)
    }
}

/// One page of change list results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeList<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> ChangeList<T> {
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page.max(1))
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ChangeList<U> {
        ChangeList {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Compare two posts under an ordering, for backends that sort in memory.
pub fn compare_posts(a: &Post, b: &Post, ordering: &[OrderBy]) -> Ordering {
    ordering
        .iter()
        .map(|order| {
            let cmp = compare_field(a, b, order.field);
            if order.descending { cmp.reverse() } else { cmp }
        })
        .find(|cmp| cmp.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_field(a: &Post, b: &Post, field: PostField) -> Ordering {
    match field {
        PostField::Id => a.id.cmp(&b.id),
        PostField::Title => a.title.cmp(&b.title),
        PostField::Slug => a.slug.cmp(&b.slug),
        PostField::Author => a.author_id.cmp(&b.author_id),
        PostField::Body => a.body.cmp(&b.body),
        PostField::Publish => a.publish.cmp(&b.publish),
        PostField::Created => a.created.cmp(&b.created),
        PostField::Updated => a.updated.cmp(&b.updated),
        // Stored values sort the same way the database sorts them.
        PostField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 12 {
        first_of_month(first.year() + 1, 1)
    } else {
        first_of_month(first.year(), first.month() + 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::admin::POST_ADMIN;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn post(title: &str, body: &str, publish: DateTime<Utc>, status: PostStatus) -> Post {
        Post::new(
            Uuid::new_v4(),
            title.to_string(),
            crate::domain::slug::slugify(title),
            body.to_string(),
        )
        .with_publish(publish)
        .with_status(status)
    }

    #[test]
    fn test_date_range_bounds() {
        let now = at(2024, 12, 15, 13);
        assert_eq!(DateRange::Today.bounds(now), (at(2024, 12, 15, 0), at(2024, 12, 16, 0)));
        assert_eq!(
            DateRange::PastSevenDays.bounds(now),
            (at(2024, 12, 8, 0), at(2024, 12, 16, 0))
        );
        assert_eq!(DateRange::ThisMonth.bounds(now), (at(2024, 12, 1, 0), at(2025, 1, 1, 0)));
        assert_eq!(DateRange::ThisYear.bounds(now), (at(2024, 1, 1, 0), at(2025, 1, 1, 0)));
    }

    #[test]
    fn test_date_range_bounds_at_calendar_edges() {
        let first = NaiveDate::MIN.and_time(NaiveTime::MIN).and_utc();
        let (start, end) = DateRange::PastSevenDays.bounds(first);
        assert_eq!(start, first);
        assert_eq!(end, midnight(NaiveDate::MIN + Days::new(1)));

        let last = NaiveDate::MAX.and_time(NaiveTime::MIN).and_utc();
        let (start, end) = DateRange::Today.bounds(last);
        assert_eq!((start, end), (last, last));
    }

    #[test]
    fn test_drill_down_bounds() {
        assert_eq!(
            DateDrillDown::month(2024, 2).bounds().unwrap(),
            (at(2024, 2, 1, 0), at(2024, 3, 1, 0))
        );
        assert_eq!(
            DateDrillDown::day(2024, 2, 29).bounds().unwrap(),
            (at(2024, 2, 29, 0), at(2024, 3, 1, 0))
        );
        assert!(DateDrillDown::day(2023, 2, 29).bounds().is_err());
        assert!(DateDrillDown::month(2024, 13).bounds().is_err());
    }

    #[test]
    fn test_date_hierarchy_buckets() {
        let dates = [
            at(2023, 5, 1, 0),
            at(2024, 1, 3, 0),
            at(2024, 1, 9, 0),
            at(2024, 7, 1, 0),
        ];
        assert_eq!(date_hierarchy_buckets(None, dates), [2023, 2024]);
        assert_eq!(
            date_hierarchy_buckets(Some(&DateDrillDown::year(2024)), dates),
            [1, 7]
        );
        assert_eq!(
            date_hierarchy_buckets(Some(&DateDrillDown::month(2024, 1)), dates),
            [3, 9]
        );
        assert!(date_hierarchy_buckets(Some(&DateDrillDown::day(2024, 1, 3)), dates).is_empty());
    }

    #[test]
    fn test_search_every_term_must_match() {
        let query = ChangeListQuery::new().search("Rust  ASYNC");
        let criteria = query.criteria(&POST_ADMIN).unwrap();
        assert_eq!(criteria.len(), 2);

        let hit = post("Async Rust", "tokio", at(2024, 1, 1, 0), PostStatus::Draft);
        let partial = post("Rust", "ownership", at(2024, 1, 1, 0), PostStatus::Draft);
        let in_body = post("Notes", "rust is async-friendly", at(2024, 1, 1, 0), PostStatus::Draft);

        assert!(criteria.iter().all(|c| c.matches(&hit)));
        assert!(!criteria.iter().all(|c| c.matches(&partial)));
        assert!(criteria.iter().all(|c| c.matches(&in_body)));
    }

    #[test]
    fn test_validate() {
        assert!(ChangeListQuery::new().validate(&POST_ADMIN).is_ok());
        assert!(ChangeListQuery::new().page(0, 10).validate(&POST_ADMIN).is_err());
        assert!(ChangeListQuery::new().page(1, 101).validate(&POST_ADMIN).is_err());
        assert!(ChangeListQuery::new().page(u64::MAX, 1).validate(&POST_ADMIN).is_ok());
        assert!(ChangeListQuery::new().page(u64::MAX, 2).validate(&POST_ADMIN).is_err());
        assert!(
            ChangeListQuery::new()
                .drill_down(DateDrillDown::day(2024, 4, 31))
                .validate(&POST_ADMIN)
                .is_err()
        );
    }

    #[test]
    fn test_default_ordering_status_then_publish() {
        let query = ChangeListQuery::new();
        let ordering = query.ordering(&POST_ADMIN);
        assert_eq!(ordering.last(), Some(&OrderBy::desc(PostField::Id)));

        let mut posts = vec![
            post("c", "x", at(2024, 3, 1, 0), PostStatus::Published),
            post("b", "x", at(2024, 2, 1, 0), PostStatus::Draft),
            post("a", "x", at(2024, 1, 1, 0), PostStatus::Published),
            post("d", "x", at(2024, 1, 1, 0), PostStatus::Draft),
        ];
        posts.sort_by(|a, b| compare_posts(a, b, &ordering));
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["d", "b", "a", "c"]);
    }

    #[test]
    fn test_offset_saturates_on_huge_pages() {
        let mut query = ChangeListQuery::new();
        query.page = u64::MAX;
        assert!(matches!(
            query.validate(&POST_ADMIN),
            Err(DomainError::Validation(msg)) if msg.starts_with("page")
        ));
        assert_eq!(query.offset(&POST_ADMIN), u64::MAX);
        assert_eq!(ChangeListQuery::new().page(3, 20).offset(&POST_ADMIN), 40);
    }

    #[test]
    fn test_num_pages() {
        let list = ChangeList::<()> {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 100,
        };
        assert_eq!(list.num_pages(), 1);
        let list = ChangeList::<()> {
            items: vec![],
            total: 201,
            page: 1,
            per_page: 100,
        };
        assert_eq!(list.num_pages(), 3);
    }
}
