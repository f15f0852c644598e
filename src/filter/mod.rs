//! Client-side filtering of fetched lists.
//!
//! Every filter is a conjunction of optional predicates. An inactive
//! predicate matches everything, so a default filter returns its input
//! unchanged. Results borrow from the input and keep its order.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::models::{Activity, ActivityAction, Course, Document};

/// A filter over records of type `T`.
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;

    fn apply<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Case-insensitive substring match. The empty pattern is inactive;
/// whitespace in a pattern is matched literally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    needle: Option<String>,
}

impl TextFilter {
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: (!pattern.is_empty()).then(|| pattern.to_lowercase()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    pub fn matches(&self, field: &str) -> bool {
        match &self.needle {
            Some(needle) => field.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

impl From<Option<String>> for TextFilter {
    fn from(pattern: Option<String>) -> Self {
        pattern.as_deref().map(Self::new).unwrap_or_default()
    }
}

/// `All`, or an exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Only(_))
    }

    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl FromStr for Choice<bool> {
    type Err = String;

    /// Parses `all`, `yes`/`no` or `true`/`false`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "yes" | "true" => Ok(Self::Only(true)),
            "no" | "false" => Ok(Self::Only(false)),
            other => Err(format!("expected yes, no or all (got '{}')", other)),
        }
    }
}

impl FromStr for Choice<ActivityAction> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(ActivityAction::parse(s)))
        }
    }
}

/// Inclusive day bounds; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Undated records only pass an inactive range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub user: TextFilter,
    pub course: TextFilter,
    pub domain: TextFilter,
    pub file: TextFilter,
    pub action: Choice<ActivityAction>,
    pub dates: DateRange,
}

impl RecordFilter<Activity> for ActivityFilter {
    fn matches(&self, activity: &Activity) -> bool {
        self.user.matches(&activity.user)
            && self.course.matches(&activity.course_name)
            && self.domain.matches(&activity.domain)
            && self.file.matches(activity.file_name().unwrap_or(""))
            && self.action.matches(&activity.action)
            && self.dates.contains(activity.date())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub name: TextFilter,
    pub in_vector_store: Choice<bool>,
    pub root_blob: Choice<bool>,
    pub dates: DateRange,
}

impl RecordFilter<Document> for FileFilter {
    fn matches(&self, doc: &Document) -> bool {
        self.name.matches(&doc.name)
            && self.in_vector_store.matches(&doc.in_vector_store)
            && self.root_blob.matches(&doc.is_root_blob)
            && self.dates.contains(doc.date())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub name: TextFilter,
}

impl RecordFilter<Course> for CourseFilter {
    fn matches(&self, course: &Course) -> bool {
        self.name.matches(&course.course_name)
    }
}
