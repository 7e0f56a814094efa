// ↕️ Multi-Key Sorter - Deterministic, tie-break-aware ordering for display
//
// Every sort is stable and returns a new list; the input is never touched.

use crate::error::{RankingError, RankingResult};
use crate::join::RankingRow;
use crate::name_key::collate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SORT PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ViewCount,
    LikeCount,
    /// Age, ties broken by birth date
    AgeYears,
    NameSortKey,
    Country,
    PublishedAt,
    /// Final result: (category, rank, prize order, name)
    ResultCategory,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::ViewCount,
        SortField::LikeCount,
        SortField::AgeYears,
        SortField::NameSortKey,
        SortField::Country,
        SortField::PublishedAt,
        SortField::ResultCategory,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SortField::ViewCount => "viewCount",
            SortField::LikeCount => "likeCount",
            SortField::AgeYears => "ageYears",
            SortField::NameSortKey => "nameSortKey",
            SortField::Country => "country",
            SortField::PublishedAt => "publishedAt",
            SortField::ResultCategory => "resultCategory",
        }
    }

    /// How values of this field compare
    pub fn value_type(&self) -> ValueType {
        match self {
            SortField::ViewCount
            | SortField::LikeCount
            | SortField::AgeYears
            | SortField::ResultCategory => ValueType::Number,
            SortField::NameSortKey | SortField::Country | SortField::PublishedAt => ValueType::String,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortField {
    type Err = RankingError;

    /// Accepts the row keys plus the column keys used by the ranking pages
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "viewCount" => Ok(SortField::ViewCount),
            "likeCount" => Ok(SortField::LikeCount),
            "ageYears" | "age" => Ok(SortField::AgeYears),
            "nameSortKey" | "pianistSortKey" | "name" => Ok(SortField::NameSortKey),
            "country" => Ok(SortField::Country),
            "publishedAt" => Ok(SortField::PublishedAt),
            "resultCategory" | "finalSortCategory" | "finalResult" => Ok(SortField::ResultCategory),
            _ => Err(RankingError::UnknownSortField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(RankingError::UnknownSortDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::String => "string",
        }
    }
}

impl FromStr for ValueType {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "number" | "numeric" => Ok(ValueType::Number),
            "string" | "text" => Ok(ValueType::String),
            _ => Err(RankingError::UnknownValueType(s.to_string())),
        }
    }
}

/// SortSpec - A validated (field, direction, value type) selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
    pub value_type: ValueType,
}

impl SortSpec {
    /// Spec using the field's own value type
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        SortSpec {
            field,
            direction,
            value_type: field.value_type(),
        }
    }

    /// Spec with an explicitly declared value type; a contradiction is a caller bug
    pub fn declared(
        field: SortField,
        direction: SortDirection,
        value_type: ValueType,
    ) -> RankingResult<Self> {
        if field.value_type() != value_type {
            return Err(RankingError::SortTypeMismatch {
                field: field.key(),
                declared: value_type.name(),
                expected: field.value_type().name(),
            });
        }
        Ok(SortSpec {
            field,
            direction,
            value_type,
        })
    }

    /// Parse the string triple a page or CLI hands over (type optional)
    pub fn parse(field: &str, direction: &str, value_type: Option<&str>) -> RankingResult<Self> {
        let field: SortField = field.parse()?;
        let direction: SortDirection = direction.parse()?;
        match value_type {
            Some(value_type) => SortSpec::declared(field, direction, value_type.parse()?),
            None => Ok(SortSpec::new(field, direction)),
        }
    }
}

impl SortSpec {
    /// Overlay optional request parameters on `self`
    ///
    /// No parameters keeps `self` as is. A missing field or direction falls
    /// back to this spec's; the result is validated like [`SortSpec::parse`].
    pub fn overlay(
        &self,
        field: Option<&str>,
        direction: Option<&str>,
        value_type: Option<&str>,
    ) -> RankingResult<Self> {
        if field.is_none() && direction.is_none() && value_type.is_none() {
            return Ok(*self);
        }
        let field = field.unwrap_or(self.field.key());
        let direction = direction
            .map(str::to_string)
            .unwrap_or_else(|| self.direction.to_string());
        SortSpec::parse(field, &direction, value_type)
    }
}

impl Default for SortSpec {
    /// Most viewed first
    fn default() -> Self {
        SortSpec::new(SortField::ViewCount, SortDirection::Desc)
    }
}

// ============================================================================
// MULTI-KEY SORTER
// ============================================================================

pub struct MultiKeySorter;

impl MultiKeySorter {
    /// Return a new, stably ordered copy of `rows`
    pub fn sort(rows: &[RankingRow], spec: &SortSpec) -> Vec<RankingRow> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| Self::compare(a, b, spec));
        sorted
    }

    /// Parse the parameters and sort; unknown keys fail fast
    pub fn sort_by_keys(
        rows: &[RankingRow],
        field: &str,
        direction: &str,
        value_type: Option<&str>,
    ) -> RankingResult<Vec<RankingRow>> {
        let spec = SortSpec::parse(field, direction, value_type)?;
        Ok(Self::sort(rows, &spec))
    }

    pub fn compare(a: &RankingRow, b: &RankingRow, spec: &SortSpec) -> Ordering {
        let dir = spec.direction;

        match spec.field {
            SortField::ViewCount => dir.apply(a.view_count.cmp(&b.view_count)),
            SortField::LikeCount => compare_missing_last(a.like_count, b.like_count, dir),
            SortField::AgeYears => compare_missing_last(a.age_years, b.age_years, dir)
                .then_with(|| dir.apply(a.birth_date.cmp(&b.birth_date))),
            SortField::NameSortKey => dir.apply(collate(&a.name_sort_key, &b.name_sort_key)),
            SortField::Country => dir.apply(collate(&a.country, &b.country)),
            SortField::PublishedAt => dir.apply(a.published_at.cmp(&b.published_at)),
            // Direction flips the whole tuple, never a single slot
            SortField::ResultCategory => dir.apply(
                (a.result_category, a.result_rank_num, a.result_prize_order)
                    .cmp(&(b.result_category, b.result_rank_num, b.result_prize_order))
                    .then_with(|| collate(&a.name_sort_key, &b.name_sort_key)),
            ),
        }
    }
}

/// Absent values are the worst value whatever the direction: they go last
fn compare_missing_last<T: Ord>(a: Option<T>, b: Option<T>, dir: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => dir.apply(a.cmp(&b)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

// ============================================================================
// TESTS
// ============================================================================
