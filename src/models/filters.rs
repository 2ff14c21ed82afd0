// src/models/filters.rs

use crate::utils::validator::{Validator, permitted_value};

/// Columns a listing may be ordered by.
/// Only these identifiers are ever interpolated into an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Difficulty,
}

impl SortColumn {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "difficulty" => Some(Self::Difficulty),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Difficulty => "difficulty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sorting and pagination taken from the query string.
#[derive(Debug, Clone)]
pub struct Filters {
    pub sort: String,
    pub page: i64,
    pub page_size: i64,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Resolves the safelisted sort value to its column.
    ///
    /// Panics when the value is not safelisted: that means `validate_filters`
    /// was skipped and the request must not reach the store.
    pub fn sort_column(&self) -> SortColumn {
        if permitted_value(&self.sort, self.sort_safelist) {
            if let Some(column) = SortColumn::from_name(self.sort.trim_start_matches('-')) {
                return column;
            }
        }
        panic!("unsafe sort parameter: {}", self.sort);
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Page numbers start at 1; page 0 is read as the first page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.page_size
    }
}

pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(!permitted_value(&f.sort, f.sort_safelist), "sort", "invalid sort value");

    v.check(f.page < 0, "page", "must be greater than zero");
    v.check(f.page > 10_000_000, "page", "must be a maximum of 10 million");
    v.check(f.page_size < 0, "page_size", "must be greater than zero");
    v.check(f.page_size > 100, "page_size", "must be a maximum of 100");
}
