//! List query state: pagination, search, filters and sort for one list page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Result of clicking the `key` column header.
    ///
    /// The active ascending column flips to descending; anything else
    /// (another column, or the active column while descending) sorts
    /// ascending.
    pub fn toggled(current: Option<&SortConfig>, key: &str) -> SortConfig {
        match current {
            Some(active) if active.key == key && active.direction == SortDirection::Asc => {
                SortConfig::new(key, SortDirection::Desc)
            }
            _ => SortConfig::new(key, SortDirection::Asc),
        }
    }
}

/// Pagination, search, filter and sort parameters for a list endpoint.
///
/// Page is always at least 1 and goes back to 1 whenever the search term,
/// a filter or the sort changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    page: u32,
    page_size: u32,
    search: Option<String>,
    filters: BTreeMap<String, String>,
    sort: Option<SortConfig>,
}

impl ListQuery {
    pub fn new(page_size: u32, sort: Option<SortConfig>) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: None,
            filters: BTreeMap::new(),
            sort,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Applies a submitted search term. Blank terms clear the search.
    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self.page = 1;
    }

    /// Sets one filter. A blank value removes it.
    pub fn set_filter(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortConfig>) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn toggle_sort(&mut self, key: &str) {
        let next = SortConfig::toggled(self.sort.as_ref(), key);
        self.set_sort(Some(next));
    }

    /// Query string pairs for the list endpoint.
    ///
    /// `page` and `limit` are always present; search, filters and sort only
    /// when they carry a value.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
        ];

        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }

        if let Some(sort) = &self.sort {
            params.push(("sortBy".to_string(), sort.key.clone()));
            params.push(("sortOrder".to_string(), sort.direction.to_string()));
        }

        for (name, value) in &self.filters {
            params.push((name.clone(), value.clone()));
        }

        params
    }
}
