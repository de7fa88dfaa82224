use crate::api::{MovieQuery, SortField, SortOrder};

/// The active filter set of the feed.
///
/// All filtering and sorting happens on the server; this only describes
/// what to ask for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedFilters {
    /// `None` means all genres.
    pub genre: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    /// Raw search text as typed. Lowercased when a query is built.
    pub search: String,
}

impl FeedFilters {
    /// Filters with no genre or search and the given sort.
    pub fn with_sort(sort: SortField, order: SortOrder) -> Self {
        Self {
            genre: None,
            sort,
            order,
            search: String::new(),
        }
    }

    /// Build the list query for `page`.
    pub fn to_query(&self, page: u32) -> MovieQuery {
        MovieQuery {
            page,
            genre: self.genre.clone(),
            sort: self.sort,
            order: self.order,
            search: self.search.to_lowercase(),
        }
    }
}
