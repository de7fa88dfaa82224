use crate::api::MovieSummary;

/// Distance from the content bottom at which the next page is requested.
pub const DEFAULT_SCROLL_THRESHOLD: usize = 100;

/// Ordered list of movies shown by the feed.
///
/// Append-only between resets. Items are kept in the order the server
/// returned them, page after page.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    movies: Vec<MovieSummary>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.movies.clear();
    }

    pub fn append(&mut self, movies: impl IntoIterator<Item = MovieSummary>) {
        self.movies.extend(movies);
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MovieSummary> {
        self.movies.get(index)
    }

    pub fn as_slice(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieSummary> {
        self.movies.iter()
    }
}

/// Where the viewport sits within the rendered content, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPosition {
    /// First visible row.
    pub offset: usize,
    /// Number of visible rows.
    pub viewport: usize,
    /// Total rows of rendered content.
    pub content: usize,
}

impl ScrollPosition {
    /// `offset + viewport >= content - threshold`
    pub fn is_near_bottom(&self, threshold: usize) -> bool {
        self.offset.saturating_add(self.viewport) >= self.content.saturating_sub(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> MovieSummary {
        MovieSummary {
            id,
            name: format!("Movie {id}"),
            director: "Someone".into(),
            popularity: 50.0,
            imdb_score: 7.0,
            genres: vec![],
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut list = DisplayList::new();
        list.append(vec![movie(3), movie(1)]);
        list.append(vec![movie(2)]);
        let ids: Vec<i64> = list.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_near_bottom_threshold() {
        let pos = ScrollPosition {
            offset: 0,
            viewport: 40,
            content: 200,
        };
        assert!(!pos.is_near_bottom(DEFAULT_SCROLL_THRESHOLD));

        let pos = ScrollPosition {
            offset: 60,
            viewport: 40,
            content: 200,
        };
        assert!(pos.is_near_bottom(DEFAULT_SCROLL_THRESHOLD));
    }

    #[test]
    fn test_short_content_is_always_near_bottom() {
        let pos = ScrollPosition {
            offset: 0,
            viewport: 30,
            content: 12,
        };
        assert!(pos.is_near_bottom(0));
        assert!(ScrollPosition::default().is_near_bottom(DEFAULT_SCROLL_THRESHOLD));
    }
}
