/// Label of the catch-all option at the top of the genre selector.
pub const ALL_GENRES: &str = "All Genres";

/// One entry of the genre selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOption {
    pub label: String,
    /// Value sent as the `genre` filter. `None` for "All Genres".
    pub value: Option<String>,
}

/// Options of the genre filter control.
///
/// Always starts with "All Genres", followed by the server's genres in the
/// order they were returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOptions {
    options: Vec<GenreOption>,
}

impl Default for GenreOptions {
    fn default() -> Self {
        Self {
            options: vec![GenreOption {
                label: ALL_GENRES.to_string(),
                value: None,
            }],
        }
    }
}

impl GenreOptions {
    pub fn from_genres(genres: impl IntoIterator<Item = String>) -> Self {
        let mut options = Self::default();
        options
            .options
            .extend(genres.into_iter().filter(|g| !g.trim().is_empty()).map(|g| {
                GenreOption {
                    label: g.clone(),
                    value: Some(g),
                }
            }));
        options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GenreOption> {
        self.options.get(index)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.label.as_str())
    }

    /// Index of the option whose value equals `genre`, if any.
    pub fn position_of(&self, genre: Option<&str>) -> Option<usize> {
        self.options.iter().position(|o| o.value.as_deref() == genre)
    }
}
