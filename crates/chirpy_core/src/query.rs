//! Chirp listing filters.

/// Ordering of a chirp listing by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest id first.
    #[default]
    Ascending,
    /// Highest id first.
    Descending,
}

impl SortOrder {
    /// Parses a `sort` request parameter.
    ///
    /// Only `"desc"` selects descending order; anything else, including a
    /// missing parameter, is ascending.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }
}

/// Which chirps to list and in what order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChirpQuery {
    /// Only chirps by this author, if set.
    pub author_id: Option<u64>,
    /// Order of the result.
    pub order: SortOrder,
}

impl ChirpQuery {
    /// Every chirp, ascending.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the listing to one author.
    #[must_use]
    pub const fn by_author(mut self, author_id: u64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Sets the result order.
    #[must_use]
    pub const fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub(crate) fn matches(&self, author_id: u64) -> bool {
        self.author_id.map_or(true, |wanted| wanted == author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_param() {
        assert_eq!(SortOrder::from_param(Some("desc")), SortOrder::Descending);
        assert_eq!(SortOrder::from_param(Some("asc")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_param(Some("DESC")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_param(None), SortOrder::Ascending);
    }

    #[test]
    fn author_filter() {
        let query = ChirpQuery::all().by_author(4);
        assert!(query.matches(4));
        assert!(!query.matches(5));
        assert!(ChirpQuery::all().matches(5));
    }
}
