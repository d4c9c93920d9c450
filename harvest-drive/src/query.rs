//! Listing filter options and Drive query-language construction

/// Filter options for a listing call.
///
/// An empty query (no folder, no MIME filter, trash excluded by default)
/// produces no filter clause and lists everything the credential can see.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Restrict results to direct children of this folder
    pub folder_id: Option<String>,
    /// Restrict results to these MIME types (insertion order is preserved)
    pub mime_types: Option<Vec<String>>,
    /// Include trashed files (default: false)
    pub include_trashed: bool,
    /// Stop after this many results
    pub max_results: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn with_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime_types = Some(mime_types.into_iter().map(Into::into).collect());
        self
    }

    pub fn include_trashed(mut self, include: bool) -> Self {
        self.include_trashed = include;
        self
    }

    pub fn max_results(mut self, cap: usize) -> Self {
        self.max_results = Some(cap);
        self
    }

    /// Translate the filter options into a Drive query-language string.
    ///
    /// Clause order is fixed: folder scope, then the parenthesized MIME
    /// disjunction (in insertion order), then trash exclusion; present
    /// clauses are joined with `and`. Zero clauses yields `None` ("no
    /// filter"), which is distinct from an empty-string query. An empty MIME
    /// list is treated as no filter, not an error.
    pub fn to_drive_query(&self) -> Option<String> {
        let mut clauses: Vec<String> = Vec::new();

        if let Some(ref folder_id) = self.folder_id {
            clauses.push(format!("'{}' in parents", folder_id));
        }

        if let Some(ref mime_types) = self.mime_types {
            if !mime_types.is_empty() {
                let disjunction = mime_types
                    .iter()
                    .map(|mt| format!("mimeType='{}'", mt))
                    .collect::<Vec<_>>()
                    .join(" or ");
                clauses.push(format!("({})", disjunction));
            }
        }

        if !self.include_trashed {
            clauses.push("trashed=false".to_string());
        }

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" and "))
        }
    }
}
