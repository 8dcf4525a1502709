//! Configuration options for reconciliation calls.

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};
use crate::fuzzy::{Scorer, SearchMode};
use crate::tiebreak::TieBreak;

/// Default separator of aggregated synonym cells.
pub const DEFAULT_DELIMITER: &str = "|";

/// Options for [`Validator::inspect`](crate::Validator::inspect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectOptions {
    /// Compare values exactly (default) or upper-case both sides.
    pub case_sensitive: bool,
    /// When set, unmatched queries known as synonyms are counted so callers
    /// can suggest standardization. Matching itself stays strict.
    pub synonyms_field: Option<String>,
    pub delimiter: String,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            synonyms_field: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl InspectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_synonyms(mut self, field: impl Into<String>) -> Self {
        self.synonyms_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

/// Options for [`Standardizer::standardize`](crate::Standardizer::standardize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizeOptions {
    /// Column of aggregated alternate names; `None` disables the synonym pass.
    pub synonyms_field: Option<String>,
    /// Column reported for matched rows instead of the target field.
    pub return_field: Option<String>,
    pub case_sensitive: bool,
    pub delimiter: String,
    /// Policy applied when a synonym is claimed by several rows.
    pub tie_break: TieBreak,
}

impl Default for StandardizeOptions {
    fn default() -> Self {
        Self {
            synonyms_field: None,
            return_field: None,
            case_sensitive: true,
            delimiter: DEFAULT_DELIMITER.to_string(),
            tie_break: TieBreak::default(),
        }
    }
}

impl StandardizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_synonyms(mut self, field: impl Into<String>) -> Self {
        self.synonyms_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_return_field(mut self, field: impl Into<String>) -> Self {
        self.return_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Options for [`FuzzyMatcher::search`](crate::FuzzyMatcher::search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Include expanded synonyms in the candidate pool.
    pub synonyms_field: Option<String>,
    /// Fold case before scoring unless set (default: fold).
    pub case_sensitive: bool,
    pub mode: SearchMode,
    pub scorer: Scorer,
    /// Drop rows scoring below this value (0-100).
    pub min_score: Option<f64>,
    pub delimiter: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            synonyms_field: None,
            case_sensitive: false,
            mode: SearchMode::default(),
            scorer: Scorer::default(),
            min_score: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_synonyms(mut self, field: impl Into<String>) -> Self {
        self.synonyms_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.mode = SearchMode::Ranked { limit: Some(limit) };
        self
    }

    /// Return every row tied at the best score.
    #[must_use]
    pub fn best_match(mut self) -> Self {
        self.mode = SearchMode::Best;
        self
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

pub(crate) fn check_delimiter(delimiter: &str) -> Result<()> {
    if delimiter.is_empty() {
        return Err(ReconcileError::InvalidOption(
            "synonym delimiter must not be empty".to_string(),
        ));
    }
    Ok(())
}
