//! Core domain types shared by the search and research crates.

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

/// Project names that are too generic to be a real project.
const GENERIC_PROJECT_WORDS: &[&str] = &["project", "mine", "operation"];

// ---------------------------------------------------------------------------
// ProjectIdentity
// ---------------------------------------------------------------------------

/// The resolved (company, project) pair used to build every query.
///
/// Produced by the name parser, but the user may overwrite either field at
/// any time; edited values are authoritative and never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub company: String,
    pub project: String,
}

impl ProjectIdentity {
    pub fn new(company: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            project: project.into(),
        }
    }

    /// Whether the split looks wrong enough to prompt the user for a correction.
    ///
    /// True when the project is a bare generic keyword or has fewer than two words.
    pub fn looks_misparsed(&self) -> bool {
        let project = self.project.trim();
        let generic = GENERIC_PROJECT_WORDS
            .iter()
            .any(|w| project.eq_ignore_ascii_case(w));
        generic || project.split_whitespace().count() < 2
    }
}

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// One search hit, normalized regardless of which provider produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// SearchFailure
// ---------------------------------------------------------------------------

/// Why a search attempt produced no results.
///
/// The `Display` text is the human-readable reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailure {
    /// The provider has no usable credential.
    #[error("{provider} API key not found in configuration")]
    ConfigMissing { provider: &'static str },

    /// The provider answered with a non-200 status.
    #[error("{provider} API request failed with status {status}")]
    Http { provider: &'static str, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("{provider} search error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// The call was abandoned at its timeout boundary.
    #[error("{provider} search timed out after {}ms", .after.as_millis())]
    Timeout {
        provider: &'static str,
        after: Duration,
    },

    /// A 200 response whose body could not be decoded.
    #[error("{provider} returned an unreadable response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// Every eligible provider failed, or none is configured at all.
    ///
    /// `attempts` holds the individual failures in priority order and is empty
    /// when no provider was configured.
    #[error("no working search provider configured")]
    NoWorkingProvider { attempts: Vec<SearchFailure> },
}

impl SearchFailure {
    /// True when the fix is on the operator's side (credentials), as opposed
    /// to a live search that went wrong.
    pub fn needs_credentials(&self) -> bool {
        match self {
            Self::ConfigMissing { .. } => true,
            Self::NoWorkingProvider { attempts } => attempts
                .iter()
                .all(|a| matches!(a, Self::ConfigMissing { .. })),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOutcome
// ---------------------------------------------------------------------------

/// Result of one provider call or one orchestrated attempt.
///
/// The original query is always preserved, success or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Ok {
        query: String,
        results: Vec<SearchResult>,
    },
    Err {
        query: String,
        #[serde(rename = "reason", serialize_with = "failure_as_reason")]
        failure: SearchFailure,
    },
}

impl SearchOutcome {
    pub fn ok(query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self::Ok {
            query: query.into(),
            results,
        }
    }

    pub fn err(query: impl Into<String>, failure: SearchFailure) -> Self {
        Self::Err {
            query: query.into(),
            failure,
        }
    }

    /// The query exactly as it was submitted.
    pub fn query(&self) -> &str {
        match self {
            Self::Ok { query, .. } | Self::Err { query, .. } => query,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Results of a successful search; empty for failures.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Ok { results, .. } => results,
            Self::Err { .. } => &[],
        }
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        match self {
            Self::Ok { .. } => None,
            Self::Err { failure, .. } => Some(failure),
        }
    }

    /// Human-readable failure reason, if any.
    pub fn reason(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }
}

fn failure_as_reason<S: Serializer>(
    failure: &SearchFailure,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(failure)
}
