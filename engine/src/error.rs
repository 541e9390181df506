use thiserror::Error;

use crate::content::Category;

/// Content-authoring problems found while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {table} content: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{category} table is missing an entry for `{key}`")]
    MissingEntry { category: Category, key: String },
    #[error("duplicate {table} id `{id}`")]
    DuplicateId { table: &'static str, id: String },
    #[error("{from} references unknown {kind} `{target}`")]
    DanglingReference { from: String, kind: &'static str, target: String },
    #[error("encounter `{encounter}` choice `{choice}`: {problem}")]
    MalformedChoice { encounter: String, choice: String, problem: &'static str },
    #[error("{from}: {problem}")]
    InvalidValue { from: String, problem: &'static str },
    #[error("no {category} entry for `{key}`")]
    NotFound { category: Category, key: String },
}

/// Misuse of the encounter resolver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("encounter `{encounter}` has no choice `{choice}`")]
    UnknownChoice { encounter: String, choice: String },
    #[error("choice `{choice}` requires a dice roll before it can be resolved")]
    RollRequired { choice: String },
    #[error("choice `{choice}` needs a roll made against a DC")]
    RollWithoutVerdict { choice: String },
    #[error("choice `{choice}` has no `{branch}` outcome")]
    MissingBranch { choice: String, branch: &'static str },
}

/// Character creation rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreationError {
    #[error("character name must not be blank")]
    BlankName,
    #[error("{attribute} must be between {min} and {max}, got {value}")]
    AttributeOutOfRange { attribute: &'static str, value: i32, min: i32, max: i32 },
    #[error("attributes spend {spent} points but only {budget} are available")]
    OverBudget { spent: i32, budget: i32 },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save blob is stored under `{found}`, expected `{expected}`")]
    WrongKey { found: String, expected: &'static str },
    #[error("save version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("save blob shape is invalid: {0}")]
    Shape(&'static str),
}
