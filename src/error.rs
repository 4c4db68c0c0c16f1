use thiserror::Error;

/// Pattern-table configuration errors.
/// These are structural problems and are always fatal: a schema that fails
/// to compile must never be used to score documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A regex in the pattern table failed to compile.
    #[error("invalid pattern for `{category}.{dimension}`: {source}")]
    InvalidPattern {
        category: Box<str>,
        dimension: Box<str>,
        #[source]
        source: Box<regex::Error>,
    },

    /// The pattern table declares no categories at all.
    #[error("pattern schema `{version}` declares no categories")]
    EmptySchema { version: Box<str> },

    /// A category was declared with no dimensions.
    #[error("category `{category}` declares no dimensions")]
    EmptyCategory { category: Box<str> },

    /// A dimension was declared with no patterns at all.
    #[error("dimension `{category}.{dimension}` declares no patterns")]
    EmptyDimension { category: Box<str>, dimension: Box<str> },

    /// Snapshot data was produced under a different schema version.
    #[error("schema version mismatch: data is `{found}`, schema is `{expected}`")]
    SchemaVersionMismatch { expected: Box<str>, found: Box<str> },
}

/// Top-level error type of the profiler.
///
/// Data-quality problems (empty text, missing dimensions) never appear here;
/// they degrade to defined defaults. Only configuration problems and
/// strict-mode coherence rejections are surfaced as errors.
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Strict-mode registration refused a profile with ERROR-level
    /// coherence findings. The caller decides whether to re-register in
    /// lenient mode, discard, or store the profile flagged.
    #[error("profile `{key}` failed coherence validation: {details}")]
    ProfileRejected { key: Box<str>, details: String },
}
