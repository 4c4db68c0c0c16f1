/// This crate is a Cognitive Profile Engine for legal-document analysis.
pub mod error;
pub mod profiler;

/// Profile Analyzer
/// The top-level struct of this crate, providing the main profiling
/// features. It scores raw text against a versioned pattern schema,
/// assembles nested cognitive profiles and supports similarity computation,
/// ranking and pattern search over a profile collection.
///
/// Internally, it holds:
/// - A shared pattern schema reference
/// - The registered profiles, insertion-ordered
/// - The canonical vector layout
/// - The coherence validator used as a registration gate
///
/// `ProfileAnalyzer<E>` has the following generic parameter:
/// - `E`: Score engine type (e.g., DefaultScoreEngine)
///
/// When creating an instance, you must pass a schema reference as
/// `Arc<PatternSchema>`. The schema can be replaced, and can be shared
/// among multiple `ProfileAnalyzer` instances.
///
/// # Serialization
/// Supported. The schema reference is excluded; use `AnalyzerData` for
/// deserialization.
pub use profiler::ProfileAnalyzer;

/// Profile Analyzer Data Structure for Serialization
/// This struct provides a serializable data structure that does not hold a
/// schema reference (unlike `ProfileAnalyzer`).
/// You can convert it into `ProfileAnalyzer` by passing an
/// `Arc<PatternSchema>` via `into_analyzer`; the stored schema version must
/// match the schema you attach.
pub use profiler::serde::AnalyzerData;

/// Pattern Schema
/// Immutable, versioned regex pattern tables. Compiled once from a
/// `RawSchema` (malformed patterns fail here, never per document) and then
/// shared behind an `Arc` by every analyzer scoring against it.
/// `PatternSchema::builtin_v2()` provides the built-in tables for
/// Spanish-language legal writing.
pub use profiler::schema::{PatternSchema, RawSchema};

/// Cognitive Profile structure
/// Nested category → dimension → score mapping of one text, plus a `meta`
/// block and the per-category dominant dimensions. Structurally complete
/// against its schema: a dimension with zero matches is recorded as 0.0,
/// never omitted. Immutable once built.
pub use profiler::profile::{Profile, ProfileMeta};

/// Score Engine Trait
/// A trait that defines the behavior of a pattern-scoring engine.
///
/// By implementing this trait, you can plug different scoring strategies
/// into `ProfileAnalyzer<E>`. A default implementation,
/// `DefaultScoreEngine`, is provided and performs bucket-density scoring
/// normalized to [0,1].
pub use profiler::score::{DefaultScoreEngine, ScoreEngine};

/// Canonical Keys and Feature Vector
/// `CanonicalKeys` is the versioned, ordered list of dotted paths that
/// fixes the vector layout; `FeatureVector` is the flattened profile under
/// that layout. Vectors built from the same key list are always
/// index-comparable; missing dimensions are zero-filled.
pub use profiler::vector::{CanonicalKeys, FeatureVector};

/// Affinity and Ranking structures
/// Data structures for comparison results.
/// - `Affinity`: full two-profile comparison (cosine, distance,
///   per-category breakdown, top divergent dimensions)
/// - `Ranking`: ordered candidate list with score sorting helpers
/// - `SimilarityMatrix`: full pairwise cosine matrix
pub use profiler::evaluate::compare::{Affinity, Ranking, SimilarityMatrix};

/// Trait Pattern Query
/// Represents a partial thought-pattern search: the dimensions a caller
/// cares about with their target values. Comparison is restricted to those
/// dimensions only.
pub use profiler::evaluate::pattern_query::TraitPattern;

/// Coherence Validation
/// Stateless pipeline of cross-dimension checks (antagonistic and weakly
/// correlated marker pairs) with strict/lenient gating and the computed
/// global-coherence score.
pub use profiler::validate::{
    CoherenceThresholds, CoherenceValidator, Severity, ValidationMode, ValidationReport,
    ValidationResult,
};

/// Error types
/// `ConfigError` covers fatal pattern-table problems; `ProfilerError` adds
/// strict-mode profile rejection. Data-quality issues (empty text, missing
/// dimensions) never raise: they degrade to defined defaults.
pub use error::{ConfigError, ProfilerError};
