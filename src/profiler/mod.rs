pub mod schema;
pub mod score;
pub mod profile;
pub mod vector;
pub mod evaluate;
pub mod validate;
pub mod serde;

use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::error::ProfilerError;
use crate::profiler::evaluate::compare::{compare_profiles, rank_by_similarity, similarity_matrix, Affinity, Ranking, SimilarityMatrix};
use crate::profiler::evaluate::pattern_query::{search_by_pattern, TraitPattern};
use crate::profiler::profile::{Profile, ProfileMeta};
use crate::profiler::schema::PatternSchema;
use crate::profiler::score::{DefaultScoreEngine, ScoreEngine};
use crate::profiler::validate::{CoherenceValidator, ValidationReport};
use crate::profiler::vector::{CanonicalKeys, FeatureVector};

#[derive(Debug, Clone)]
pub struct ProfileAnalyzer<E = DefaultScoreEngine>
where
    E: ScoreEngine,
{
    /// Registered profiles, insertion-ordered (source id → profile)
    profiles: IndexMap<Box<str>, Profile>,
    /// Pattern schema reference
    schema_ref: Arc<PatternSchema>,
    /// Canonical vector layout
    canonical: CanonicalKeys,
    /// Coherence gate used by `register`
    validator: CoherenceValidator,
    _marker: PhantomData<E>,
}

impl<E> ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// Create a new ProfileAnalyzer instance
    /// バリデーションはデフォルトでレポートのみ (lenient)
    pub fn new(schema_ref: Arc<PatternSchema>) -> Self {
        Self {
            profiles: IndexMap::new(),
            schema_ref,
            canonical: CanonicalKeys::v2(),
            validator: CoherenceValidator::lenient(),
            _marker: PhantomData,
        }
    }

    /// Strict coherence gating: `register` refuses ERROR-level profiles.
    pub fn strict(mut self) -> Self {
        self.validator = CoherenceValidator::strict();
        self
    }

    /// Swap the coherence validator (mode and thresholds).
    pub fn with_validator(mut self, validator: CoherenceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Swap the canonical vector layout.
    pub fn with_canonical_keys(mut self, canonical: CanonicalKeys) -> Self {
        self.canonical = canonical;
        self
    }

    /// set schema reference
    /// 既存のプロファイルは再解析されません
    pub fn set_schema_ref(&mut self, schema_ref: Arc<PatternSchema>) {
        self.schema_ref = schema_ref;
    }

    #[inline]
    pub fn schema(&self) -> &PatternSchema {
        &self.schema_ref
    }

    #[inline]
    pub fn canonical_keys(&self) -> &CanonicalKeys {
        &self.canonical
    }

    #[inline]
    pub fn validator(&self) -> &CoherenceValidator {
        &self.validator
    }
}

/// Analysis: pure, synchronous, deterministic over immutable inputs.
impl<E> ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// Build the cognitive profile of one text.
    /// Degenerate input (empty text) yields an all-zero profile, not an
    /// error, so one bad document never takes down a batch.
    pub fn analyze(&self, source: impl Into<Box<str>>, text: &str) -> Profile {
        let meta = ProfileMeta::new(source, self.schema_ref.version());
        debug!(source = meta.source.as_ref(), chars = text.len(), "building profile");
        Profile::build::<E>(&self.schema_ref, meta, text)
    }

    /// Build a profile with an author label attached.
    pub fn analyze_as(&self, source: impl Into<Box<str>>, author: impl Into<Box<str>>, text: &str) -> Profile {
        let meta = ProfileMeta::new(source, self.schema_ref.version()).with_author(author);
        Profile::build::<E>(&self.schema_ref, meta, text)
    }

    /// Analyze a batch of documents in parallel.
    /// Output order matches input order; documents are fully independent,
    /// so no synchronization beyond collecting results is involved.
    pub fn analyze_batch<S, T>(&self, docs: &[(S, T)]) -> Vec<Profile>
    where
        S: AsRef<str> + Sync,
        T: AsRef<str> + Sync,
        E: Sync,
    {
        docs.par_iter()
            .map(|(source, text)| self.analyze(source.as_ref(), text.as_ref()))
            .collect()
    }
}

/// Collection management, in the manner of a document index.
impl<E> ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// Register a profile behind the coherence gate.
    ///
    /// In strict mode, ERROR-level findings refuse the profile and nothing
    /// is stored; the caller decides whether to discard it, downgrade the
    /// validator, or store it flagged elsewhere. In lenient mode the report
    /// is returned and the profile is stored regardless.
    pub fn register(&mut self, profile: Profile) -> Result<ValidationReport, ProfilerError> {
        let report = self.validator.validate_all(&profile);
        if !report.is_valid() {
            let details = report
                .errors()
                .map(|r| r.message.as_str())
                .collect::<Vec<&str>>()
                .join("; ");
            return Err(ProfilerError::ProfileRejected {
                key: profile.meta().source.clone(),
                details,
            });
        }
        self.insert(profile);
        Ok(report)
    }

    /// Insert a profile without validation.
    /// A profile with the same source id replaces the previous one.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.meta().source.clone(), profile);
    }

    /// Remove a profile, preserving the insertion order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Profile> {
        self.profiles.shift_remove(key)
    }

    /// Get a registered profile by source id.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Profile> {
        self.profiles.get(key)
    }

    /// Check if a profile with the given source id exists.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.profiles.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(k, p)| (k.as_ref(), p))
    }
}

/// Derived views: vectors, comparisons, rankings, searches.
impl<E> ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// Feature vector of a registered profile.
    pub fn vectorize(&self, key: &str) -> Option<FeatureVector> {
        self.profiles.get(key).map(|p| self.canonical.vectorize(p))
    }

    /// Run the coherence pipeline over a registered profile.
    pub fn validate(&self, key: &str) -> Option<ValidationReport> {
        self.profiles.get(key).map(|p| self.validator.validate_all(p))
    }

    /// Full comparison between two registered profiles.
    pub fn compare(&self, key_a: &str, key_b: &str) -> Option<Affinity> {
        let a = self.profiles.get(key_a)?;
        let b = self.profiles.get(key_b)?;
        Some(compare_profiles(&self.canonical, a, b))
    }

    /// Rank every other registered profile by similarity to a reference.
    pub fn rank_against(&self, key: &str) -> Option<Ranking<Box<str>>> {
        let reference = self.profiles.get(key)?;
        let candidates = self
            .profiles
            .iter()
            .filter(|(k, _)| k.as_ref() != key)
            .map(|(k, p)| (k.clone(), p));
        Some(rank_by_similarity(&self.canonical, reference, candidates))
    }

    /// Search registered profiles by a partial thought pattern.
    pub fn search(&self, pattern: &TraitPattern, threshold: f64) -> Ranking<Box<str>> {
        let candidates = self.profiles.iter().map(|(k, p)| (k.clone(), p));
        search_by_pattern(&self.canonical, pattern, candidates, threshold)
    }

    /// Pairwise similarity matrix over every registered profile.
    pub fn matrix(&self) -> SimilarityMatrix<Box<str>> {
        let entries: Vec<(Box<str>, &Profile)> =
            self.profiles.iter().map(|(k, p)| (k.clone(), p)).collect();
        similarity_matrix(&self.canonical, &entries)
    }
}
