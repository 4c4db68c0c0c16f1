use std::fmt::{self, Debug};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::profiler::profile::Profile;
use crate::profiler::vector::{CanonicalKeys, FeatureVector};

/// How many divergent dimensions an [`Affinity`] reports.
pub const TOP_DIVERGENCES: usize = 5;

/// Cosine similarity between two equal-layout vectors.
/// cosθ = A・B / (|A||B|)
///
/// Defined as 0.0 when either norm is zero, so degenerate (all-zero)
/// profiles compare as dissimilar instead of producing NaN.
#[inline]
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "vectors must share one canonical layout");

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cognitive distance: `1 - cosine`.
#[inline]
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    1.0 - cosine(a, b)
}

/// Per-canonical-key absolute differences, sorted descending.
/// The sort is stable, so equal deltas keep canonical key order.
pub fn dimension_diffs(keys: &CanonicalKeys, a: &FeatureVector, b: &FeatureVector) -> Vec<(String, f64)> {
    let mut diffs: Vec<(String, f64)> = keys
        .keys()
        .iter()
        .zip(a.as_slice().iter().zip(b.as_slice()))
        .map(|(key, (x, y))| (key.path(), (x - y).abs()))
        .collect();
    diffs.sort_by(|a, b| b.1.total_cmp(&a.1));
    diffs
}

/// Full comparison between two profiles.
#[derive(Debug, Clone, Serialize)]
pub struct Affinity {
    pub key_a: Box<str>,
    pub key_b: Box<str>,
    pub cosine: f64,
    pub distance: f64,
    /// Sub-cosine per canonical category (razonamiento, modalidad, ...).
    pub category_affinity: IndexMap<Box<str>, f64>,
    /// Top divergent dimensions, largest |Δ| first.
    pub divergences: Vec<(String, f64)>,
}

/// Compare two profiles under one canonical layout.
/// Vectors are derived on demand; nothing is cached or mutated.
pub fn compare_profiles(keys: &CanonicalKeys, a: &Profile, b: &Profile) -> Affinity {
    let va = keys.vectorize(a);
    let vb = keys.vectorize(b);

    let mut category_affinity = IndexMap::new();
    for category in keys.categories() {
        let indices = keys.category_indices(category);
        let sub_a: Vec<f64> = indices.iter().map(|&i| va.as_slice()[i]).collect();
        let sub_b: Vec<f64> = indices.iter().map(|&i| vb.as_slice()[i]).collect();
        category_affinity.insert(Box::<str>::from(category), cosine(&sub_a, &sub_b));
    }

    let mut divergences = dimension_diffs(keys, &va, &vb);
    divergences.truncate(TOP_DIVERGENCES);

    Affinity {
        key_a: a.meta().source.clone(),
        key_b: b.meta().source.clone(),
        cosine: cosine(va.as_slice(), vb.as_slice()),
        distance: distance(va.as_slice(), vb.as_slice()),
        category_affinity,
        divergences,
    }
}

/// Structure to store ranked candidates.
pub struct Ranking<K> {
    /// (candidate key, score)
    pub list: Vec<(K, f64)>,
}

impl<K> Ranking<K> {
    pub fn new(list: Vec<(K, f64)>) -> Self {
        Ranking { list }
    }

    /// Sort by descending score.
    /// The sort is stable: candidates with equal scores keep insertion order.
    pub fn sort_by_score_desc(&mut self) -> &mut Self {
        // Remove NaN scores
        self.list.retain(|(_, s)| !s.is_nan());
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1));
        self
    }

    /// Sort by ascending score.
    pub fn sort_by_score_asc(&mut self) -> &mut Self {
        self.list.retain(|(_, s)| !s.is_nan());
        self.list.sort_by(|a, b| a.1.total_cmp(&b.1));
        self
    }

    /// Keep only the best `n` entries.
    pub fn truncate(&mut self, n: usize) -> &mut Self {
        self.list.truncate(n);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, f64)> {
        self.list.iter()
    }
}

impl<K> Debug for Ranking<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // Pretty print with alternate formatting: each entry on a new line
            writeln!(f, "Ranking [")?;
            for (key, score) in &self.list {
                writeln!(f, "    {:?}: {:.6}", key, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// Rank candidates by cosine similarity to a reference profile, descending.
pub fn rank_by_similarity<'a, K>(
    keys: &CanonicalKeys,
    reference: &Profile,
    candidates: impl IntoIterator<Item = (K, &'a Profile)>,
) -> Ranking<K> {
    let ref_vec = keys.vectorize(reference);
    let list: Vec<(K, f64)> = candidates
        .into_iter()
        .map(|(key, profile)| {
            let v = keys.vectorize(profile);
            (key, cosine(ref_vec.as_slice(), v.as_slice()))
        })
        .collect();
    let mut ranking = Ranking::new(list);
    ranking.sort_by_score_desc();
    ranking
}

/// Full pairwise similarity matrix, unit diagonal.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityMatrix<K> {
    pub keys: Vec<K>,
    pub values: Vec<Vec<f64>>,
}

/// Compute the pairwise cosine matrix over a set of profiles.
/// Rows run in parallel; cosine is exactly symmetric, so both triangles
/// agree bit for bit.
pub fn similarity_matrix<K>(keys: &CanonicalKeys, profiles: &[(K, &Profile)]) -> SimilarityMatrix<K>
where
    K: Clone + Send + Sync,
{
    let vectors: Vec<FeatureVector> = profiles.iter().map(|(_, p)| keys.vectorize(p)).collect();
    let values: Vec<Vec<f64>> = (0..vectors.len())
        .into_par_iter()
        .map(|i| {
            (0..vectors.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        cosine(vectors[i].as_slice(), vectors[j].as_slice())
                    }
                })
                .collect()
        })
        .collect();

    SimilarityMatrix {
        keys: profiles.iter().map(|(k, _)| k.clone()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::profile::ProfileMeta;
    use crate::profiler::schema::PatternSchema;
    use crate::profiler::score::DefaultScoreEngine;

    fn profile(source: &str, text: &str) -> Profile {
        let schema = PatternSchema::builtin_v2();
        Profile::build::<DefaultScoreEngine>(&schema, ProfileMeta::new(source, schema.version()), text)
    }

    fn marker_only_profile(source: &str, entries: &str) -> Profile {
        let json = format!(
            r#"{{
                "meta": {{ "source": "{source}", "author": null,
                          "timestamp": "2025-11-09T00:00:00Z", "schema_version": "v2" }},
                "categories": {{ "marcadores_cognitivos": {{ {entries} }} }},
                "dominantes": {{}}
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn cosine_of_a_nonzero_vector_with_itself_is_one() {
        let v = [0.2, 0.0, 0.7, 1.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_is_symmetric_and_distance_is_its_complement() {
        let a = [0.9, 0.1, 0.0, 0.5];
        let b = [0.2, 0.8, 0.3, 0.0];
        assert_eq!(cosine(&a, &b).to_bits(), cosine(&b, &a).to_bits());
        assert_eq!(distance(&a, &b), 1.0 - cosine(&a, &b));
    }

    #[test]
    fn zero_norm_cosine_is_zero_never_nan() {
        let zero = [0.0; 4];
        let v = [0.3, 0.3, 0.3, 0.3];
        assert_eq!(cosine(&zero, &v), 0.0);
        assert_eq!(cosine(&zero, &zero), 0.0);
        assert!(!distance(&zero, &v).is_nan());
    }

    #[test]
    fn single_dimension_gap_of_one_ranks_first_in_diffs() {
        let keys = CanonicalKeys::v2();
        let a = marker_only_profile("a", r#""empirismo": 1.0"#);
        let b = marker_only_profile("b", "");
        let diffs = dimension_diffs(&keys, &keys.vectorize(&a), &keys.vectorize(&b));

        assert_eq!(diffs[0].0, "marcadores_cognitivos.empirismo");
        assert_eq!(diffs[0].1, 1.0);
        assert!(diffs[1..].iter().all(|(_, d)| *d == 0.0));
    }

    #[test]
    fn equal_diffs_keep_canonical_key_order() {
        let keys = CanonicalKeys::v2();
        let p = profile("p", "");
        let diffs = dimension_diffs(&keys, &keys.vectorize(&p), &keys.vectorize(&p));
        let paths: Vec<&str> = diffs.iter().map(|(p, _)| p.as_str()).collect();
        let canonical: Vec<String> = keys.keys().iter().map(|k| k.path()).collect();
        assert_eq!(paths, canonical.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn compare_profiles_reports_categories_and_top_divergences() {
        let keys = CanonicalKeys::v2();
        let a = profile("doc-a", "Por tanto, sostiene la doctrina que el principio rige, porque los datos lo avalan.");
        let b = profile("doc-b", "Probablemente podría parecer que el relato, luego, finalmente narra otra cosa.");
        let affinity = compare_profiles(&keys, &a, &b);

        assert_eq!(&*affinity.key_a, "doc-a");
        assert_eq!(&*affinity.key_b, "doc-b");
        assert_eq!(affinity.category_affinity.len(), 5);
        assert_eq!(affinity.divergences.len(), TOP_DIVERGENCES);
        assert_eq!(affinity.distance, 1.0 - affinity.cosine);

        let self_affinity = compare_profiles(&keys, &a, &a);
        assert!((self_affinity.cosine - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_descending_and_ties_keep_insertion_order() {
        let keys = CanonicalKeys::v2();
        let reference = marker_only_profile("ref", r#""empirismo": 1.0"#);
        let twin_1 = marker_only_profile("twin-1", r#""empirismo": 0.5"#);
        let twin_2 = marker_only_profile("twin-2", r#""empirismo": 0.5"#);
        let far = marker_only_profile("far", r#""dogmatismo": 1.0"#);

        let ranking = rank_by_similarity(
            &keys,
            &reference,
            [("twin-1", &twin_1), ("far", &far), ("twin-2", &twin_2)],
        );
        let order: Vec<&str> = ranking.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec!["twin-1", "twin-2", "far"]);
        assert!(ranking.list[0].1 >= ranking.list[1].1);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let keys = CanonicalKeys::v2();
        let a = profile("a", "Por tanto, el principio rige.");
        let b = profile("b", "Probablemente el relato narra.");
        let c = profile("c", "");
        let matrix = similarity_matrix(&keys, &[("a", &a), ("b", &b), ("c", &c)]);

        assert_eq!(matrix.keys, vec!["a", "b", "c"]);
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(matrix.values[i][j].to_bits(), matrix.values[j][i].to_bits());
            }
        }
    }
}
