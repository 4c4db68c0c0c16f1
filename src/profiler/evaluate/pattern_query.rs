use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::profiler::evaluate::compare::{cosine, Ranking};
use crate::profiler::profile::Profile;
use crate::profiler::vector::{CanonicalKeys, FeatureKey};

/// Partial thought-pattern query: the dimensions a caller cares about,
/// with the values they are looking for.
///
/// Targets may be bare dimension names (`"teleologico"`) or full dotted
/// paths (`"cognicion.razonamiento_formal.teleologico"`). A bare name
/// matches every canonical key ending in it, so `"dialectico"` addresses
/// both the reasoning and the epistemic dimension of that name.
///
/// # Examples
/// ```
/// use cognitive_profiler::profiler::evaluate::pattern_query::TraitPattern;
/// let pattern = TraitPattern::new()
///     .with("teleologico", 0.8)
///     .with("ensayistico", 0.7)
///     .with("creatividad", 0.6);
/// assert_eq!(pattern.len(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitPattern {
    targets: IndexMap<Box<str>, f64>,
}

impl TraitPattern {
    pub fn new() -> Self {
        Self {
            targets: IndexMap::new(),
        }
    }

    /// 次元と目標値を追加します
    ///
    /// # Arguments
    /// * `dimension` - 次元名 (ドット区切りのフルパスも可)
    /// * `value` - 目標値 (0.0~1.0)
    pub fn with(mut self, dimension: impl Into<Box<str>>, value: f64) -> Self {
        self.targets.insert(dimension.into(), value);
        self
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            targets: pairs.into_iter().map(|(k, v)| (Box::<str>::from(k), v)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[inline]
    pub fn targets(&self) -> &IndexMap<Box<str>, f64> {
        &self.targets
    }

    /// Target value for a canonical key, full path first, bare name second.
    fn target_for(&self, key: &FeatureKey) -> Option<f64> {
        if let Some(&v) = self.targets.get(key.path().as_str()) {
            return Some(v);
        }
        self.targets.get(key.dimension()).copied()
    }
}

/// Search candidates whose profile matches a partial thought pattern.
///
/// The comparison is restricted to the canonical keys the pattern names;
/// every other dimension is ignored. Candidates scoring at or above
/// `threshold` are returned in descending order (stable on ties).
/// A pattern that names no canonical key yields an empty ranking.
pub fn search_by_pattern<'a, K>(
    keys: &CanonicalKeys,
    pattern: &TraitPattern,
    candidates: impl IntoIterator<Item = (K, &'a Profile)>,
    threshold: f64,
) -> Ranking<K> {
    // 照合対象のインデックスと目標値を先に確定する
    let mask: Vec<(usize, f64)> = keys
        .keys()
        .iter()
        .enumerate()
        .filter_map(|(i, key)| pattern.target_for(key).map(|target| (i, target)))
        .collect();

    if mask.is_empty() {
        return Ranking::new(Vec::new());
    }

    let target_vec: Vec<f64> = mask.iter().map(|(_, t)| *t).collect();
    let list: Vec<(K, f64)> = candidates
        .into_iter()
        .filter_map(|(key, profile)| {
            let full = keys.vectorize(profile);
            let masked: Vec<f64> = mask.iter().map(|(i, _)| full.as_slice()[*i]).collect();
            let score = cosine(&target_vec, &masked);
            (score >= threshold).then_some((key, score))
        })
        .collect();

    let mut ranking = Ranking::new(list);
    ranking.sort_by_score_desc();
    ranking
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

    #[test]
    fn search_compares_only_the_named_dimensions() {
        let keys = CanonicalKeys::v2();
        // creativo puro frente a dogmático puro: difieren en todo lo demás
        let creativo = profile("creativo", "Propongo una reinterpretación novedosa. Propongo algo innovador.");
        let dogmatico = profile("dogmatico", "Es indudable e inequívoco, sin lugar a dudas.");

        let pattern = TraitPattern::new().with("creatividad", 0.9);
        let hits = search_by_pattern(&keys, &pattern, [("creativo", &creativo), ("dogmatico", &dogmatico)], 0.7);

        let found: Vec<&str> = hits.iter().map(|(k, _)| *k).collect();
        assert_eq!(found, vec!["creativo"]);
        assert!((hits.list[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn threshold_filters_candidates_below_it() {
        let keys = CanonicalKeys::v2();
        let creativo = profile("creativo", "Propongo una reinterpretación novedosa.");
        let vacio = profile("vacio", "");

        let pattern = TraitPattern::new().with("creatividad", 1.0);
        let hits = search_by_pattern(&keys, &pattern, [("creativo", &creativo), ("vacio", &vacio)], 0.5);
        assert_eq!(hits.len(), 1);

        let all = search_by_pattern(&keys, &pattern, [("creativo", &creativo), ("vacio", &vacio)], 0.0);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn bare_name_matches_every_category_full_path_just_one() {
        let keys = CanonicalKeys::v2();
        // "dialectico" existe en razonamiento y en modalidad epistémica
        let bare_mask: usize = keys
            .keys()
            .iter()
            .filter(|k| k.dimension() == "dialectico")
            .count();
        assert_eq!(bare_mask, 2);

        let p = profile("p", "Es discutible y opinable, probable y verosímil.");

        // con el nombre suelto entran ambas dimensiones al coseno enmascarado
        let bare = TraitPattern::new().with("dialectico", 0.8);
        let hits = search_by_pattern(&keys, &bare, [("p", &p)], 0.0);
        assert_eq!(hits.len(), 1);
        assert!(hits.list[0].1 < 1.0 - 1e-9);

        let scoped = TraitPattern::new().with("cognicion.modalidad_epistemica.dialectico", 0.8);
        let hits = search_by_pattern(&keys, &scoped, [("p", &p)], 0.0);
        assert_eq!(hits.len(), 1);
        // la dimensión de modalidad puntúa, así que el coseno enmascarado es 1
        assert!((hits.list[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pattern_naming_no_canonical_key_yields_empty_ranking() {
        let keys = CanonicalKeys::v2();
        let p = profile("p", "Por tanto procede.");
        let pattern = TraitPattern::new().with("dimension_inexistente", 0.9);
        let hits = search_by_pattern(&keys, &pattern, [("p", &p)], 0.0);
        assert!(hits.is_empty());
    }
}
