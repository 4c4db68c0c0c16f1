use indexmap::IndexMap;
use regex::Regex;

use crate::profiler::schema::{marker, CategorySpec, MarkerPatterns, ScoreMode};

/// Normalization bucket for density scoring, in characters.
/// A match count is divided by the number of whole buckets in the text, so
/// the score approximates matches-per-800-chars without sentence splitting.
pub const DENSITY_BUCKET_CHARS: usize = 800;

/// Bucket for the comma-density syntactic-complexity marker.
pub const COMMA_BUCKET_CHARS: usize = 500;

/// Match cap for the abstraction marker.
pub const ABSTRACTION_CAP: f64 = 5.0;

/// スコアリングエンジンのトレイト
/// これを実装することで、別のスコアリング戦略を差し替えられます。
/// デフォルト実装の`DefaultScoreEngine`はバケット密度方式で計算します。
pub trait ScoreEngine {
    /// 1次元のスコアを計算するメソッド
    ///
    /// # Arguments
    /// * `text` - 解析対象のテキスト
    /// * `pattern` - コンパイル済みパターン
    ///
    /// # Returns
    /// * `f64` - スコア (0.0~1.0)
    fn score_pattern(text: &str, pattern: &Regex) -> f64;

    /// 複合スタイルのスコアを計算するメソッド
    /// サブシグネチャのスコアを平均します
    fn score_composite(text: &str, patterns: &[Regex]) -> f64;

    /// 構造の有無を判定するメソッド (0.0 か 1.0)
    fn score_presence(text: &str, pattern: &Regex) -> f64;

    /// 認知マーカーのスコアを計算するメソッド
    /// `coherencia_global`はここでは計算されません (バリデータ側)
    fn score_markers(text: &str, markers: &MarkerPatterns) -> IndexMap<Box<str>, f64>;
}

/// Default engine: non-overlapping case-insensitive match counts normalized
/// by text-length buckets, clamped to [0,1]. Empty or near-empty text scores
/// 0.0 on every dimension: degenerate input is data, not an error.
#[derive(Debug)]
pub struct DefaultScoreEngine;

impl DefaultScoreEngine {
    pub fn new() -> Self {
        DefaultScoreEngine
    }
}

impl Default for DefaultScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreEngine for DefaultScoreEngine {
    #[inline]
    fn score_pattern(text: &str, pattern: &Regex) -> f64 {
        let matches = pattern.find_iter(text).count();
        if matches == 0 {
            return 0.0;
        }
        let buckets = (text.chars().count() / DENSITY_BUCKET_CHARS).max(1);
        (matches as f64 / buckets as f64).min(1.0)
    }

    #[inline]
    fn score_composite(text: &str, patterns: &[Regex]) -> f64 {
        let total: f64 = patterns
            .iter()
            .map(|p| Self::score_pattern(text, p))
            .sum();
        (total / patterns.len().max(1) as f64).min(1.0)
    }

    #[inline]
    fn score_presence(text: &str, pattern: &Regex) -> f64 {
        if pattern.is_match(text) {
            1.0
        } else {
            0.0
        }
    }

    fn score_markers(text: &str, markers: &MarkerPatterns) -> IndexMap<Box<str>, f64> {
        let chars = text.chars().count();
        let commas = text.matches(',').count();
        let abstraction_hits = markers.nivel_abstraccion.find_iter(text).count();

        let mut out: IndexMap<Box<str>, f64> = IndexMap::with_capacity(7);
        out.insert(
            marker::NIVEL_ABSTRACCION.into(),
            (abstraction_hits as f64 / ABSTRACTION_CAP).min(1.0),
        );
        out.insert(
            marker::COMPLEJIDAD_SINTACTICA.into(),
            (commas as f64 / (chars / COMMA_BUCKET_CHARS).max(1) as f64).min(1.0),
        );
        out.insert(
            marker::INTERDISCIPLINARIEDAD.into(),
            Self::score_pattern(text, &markers.interdisciplinariedad),
        );
        out.insert(marker::EMPIRISMO.into(), Self::score_pattern(text, &markers.empirismo));
        out.insert(marker::DOGMATISMO.into(), Self::score_pattern(text, &markers.dogmatismo));
        out.insert(marker::CREATIVIDAD.into(), Self::score_pattern(text, &markers.creatividad));
        out.insert(
            marker::USO_JURISPRUDENCIA.into(),
            Self::score_pattern(text, &markers.uso_jurisprudencia),
        );
        out
    }
}

/// Score every dimension of one category with the engine matching its mode.
/// A dimension with zero matches is still present, at 0.0.
pub fn score_category<E: ScoreEngine>(text: &str, category: &CategorySpec) -> IndexMap<Box<str>, f64> {
    let mut scores: IndexMap<Box<str>, f64> = IndexMap::with_capacity(category.dimensions().len());
    for dim in category.dimensions() {
        let score = match category.mode() {
            ScoreMode::Density => E::score_pattern(text, &dim.patterns()[0]),
            ScoreMode::Composite => E::score_composite(text, dim.patterns()),
            ScoreMode::Presence => E::score_presence(text, &dim.patterns()[0]),
        };
        scores.insert(dim.name().into(), score);
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::schema::PatternSchema;

    fn regex(p: &str) -> Regex {
        regex::RegexBuilder::new(p).case_insensitive(true).build().unwrap()
    }

    #[test]
    fn score_pattern_stays_in_unit_interval_and_follows_bucket_density() {
        let pattern = regex(r"\bpor tanto\b");

        // texto corto: divisor 1, el recuento manda
        let short = "Por tanto, se admite. Por tanto, se rechaza.";
        assert_eq!(DefaultScoreEngine::score_pattern(short, &pattern), 1.0);

        // texto largo: 2 ocurrencias en 4 buckets
        let filler = "a".repeat(DENSITY_BUCKET_CHARS * 4);
        let long = format!("por tanto {filler} por tanto");
        let score = DefaultScoreEngine::score_pattern(&long, &pattern);
        assert_eq!(score, 2.0 / 4.0);

        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn empty_text_scores_zero_for_every_dimension() {
        let schema = PatternSchema::builtin_v2();
        for category in schema.categories() {
            let scores = score_category::<DefaultScoreEngine>("", category);
            assert_eq!(scores.len(), category.dimensions().len());
            assert!(scores.values().all(|&v| v == 0.0), "{}", category.name());
        }
        let markers = DefaultScoreEngine::score_markers("", schema.markers());
        assert!(markers.values().all(|&v| v == 0.0));
    }

    #[test]
    fn composite_score_is_the_mean_of_sub_signatures() {
        let patterns = vec![regex(r"\bconsidero\b"), regex(r"\bnunca_presente\b")];
        let text = "Considero que la norma aplica.";
        // 1.0 + 0.0 sobre 2 firmas
        assert_eq!(DefaultScoreEngine::score_composite(text, &patterns), 0.5);
        assert_eq!(DefaultScoreEngine::score_composite(text, &[]), 0.0);
    }

    #[test]
    fn presence_score_is_strictly_binary() {
        let pattern = regex(r"salvo|a menos que");
        assert_eq!(DefaultScoreEngine::score_presence("salvo pacto en contrario", &pattern), 1.0);
        assert_eq!(DefaultScoreEngine::score_presence("sin excepciones", &pattern), 0.0);
    }

    #[test]
    fn marker_scores_follow_their_dedicated_formulas() {
        let schema = PatternSchema::builtin_v2();
        let text = "El principio rector y otro principio, con datos, datos y más datos.";
        let markers = DefaultScoreEngine::score_markers(text, schema.markers());

        // 2 ocurrencias de "principio" / cap 5
        assert_eq!(markers[marker::NIVEL_ABSTRACCION], 2.0 / 5.0);
        // 3 comas, texto corto -> divisor 1, recortado a 1.0
        assert_eq!(markers[marker::COMPLEJIDAD_SINTACTICA], 1.0);
        // "datos" x3, divisor 1, recortado
        assert_eq!(markers[marker::EMPIRISMO], 1.0);
        assert_eq!(markers[marker::DOGMATISMO], 0.0);
        assert_eq!(markers.len(), 7);
    }
}
