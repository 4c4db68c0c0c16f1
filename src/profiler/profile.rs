use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::profiler::schema::{marker, PatternSchema, MARKER_CATEGORY};
use crate::profiler::score::{score_category, ScoreEngine};
use crate::profiler::validate;

/// Metadata block attached to every profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Source document id. Doubles as the profile key in collections.
    pub source: Box<str>,
    /// Optional author label (NER/attribution runs outside this crate).
    pub author: Option<Box<str>>,
    pub timestamp: DateTime<Utc>,
    /// Version of the pattern schema the profile was scored against.
    pub schema_version: Box<str>,
}

impl ProfileMeta {
    pub fn new(source: impl Into<Box<str>>, schema_version: impl Into<Box<str>>) -> Self {
        Self {
            source: source.into(),
            author: None,
            timestamp: Utc::now(),
            schema_version: schema_version.into(),
        }
    }

    pub fn with_author(mut self, author: impl Into<Box<str>>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Profile 構造体
/// 1つのテキストの認知プロファイルを保持します
/// カテゴリ → 次元 → スコアの入れ子構造で、スキーマが宣言する全次元を
/// 必ず含みます (マッチ0件でも 0.0 として記録)
///
/// 一度構築したら不変です。再解析は新しいProfileを作ります。
///
/// # Examples
/// ```
/// use cognitive_profiler::profiler::schema::PatternSchema;
/// use cognitive_profiler::profiler::score::DefaultScoreEngine;
/// use cognitive_profiler::profiler::profile::{Profile, ProfileMeta};
///
/// let schema = PatternSchema::builtin_v2();
/// let meta = ProfileMeta::new("doc-1", schema.version());
/// let profile = Profile::build::<DefaultScoreEngine>(&schema, meta, "Por tanto, procede.");
/// assert!(profile.score("cognicion.razonamiento_formal", "deductivo") > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    meta: ProfileMeta,
    categories: IndexMap<Box<str>, IndexMap<Box<str>, f64>>,
    /// per-category argmax, ties broken by declaration order
    dominantes: IndexMap<Box<str>, Box<str>>,
}

/// Profileの構築の実装
impl Profile {
    /// Score `text` against every category of `schema` and assemble one
    /// structurally complete profile.
    ///
    /// The marker category is appended last, with `coherencia_global` filled
    /// from the computed formula rather than any fixed placeholder.
    pub fn build<E: ScoreEngine>(schema: &PatternSchema, meta: ProfileMeta, text: &str) -> Self {
        let mut categories: IndexMap<Box<str>, IndexMap<Box<str>, f64>> =
            IndexMap::with_capacity(schema.categories().len() + 1);
        for category in schema.categories() {
            categories.insert(category.name().into(), score_category::<E>(text, category));
        }

        let mut markers = E::score_markers(text, schema.markers());
        let coherencia = validate::global_coherence(&markers);
        markers.insert(marker::COHERENCIA_GLOBAL.into(), coherencia);
        categories.insert(MARKER_CATEGORY.into(), markers);

        let dominantes = compute_dominants(&categories);
        Self {
            meta,
            categories,
            dominantes,
        }
    }
}

/// Profileの情報を取得するための実装
impl Profile {
    #[inline]
    pub fn meta(&self) -> &ProfileMeta {
        &self.meta
    }

    /// すべてのカテゴリを取得します
    ///
    /// # Returns
    /// * `&IndexMap<Box<str>, IndexMap<Box<str>, f64>>` - カテゴリのマップ
    #[inline]
    pub fn categories(&self) -> &IndexMap<Box<str>, IndexMap<Box<str>, f64>> {
        &self.categories
    }

    /// あるカテゴリの次元マップを取得します
    #[inline]
    pub fn category(&self, name: &str) -> Option<&IndexMap<Box<str>, f64>> {
        self.categories.get(name)
    }

    /// あるカテゴリのある次元のスコアを取得します
    /// 存在しない場合は 0.0 を返します
    ///
    /// # Arguments
    /// * `category` - カテゴリ名
    /// * `dimension` - 次元名
    ///
    /// # Returns
    /// * `f64` - スコア (0.0~1.0)
    #[inline]
    pub fn score(&self, category: &str, dimension: &str) -> f64 {
        self.categories
            .get(category)
            .and_then(|dims| dims.get(dimension))
            .copied()
            .unwrap_or(0.0)
    }

    /// ドット区切りパス (例: `cognicion.retorica.logos`) でスコアを引きます
    /// 最後のセグメントが次元名、残りがカテゴリ名です
    #[inline]
    pub fn lookup(&self, path: &str) -> Option<f64> {
        let (category, dimension) = path.rsplit_once('.')?;
        self.categories
            .get(category)
            .and_then(|dims| dims.get(dimension))
            .copied()
    }

    /// 認知マーカーのスコアを取得します
    /// 存在しない場合は 0.0 (ベクトル化と同じゼロ埋めポリシー)
    #[inline]
    pub fn marker(&self, name: &str) -> f64 {
        self.score(MARKER_CATEGORY, name)
    }

    /// マーカーカテゴリのマップを取得します
    #[inline]
    pub fn markers(&self) -> Option<&IndexMap<Box<str>, f64>> {
        self.categories.get(MARKER_CATEGORY)
    }

    /// あるカテゴリの支配的次元 (argmax) を取得します
    #[inline]
    pub fn dominant(&self, category: &str) -> Option<&str> {
        self.dominantes.get(category).map(|d| d.as_ref())
    }

    /// すべての支配的次元を取得します
    #[inline]
    pub fn dominantes(&self) -> &IndexMap<Box<str>, Box<str>> {
        &self.dominantes
    }

    /// 宣言されている次元の総数を取得します
    #[inline]
    pub fn dimension_count(&self) -> usize {
        self.categories.values().map(|dims| dims.len()).sum()
    }
}

/// Argmax per category. Strict greater-than keeps the first declared
/// dimension on ties, which makes an all-zero category resolve to its first
/// dimension instead of an arbitrary one.
fn compute_dominants(
    categories: &IndexMap<Box<str>, IndexMap<Box<str>, f64>>,
) -> IndexMap<Box<str>, Box<str>> {
    let mut dominants = IndexMap::with_capacity(categories.len());
    for (name, dims) in categories {
        let mut best: Option<(&Box<str>, f64)> = None;
        for (dim, &value) in dims {
            match best {
                Some((_, top)) if value <= top => {}
                _ => best = Some((dim, value)),
            }
        }
        if let Some((dim, _)) = best {
            dominants.insert(name.clone(), dim.clone());
        }
    }
    dominants
}
