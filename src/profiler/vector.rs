use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::profiler::profile::Profile;

/// Version tag of the built-in canonical key list.
pub const CANONICAL_VERSION_V2: &str = "v2";

/// The v2 canonical layout: 40 dotted paths, in fixed order.
/// The vector index of a dimension is its position in this list and nothing
/// else: no Profile instance influences the layout.
const V2_FEATURE_PATHS: [&str; 40] = [
    // razonamiento formal (14)
    "cognicion.razonamiento_formal.deductivo",
    "cognicion.razonamiento_formal.inductivo",
    "cognicion.razonamiento_formal.abductivo",
    "cognicion.razonamiento_formal.analogico",
    "cognicion.razonamiento_formal.teleologico",
    "cognicion.razonamiento_formal.sistemico",
    "cognicion.razonamiento_formal.autoritativo",
    "cognicion.razonamiento_formal.a_contrario",
    "cognicion.razonamiento_formal.consecuencialista",
    "cognicion.razonamiento_formal.dialectico",
    "cognicion.razonamiento_formal.hermeneutico",
    "cognicion.razonamiento_formal.historico",
    "cognicion.razonamiento_formal.economico_analitico",
    "cognicion.razonamiento_formal.reduccion_al_absurdo",
    // modalidad epistémica (7)
    "cognicion.modalidad_epistemica.apodictico",
    "cognicion.modalidad_epistemica.dialectico",
    "cognicion.modalidad_epistemica.retorico",
    "cognicion.modalidad_epistemica.sofistico",
    "cognicion.modalidad_epistemica.certeza",
    "cognicion.modalidad_epistemica.incertidumbre_explorada",
    "cognicion.modalidad_epistemica.hedging",
    // retórica (3)
    "cognicion.retorica.ethos",
    "cognicion.retorica.pathos",
    "cognicion.retorica.logos",
    // estilo literario (8)
    "cognicion.estilo_literario.tecnico_juridico",
    "cognicion.estilo_literario.ensayistico",
    "cognicion.estilo_literario.narrativo",
    "cognicion.estilo_literario.barroco",
    "cognicion.estilo_literario.minimalista",
    "cognicion.estilo_literario.aforistico",
    "cognicion.estilo_literario.impersonal_burocratico",
    "cognicion.estilo_literario.dialectico_critico",
    // marcadores cognitivos (8)
    "marcadores_cognitivos.nivel_abstraccion",
    "marcadores_cognitivos.complejidad_sintactica",
    "marcadores_cognitivos.interdisciplinariedad",
    "marcadores_cognitivos.empirismo",
    "marcadores_cognitivos.dogmatismo",
    "marcadores_cognitivos.creatividad",
    "marcadores_cognitivos.uso_jurisprudencia",
    "marcadores_cognitivos.coherencia_global",
];

/// One canonical key: category plus dimension, joined by a dot in the
/// serialized path form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureKey {
    category: Box<str>,
    dimension: Box<str>,
}

impl FeatureKey {
    /// `"cognicion.retorica.logos"` → category `cognicion.retorica`,
    /// dimension `logos`. パスにドットが無い場合はカテゴリ空扱い
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((category, dimension)) => Self {
                category: category.into(),
                dimension: dimension.into(),
            },
            None => Self {
                category: "".into(),
                dimension: path.into(),
            },
        }
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Full dotted path.
    pub fn path(&self) -> String {
        if self.category.is_empty() {
            self.dimension.to_string()
        } else {
            format!("{}.{}", self.category, self.dimension)
        }
    }
}

/// Versioned, ordered canonical key list.
///
/// Vectors built from the same list are index-comparable no matter which
/// schema version produced the source profiles: keys a profile does not
/// carry are zero-filled. This deliberately masks schema drift in exchange
/// for comparability; the drift is logged, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalKeys {
    version: Box<str>,
    keys: Vec<FeatureKey>,
}

impl CanonicalKeys {
    /// The built-in 40-dimension v2 layout.
    pub fn v2() -> Self {
        Self::from_paths(CANONICAL_VERSION_V2, &V2_FEATURE_PATHS)
    }

    /// Build a custom layout from dotted paths.
    pub fn from_paths(version: impl Into<Box<str>>, paths: &[&str]) -> Self {
        Self {
            version: version.into(),
            keys: paths.iter().map(|p| FeatureKey::parse(p)).collect(),
        }
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &[FeatureKey] {
        &self.keys
    }

    /// Vector indices covered by one category, in canonical order.
    pub fn category_indices(&self, category: &str) -> Vec<usize> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.category() == category)
            .map(|(i, _)| i)
            .collect()
    }

    /// Categories named by the key list, first-occurrence order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for key in &self.keys {
            if !out.contains(&key.category()) {
                out.push(key.category());
            }
        }
        out
    }

    /// Flatten a profile into a fixed-length feature vector.
    ///
    /// # Arguments
    /// * `profile` - ベクトル化するプロファイル
    ///
    /// # Returns
    /// * `FeatureVector` - 長さは常に `self.len()` (欠損キーはゼロ埋め)
    pub fn vectorize(&self, profile: &Profile) -> FeatureVector {
        let mut missing = 0usize;
        let values: Vec<f64> = self
            .keys
            .iter()
            .map(|key| {
                match profile
                    .category(key.category())
                    .and_then(|dims| dims.get(key.dimension()))
                {
                    Some(&value) => value,
                    None => {
                        missing += 1;
                        0.0
                    }
                }
            })
            .collect();

        if missing > 0 {
            // schema drift: 別バージョンのプロファイルを混ぜた場合に起きる
            warn!(
                source = profile.meta().source.as_ref(),
                profile_version = profile.meta().schema_version.as_ref(),
                canonical_version = self.version.as_ref(),
                missing,
                "profile is missing canonical dimensions; zero-filled"
            );
        }

        FeatureVector {
            version: self.version.clone(),
            values,
        }
    }
}

/// Ordered array of IEEE-754 doubles, one per canonical key.
/// Meaningless without the key list that defines its layout, so it carries
/// the layout version tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    version: Box<str>,
    values: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}
