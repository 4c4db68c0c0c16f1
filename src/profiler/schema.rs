use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Version tag of the built-in pattern tables.
pub const SCHEMA_VERSION_V2: &str = "v2";

/// Category name that holds the cognitive markers.
pub const MARKER_CATEGORY: &str = "marcadores_cognitivos";

/// Dimension names of the marker category.
/// バリデータとビルダーが共有する固定キー
pub mod marker {
    pub const NIVEL_ABSTRACCION: &str = "nivel_abstraccion";
    pub const COMPLEJIDAD_SINTACTICA: &str = "complejidad_sintactica";
    pub const INTERDISCIPLINARIEDAD: &str = "interdisciplinariedad";
    pub const EMPIRISMO: &str = "empirismo";
    pub const DOGMATISMO: &str = "dogmatismo";
    pub const CREATIVIDAD: &str = "creatividad";
    pub const USO_JURISPRUDENCIA: &str = "uso_jurisprudencia";
    pub const COHERENCIA_GLOBAL: &str = "coherencia_global";
}

/// How the dimensions of a category are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Non-overlapping match count, normalized by text length buckets.
    Density,
    /// Mean over the alternative sub-signatures of one composite style.
    /// One dominant regex cannot saturate the category on its own.
    Composite,
    /// Binary: 1.0 if the pattern matches anywhere, else 0.0.
    Presence,
}

/// Raw, uncompiled pattern table.
///
/// This is the serde-facing shape: plain strings, so alternate tables can be
/// loaded from JSON and injected for testing. Compiling a `RawSchema` is the
/// single point where malformed patterns are rejected: scoring itself can
/// no longer fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSchema {
    pub version: String,
    pub categories: Vec<RawCategory>,
    pub markers: RawMarkers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCategory {
    pub name: String,
    pub mode: ScoreMode,
    /// dimension name → alternative sub-patterns
    /// Density/Presence カテゴリではパターンは1つだけ
    pub dimensions: IndexMap<String, Vec<String>>,
}

/// Patterns behind the density-scored cognitive markers.
/// `nivel_abstraccion` and `complejidad_sintactica` use dedicated formulas
/// (see the score engine); `coherencia_global` is computed, not matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMarkers {
    pub nivel_abstraccion: String,
    pub interdisciplinariedad: String,
    pub empirismo: String,
    pub dogmatismo: String,
    pub creatividad: String,
    pub uso_jurisprudencia: String,
}

/// One dimension with its compiled sub-patterns.
#[derive(Debug, Clone)]
pub struct DimensionPatterns {
    name: Box<str>,
    patterns: Vec<Regex>,
}

impl DimensionPatterns {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

/// One category with its scoring mode and ordered dimensions.
/// Declaration order is semantic: it fixes tie-breaking for the per-category
/// dominant value and the nested layout of the resulting profile.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    name: Box<str>,
    mode: ScoreMode,
    dimensions: Vec<DimensionPatterns>,
}

impl CategorySpec {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    #[inline]
    pub fn dimensions(&self) -> &[DimensionPatterns] {
        &self.dimensions
    }
}

/// Compiled marker patterns.
#[derive(Debug, Clone)]
pub struct MarkerPatterns {
    pub nivel_abstraccion: Regex,
    pub interdisciplinariedad: Regex,
    pub empirismo: Regex,
    pub dogmatismo: Regex,
    pub creatividad: Regex,
    pub uso_jurisprudencia: Regex,
}

/// Immutable, versioned pattern schema.
///
/// The schema is compiled once and then shared behind an `Arc` by every
/// analyzer that scores against it. It carries no mutable state, so it can
/// be swapped per test or per domain without touching globals.
///
/// # Examples
/// ```
/// use cognitive_profiler::profiler::schema::PatternSchema;
/// let schema = PatternSchema::builtin_v2();
/// assert_eq!(schema.version(), "v2");
/// ```
#[derive(Debug, Clone)]
pub struct PatternSchema {
    version: Box<str>,
    categories: Vec<CategorySpec>,
    markers: MarkerPatterns,
}

impl PatternSchema {
    /// Compile a raw pattern table into an immutable schema.
    ///
    /// # Arguments
    /// * `raw` - 未コンパイルのパターンテーブル
    ///
    /// # Returns
    /// * `Result<PatternSchema, ConfigError>` - 不正な正規表現は即座に失敗します
    pub fn compile(raw: RawSchema) -> Result<Self, ConfigError> {
        if raw.categories.is_empty() {
            return Err(ConfigError::EmptySchema {
                version: raw.version.into_boxed_str(),
            });
        }

        let mut categories = Vec::with_capacity(raw.categories.len());
        for raw_cat in raw.categories {
            if raw_cat.dimensions.is_empty() {
                return Err(ConfigError::EmptyCategory {
                    category: raw_cat.name.into_boxed_str(),
                });
            }
            let mut dimensions = Vec::with_capacity(raw_cat.dimensions.len());
            for (dim, patterns) in raw_cat.dimensions {
                if patterns.is_empty() {
                    return Err(ConfigError::EmptyDimension {
                        category: raw_cat.name.into_boxed_str(),
                        dimension: dim.into_boxed_str(),
                    });
                }
                let compiled = patterns
                    .iter()
                    .map(|p| compile_pattern(p, raw_cat.mode))
                    .collect::<Result<Vec<Regex>, regex::Error>>()
                    .map_err(|e| ConfigError::InvalidPattern {
                        category: raw_cat.name.clone().into_boxed_str(),
                        dimension: dim.clone().into_boxed_str(),
                        source: Box::new(e),
                    })?;
                dimensions.push(DimensionPatterns {
                    name: dim.into_boxed_str(),
                    patterns: compiled,
                });
            }
            categories.push(CategorySpec {
                name: raw_cat.name.into_boxed_str(),
                mode: raw_cat.mode,
                dimensions,
            });
        }

        let markers = MarkerPatterns {
            nivel_abstraccion: compile_marker(&raw.markers.nivel_abstraccion, marker::NIVEL_ABSTRACCION)?,
            interdisciplinariedad: compile_marker(&raw.markers.interdisciplinariedad, marker::INTERDISCIPLINARIEDAD)?,
            empirismo: compile_marker(&raw.markers.empirismo, marker::EMPIRISMO)?,
            dogmatismo: compile_marker(&raw.markers.dogmatismo, marker::DOGMATISMO)?,
            creatividad: compile_marker(&raw.markers.creatividad, marker::CREATIVIDAD)?,
            uso_jurisprudencia: compile_marker(&raw.markers.uso_jurisprudencia, marker::USO_JURISPRUDENCIA)?,
        };

        Ok(Self {
            version: raw.version.into_boxed_str(),
            categories,
            markers,
        })
    }

    /// Built-in v2 schema for Spanish-language legal writing.
    pub fn builtin_v2() -> Self {
        Self::compile(raw_v2()).expect("built-in v2 pattern tables are valid")
    }

    /// Schema version tag. Profiles record it in their `meta` block.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All declared categories, in declaration order.
    #[inline]
    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    /// Compiled marker patterns.
    #[inline]
    pub fn markers(&self) -> &MarkerPatterns {
        &self.markers
    }

    /// Total number of declared dimensions, markers included.
    pub fn dimension_count(&self) -> usize {
        let markers = 8; // 7 scored + coherencia_global
        self.categories.iter().map(|c| c.dimensions.len()).sum::<usize>() + markers
    }
}

/// Case-insensitive compilation; presence patterns additionally match across
/// line boundaries (the structure heuristics span whole documents).
fn compile_pattern(pattern: &str, mode: ScoreMode) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(mode == ScoreMode::Presence)
        .build()
}

fn compile_marker(pattern: &str, name: &str) -> Result<Regex, ConfigError> {
    compile_pattern(pattern, ScoreMode::Density).map_err(|e| ConfigError::InvalidPattern {
        category: MARKER_CATEGORY.into(),
        dimension: name.into(),
        source: Box::new(e),
    })
}

fn cat(name: &str, mode: ScoreMode, dims: &[(&str, &[&str])]) -> RawCategory {
    RawCategory {
        name: name.to_string(),
        mode,
        dimensions: dims
            .iter()
            .map(|(dim, pats)| {
                (
                    dim.to_string(),
                    pats.iter().map(|p| p.to_string()).collect::<Vec<String>>(),
                )
            })
            .collect(),
    }
}

/// The v2 pattern tables.
///
/// Exposed so tests can tweak a copy and inject it through
/// [`PatternSchema::compile`] instead of mutating shared state.
pub fn raw_v2() -> RawSchema {
    RawSchema {
        version: SCHEMA_VERSION_V2.to_string(),
        categories: vec![
            cat("cognicion.razonamiento_formal", ScoreMode::Density, &[
                ("deductivo", &[r"\b(por tanto|en consecuencia|se concluye|se sigue|de( ahí| allí) que)\b"]),
                ("inductivo", &[r"\b(en general|por lo común|habitualmente|frecuentemente|muestras|patrones)\b"]),
                ("abductivo", &[r"\b(la mejor explicación|explicaría|hipótesis plausible|inferencia a la mejor explicación)\b"]),
                ("analogico", &[r"\b(similar|semejante|como|análogamente|por analogía)\b"]),
                ("teleologico", &[r"\b(finalidad|propósito|objetivo|fin|meta)\b"]),
                ("sistemico", &[r"\b(coherente|articulado|integrado|sistemático|holístico|subsistemas)\b"]),
                ("autoritativo", &[r"\b(doctrina (establece|dice)|jurisprudencia|precedente|fallos:?)\b"]),
                ("a_contrario", &[r"\b(a contrario|por el contrario|inversamente|contrario sensu)\b"]),
                ("consecuencialista", &[r"\b(consecuencias|efectos|resultados|impacto|externalidades)\b"]),
                ("dialectico", &[r"\b(tesis|antítesis|síntesis|contraargumento|réplica|objección)\b"]),
                ("hermeneutico", &[r"\b(interpretación|sentido|contexto|hermen[eé]utica|telos|ratio)\b"]),
                ("historico", &[r"\b(históricamente|evolución|contexto histórico|precedentes cronológicos)\b"]),
                ("economico_analitico", &[r"\b(costos?|beneficios?|eficiencia|incentivos|trade-?off|óptimo)\b"]),
                ("reduccion_al_absurdo", &[r"\b(suponiendo que|si se admitiera que.*(absurdo|contradicción))\b"]),
            ]),
            cat("cognicion.modalidad_epistemica", ScoreMode::Density, &[
                ("apodictico", &[r"\b(indudable|inequívoco|concluyente|necesario|demostrable)\b"]),
                ("dialectico", &[r"\b(probable|verosímil|opinable|controvertido|discutible)\b"]),
                ("retorico", &[r"\b(persuasión|audiencia|verosimilitud|credibilidad|convincente)\b"]),
                ("sofistico", &[r"\b(aparentemente|truco argumental|equivocación|falacia)\b"]),
                ("certeza", &[r"\b(indudable|inequívoco|concluyente|necesario|cierto)\b"]),
                ("incertidumbre_explorada", &[r"\b(incertidumbre|ambigüedad|no concluyente|limitado)\b"]),
                ("hedging", &[r"\b(probablemente|posiblemente|podría|parece|sugiere|eventual)\b"]),
            ]),
            cat("cognicion.retorica", ScoreMode::Density, &[
                ("ethos", &[r"\b(según|conforme|establece la doctrina|jurisprudencia|autoridades? en la materia)\b"]),
                ("pathos", &[r"\b(injusto|grave|alarmante|indignante|necesario|urgente|desproporcionado)\b"]),
                ("logos", &[r"\b(porque|dado que|puesto que|en virtud de|la razón|por razones)\b"]),
            ]),
            cat("cognicion.estilo_literario", ScoreMode::Composite, &[
                ("tecnico_juridico", &[r"\b(art\.?|arts\.?|ley\s?\d+|decreto|fallos:|fs\.)\b", r"\b(v.gr\.|cfr\.)\b"]),
                ("ensayistico", &[r"\b(pienso|considero|propongo|ensayo)\b", r"[;:—]\s"]),
                ("narrativo", &[r"\b(primero|luego|entonces|finalmente)\b", r"\b(relata|narra)\b"]),
                // oraciones muy anidadas
                ("barroco", &[r"(,){3,}", r"\((?:[^()]+|\([^()]*\))*\)"]),
                // frases cortas repetidas
                ("minimalista", &[r"\.\s+[A-ZÁÉÍÓÚÑ]"]),
                ("aforistico", &[r#""[^"]{5,120}""#, r"\b(aforismo|máxima)\b"]),
                ("impersonal_burocratico", &[r"\b(se|queda|hágase|cítese|notifíquese)\b", r"\b(que se provea|tómese razón)\b"]),
                ("dialectico_critico", &[r"\b(crítica|antinomia|paradoja|aporía)\b"]),
            ]),
            cat("cognicion.estructuras_argumentativas", ScoreMode::Presence, &[
                ("irac", &[r"(issue|cuestión).*(regla|norma).*(aplicación|análisis).*(conclusión)"]),
                ("toulmin", &[r"(reclamo|pretensión).*(fundamento|garantía).*(respaldo|backing)"]),
                ("issue_tree", &[r"(subproblema|subcuestión|desglose)"]),
                ("defeasible", &[r"(salvo|a menos que|excepto si)"]),
                ("burden_shift", &[r"(carga de la prueba|onus probandi|corresponde demostrar)"]),
                ("silogistico_formal", &[r"\b(Todo .* es .*)\b.*\b(Todo .* es .*)\b.*\b(Por tanto|Luego)\b.*"]),
            ]),
            cat("valores.sesgos_valorativos", ScoreMode::Density, &[
                ("pro_trabajador", &[r"\b(trabajador|asalariado|protección laboral)\b"]),
                ("pro_empresario", &[r"\b(competitividad|inversión|productividad|eficiencia)\b"]),
                ("pro_consumidor", &[r"\b(consumidor|hipervulnerable|relación de consumo)\b"]),
                ("garantista", &[r"\b(garantías|debido proceso|tutela judicial efectiva)\b"]),
                ("punitivista", &[r"\b(sanción ejemplar|multas severas|tolerancia cero)\b"]),
                ("liberal", &[r"\b(libertad contractual|minima intervención estatal)\b"]),
                ("utilitarista", &[r"\b(bienestar general|eficiencia social|maximización del beneficio)\b"]),
            ]),
            cat("valores.axiomas", ScoreMode::Density, &[
                ("principio_protectorio", &[r"\b(protectorio|pro operario|in dubio pro operario)\b"]),
                ("autonomia_voluntad_limitada", &[r"\b(límites|orden público|buenas costumbres|abuso del derecho)\b"]),
                ("razonabilidad", &[r"\b(razonable|proporcionalidad|idoneidad|necesidad)\b"]),
                ("seguridad_juridica", &[r"\b(seguridad jur[ií]dica|previsibilidad|confianza)\b"]),
            ]),
            cat("apoyo.fuentes", ScoreMode::Density, &[
                ("jurisprudencia", &[r"\b(Fallos:|CSJN|SCBA|TSJ|Cámara|Sala|Expte\.?)\b"]),
                ("doctrina", &[r"\b(opina|sostiene|doctrina|tratadista|autor)\b"]),
                ("ley", &[r"\b(ley\s?\d+|art(?:s?)\.?\s?\d+)\b"]),
                ("principios", &[r"\b(principio|proporcionalidad|razonabilidad|equidad)\b"]),
                ("politicas_publicas", &[r"\b(política pública|impacto regulatorio|análisis económico)\b"]),
                ("evidencia_empirica", &[r"\b(estadístic|datos|encuesta|muestra|regresión|dataset)\b"]),
            ]),
            cat("limites.dilemas", ScoreMode::Density, &[
                ("dilemas_explicitados", &[r"\b\w+\s+vs\.?\s+\w+\b"]),
                ("limitaciones_reconocidas", &[r"\b(limitación|límite|sesgo|parcialidad|datos incompletos|no concluyente)\b"]),
                ("areas_de_ambiguedad", &[r"\b(ambigüedad|imprecisión|zona gris|territorio inexplorado)\b"]),
            ]),
        ],
        markers: RawMarkers {
            nivel_abstraccion: r"\b(principio|cláusula general|ratio)\b".to_string(),
            interdisciplinariedad: r"\b(económico|sociológico|filosófico|psicológico)\b".to_string(),
            empirismo: r"\b(datos|muestra|estadístic|evidencia)\b".to_string(),
            dogmatismo: r"\b(indudable|inequívoco|sin lugar a dudas)\b".to_string(),
            creatividad: r"\b(propongo|novedoso|innovador|reinterpretación)\b".to_string(),
            uso_jurisprudencia: r"(Fallos:|Cám\.|TSJ|SCBA|CSJN|Expte\.?)".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_v2_compiles_with_every_category_populated() {
        let schema = PatternSchema::builtin_v2();
        assert_eq!(schema.version(), SCHEMA_VERSION_V2);
        assert_eq!(schema.categories().len(), 9);
        for category in schema.categories() {
            assert!(!category.dimensions().is_empty(), "{} is empty", category.name());
            for dim in category.dimensions() {
                assert!(!dim.patterns().is_empty(), "{}.{} has no patterns", category.name(), dim.name());
            }
        }
        // 14 + 7 + 3 + 8 + 6 + 7 + 4 + 6 + 3 dims plus 8 markers
        assert_eq!(schema.dimension_count(), 66);
    }

    #[test]
    fn malformed_pattern_is_a_fatal_config_error() {
        let mut raw = raw_v2();
        raw.categories[0]
            .dimensions
            .insert("roto".to_string(), vec![r"(unclosed".to_string()]);
        let err = PatternSchema::compile(raw).unwrap_err();
        match err {
            ConfigError::InvalidPattern { category, dimension, .. } => {
                assert_eq!(&*category, "cognicion.razonamiento_formal");
                assert_eq!(&*dimension, "roto");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_schema_and_empty_category_are_rejected() {
        let raw = RawSchema {
            version: "vacía".to_string(),
            categories: Vec::new(),
            markers: raw_v2().markers,
        };
        assert!(matches!(
            PatternSchema::compile(raw),
            Err(ConfigError::EmptySchema { .. })
        ));

        let mut raw = raw_v2();
        raw.categories.push(RawCategory {
            name: "hueca".to_string(),
            mode: ScoreMode::Density,
            dimensions: IndexMap::new(),
        });
        assert!(matches!(
            PatternSchema::compile(raw),
            Err(ConfigError::EmptyCategory { .. })
        ));

        let mut raw = raw_v2();
        raw.categories[0]
            .dimensions
            .insert("sin_patrones".to_string(), Vec::new());
        assert!(matches!(
            PatternSchema::compile(raw),
            Err(ConfigError::EmptyDimension { .. })
        ));
    }

    #[test]
    fn raw_schema_roundtrips_through_json() {
        let raw = raw_v2();
        let s = serde_json::to_string(&raw).unwrap();
        let de: RawSchema = serde_json::from_str(&s).unwrap();
        assert_eq!(de.version, raw.version);
        assert_eq!(de.categories.len(), raw.categories.len());
        for (a, b) in de.categories.iter().zip(raw.categories.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.mode, b.mode);
            assert_eq!(a.dimensions, b.dimensions);
        }
        // 再コンパイルも成功するはず
        PatternSchema::compile(de).unwrap();
    }
}
