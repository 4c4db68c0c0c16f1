use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::profiler::profile::Profile;
use crate::profiler::schema::marker;

/// Severity of one coherence finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of one cross-dimension check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub severity: Severity,
    pub dimension1: Box<str>,
    pub dimension2: Box<str>,
    pub value1: f64,
    pub value2: f64,
    pub message: String,
    pub suggestion: String,
}

impl ValidationResult {
    fn info(dimension1: &str, dimension2: &str, value1: f64, value2: f64) -> Self {
        Self {
            severity: Severity::Info,
            dimension1: dimension1.into(),
            dimension2: dimension2.into(),
            value1,
            value2,
            message: String::new(),
            suggestion: String::new(),
        }
    }

    fn message(mut self, severity: Severity, message: String, suggestion: &str) -> Self {
        self.severity = severity;
        self.message = message;
        self.suggestion = suggestion.to_string();
        self
    }
}

/// Validation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// ERROR findings make the profile invalid (registration refuses it).
    Strict,
    /// Reporting only; every profile is considered valid.
    Lenient,
}

/// Threshold constants of the coherence rules.
///
/// The values come straight from the source pattern research and have no
/// documented derivation; they are kept as named configuration rather than
/// re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceThresholds {
    pub empirismo_error: f64,
    pub dogmatismo_vs_empirismo_error: f64,
    pub empirismo_warning: f64,
    pub dogmatismo_vs_empirismo_warning: f64,
    pub creatividad_error: f64,
    pub dogmatismo_vs_creatividad_error: f64,
    pub creatividad_warning: f64,
    pub dogmatismo_vs_creatividad_warning: f64,
    pub abstraccion_alta: f64,
    pub empirismo_moderado: f64,
    pub complejidad_alta: f64,
    pub creatividad_baja: f64,
    pub interdisciplinariedad_alta: f64,
    pub interdisciplinariedad_baja: f64,
}

impl Default for CoherenceThresholds {
    fn default() -> Self {
        Self {
            empirismo_error: 0.7,
            dogmatismo_vs_empirismo_error: 0.4,
            empirismo_warning: 0.6,
            dogmatismo_vs_empirismo_warning: 0.5,
            creatividad_error: 0.7,
            dogmatismo_vs_creatividad_error: 0.3,
            creatividad_warning: 0.6,
            dogmatismo_vs_creatividad_warning: 0.4,
            abstraccion_alta: 0.7,
            empirismo_moderado: 0.6,
            complejidad_alta: 0.8,
            creatividad_baja: 0.4,
            interdisciplinariedad_alta: 0.8,
            interdisciplinariedad_baja: 0.2,
        }
    }
}

/// Aggregated outcome of a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.severity == Severity::Warning)
    }

    #[inline]
    pub fn into_parts(self) -> (bool, Vec<ValidationResult>) {
        (self.valid, self.results)
    }

    /// Render a human-readable report, one block per finding.
    pub fn render(&self) -> String {
        let mut lines = vec!["REPORTE DE VALIDACIÓN DE COHERENCIA".to_string()];
        for r in &self.results {
            lines.push(String::new());
            lines.push(format!("[{}] {} <-> {}", r.severity, r.dimension1, r.dimension2));
            lines.push(format!(
                "  valores: {}={:.2}, {}={:.2}",
                r.dimension1, r.value1, r.dimension2, r.value2
            ));
            if !r.message.is_empty() {
                lines.push(format!("  mensaje: {}", r.message));
            }
            if !r.suggestion.is_empty() {
                lines.push(format!("  sugerencia: {}", r.suggestion));
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "errores: {} | warnings: {}",
            self.errors().count(),
            self.warnings().count()
        ));
        lines.join("\n")
    }
}

/// Real global-coherence computation.
///
/// Antagonistic pairs (empirismo/dogmatismo, creatividad/dogmatismo) weigh
/// 0.3 each; weakly correlated pairs (abstracción/empirismo,
/// complejidad/creatividad) weigh 0.2 with the delta softened by half.
/// Clamped to [0,1]. All-zero markers therefore evaluate to 1.0.
pub fn global_coherence(markers: &IndexMap<Box<str>, f64>) -> f64 {
    let get = |name: &str| markers.get(name).copied().unwrap_or(0.0);
    coherence_from(
        get(marker::EMPIRISMO),
        get(marker::DOGMATISMO),
        get(marker::CREATIVIDAD),
        get(marker::NIVEL_ABSTRACCION),
        get(marker::COMPLEJIDAD_SINTACTICA),
    )
}

const ANTAGONIST_WEIGHT: f64 = 0.3;
const CORRELATED_WEIGHT: f64 = 0.2;
const CORRELATED_SOFTENING: f64 = 0.5;

#[inline]
fn coherence_from(empirismo: f64, dogmatismo: f64, creatividad: f64, abstraccion: f64, complejidad: f64) -> f64 {
    let opuestos_e_d = 1.0 - (empirismo - dogmatismo).abs();
    let opuestos_c_d = 1.0 - (creatividad - dogmatismo).abs();
    let correl_a_e = 1.0 - CORRELATED_SOFTENING * (abstraccion - empirismo).abs();
    let correl_s_c = 1.0 - CORRELATED_SOFTENING * (complejidad - creatividad).abs();

    let coherencia = ANTAGONIST_WEIGHT * opuestos_e_d
        + ANTAGONIST_WEIGHT * opuestos_c_d
        + CORRELATED_WEIGHT * correl_a_e
        + CORRELATED_WEIGHT * correl_s_c;
    coherencia.clamp(0.0, 1.0)
}

/// Stateless pipeline of cross-dimension coherence checks.
///
/// Every check reads marker values (missing markers default to 0.0, the same
/// policy the vectorizer applies) and produces one [`ValidationResult`]; the
/// pipeline itself never fails.
#[derive(Debug, Clone)]
pub struct CoherenceValidator {
    mode: ValidationMode,
    thresholds: CoherenceThresholds,
}

impl CoherenceValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            thresholds: CoherenceThresholds::default(),
        }
    }

    pub fn strict() -> Self {
        Self::new(ValidationMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(ValidationMode::Lenient)
    }

    pub fn with_thresholds(mut self, thresholds: CoherenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[inline]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Run every check against a profile's markers.
    pub fn validate_all(&self, profile: &Profile) -> ValidationReport {
        self.run(|name| profile.marker(name))
    }

    /// Run every check against a bare marker map.
    pub fn validate_markers(&self, markers: &IndexMap<Box<str>, f64>) -> ValidationReport {
        self.run(|name| markers.get(name).copied().unwrap_or(0.0))
    }

    fn run(&self, get: impl Fn(&str) -> f64) -> ValidationReport {
        let results = vec![
            self.check_empirismo_vs_dogmatismo(&get),
            self.check_creatividad_vs_dogmatismo(&get),
            self.check_abstraccion_vs_empirismo(&get),
            self.check_complejidad_vs_creatividad(&get),
            self.check_coherencia_global(&get),
            self.check_interdisciplinariedad(&get),
        ];
        let valid = match self.mode {
            ValidationMode::Strict => results.iter().all(|r| r.severity != Severity::Error),
            ValidationMode::Lenient => true,
        };
        ValidationReport { valid, results }
    }

    /// Check 1: empirismo y dogmatismo son antagónicos.
    fn check_empirismo_vs_dogmatismo(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let t = &self.thresholds;
        let empirismo = get(marker::EMPIRISMO);
        let dogmatismo = get(marker::DOGMATISMO);
        let result = ValidationResult::info(marker::EMPIRISMO, marker::DOGMATISMO, empirismo, dogmatismo);

        if empirismo > t.empirismo_error && dogmatismo > t.dogmatismo_vs_empirismo_error {
            result.message(
                Severity::Error,
                format!("Contradicción fundamental: Empirismo={empirismo:.2} (alto) + Dogmatismo={dogmatismo:.2} (alto)"),
                "Reducir dogmatismo a < 0.4 o empirismo a < 0.7. Actualmente incompatibles.",
            )
        } else if empirismo > t.empirismo_warning && dogmatismo > t.dogmatismo_vs_empirismo_warning {
            result.message(
                Severity::Warning,
                format!("Inusual: Empirismo moderado-alto={empirismo:.2} + Dogmatismo moderado={dogmatismo:.2}"),
                "Revisar si la argumentación mezcla datos con afirmaciones sin prueba",
            )
        } else {
            result
        }
    }

    /// Check 2: creatividad y dogmatismo son antagónicos.
    fn check_creatividad_vs_dogmatismo(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let t = &self.thresholds;
        let creatividad = get(marker::CREATIVIDAD);
        let dogmatismo = get(marker::DOGMATISMO);
        let result = ValidationResult::info(marker::CREATIVIDAD, marker::DOGMATISMO, creatividad, dogmatismo);

        if creatividad > t.creatividad_error && dogmatismo > t.dogmatismo_vs_creatividad_error {
            result.message(
                Severity::Error,
                format!("Contradicción: Creatividad={creatividad:.2} (alta) + Dogmatismo={dogmatismo:.2} (moderado)"),
                "Reducir dogmatismo a < 0.3 o creatividad a < 0.7. Ideas innovadoras no pueden ser rígidas.",
            )
        } else if creatividad > t.creatividad_warning && dogmatismo > t.dogmatismo_vs_creatividad_warning {
            result.message(
                Severity::Warning,
                format!("Inusual: Creatividad moderada-alta={creatividad:.2} + Dogmatismo moderado={dogmatismo:.2}"),
                "Verificar si las propuestas novedosas son realmente críticas con principios establecidos",
            )
        } else {
            result
        }
    }

    /// Check 3: correlación débil: abstracción alta con empirismo alto es
    /// estadísticamente inusual, nunca un error.
    fn check_abstraccion_vs_empirismo(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let t = &self.thresholds;
        let abstraccion = get(marker::NIVEL_ABSTRACCION);
        let empirismo = get(marker::EMPIRISMO);
        let result = ValidationResult::info(marker::NIVEL_ABSTRACCION, marker::EMPIRISMO, abstraccion, empirismo);

        if abstraccion > t.abstraccion_alta && empirismo > t.empirismo_moderado {
            result.message(
                Severity::Warning,
                format!("Inusual: Abstracción alta={abstraccion:.2} + Empirismo moderado-alto={empirismo:.2}"),
                "Autor combina teoría con datos (posible: teórico empirista). Revisar si hay coherencia.",
            )
        } else {
            result
        }
    }

    /// Check 4: correlación débil: sintaxis muy compleja con creatividad
    /// baja es inusual, nunca un error.
    fn check_complejidad_vs_creatividad(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let t = &self.thresholds;
        let complejidad = get(marker::COMPLEJIDAD_SINTACTICA);
        let creatividad = get(marker::CREATIVIDAD);
        let result = ValidationResult::info(
            marker::COMPLEJIDAD_SINTACTICA,
            marker::CREATIVIDAD,
            complejidad,
            creatividad,
        );

        if complejidad > t.complejidad_alta && creatividad < t.creatividad_baja {
            result.message(
                Severity::Warning,
                format!("Inusual: Sintaxis muy compleja={complejidad:.2} pero creatividad baja={creatividad:.2}"),
                "Posible: Autor sofisticado pero poco original. Revisar si repite argumentos conocidos.",
            )
        } else {
            result
        }
    }

    /// Check 5: coherencia global computed for real, reported against the
    /// stored marker value.
    fn check_coherencia_global(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let stored = get(marker::COHERENCIA_GLOBAL);
        let computed = coherence_from(
            get(marker::EMPIRISMO),
            get(marker::DOGMATISMO),
            get(marker::CREATIVIDAD),
            get(marker::NIVEL_ABSTRACCION),
            get(marker::COMPLEJIDAD_SINTACTICA),
        );
        let result = ValidationResult::info(marker::COHERENCIA_GLOBAL, "(calculada)", stored, computed);

        if (computed - 0.5).abs() > 0.3 {
            if computed < 0.4 {
                result.message(
                    Severity::Warning,
                    format!("Coherencia baja calculada: {computed:.2}"),
                    "Perfil tiene dimensiones contradictorias. Revisar dimensiones antagónicas.",
                )
            } else {
                result.message(
                    Severity::Info,
                    format!("Coherencia alta calculada: {computed:.2}"),
                    "Perfil muy coherente en sus dimensiones.",
                )
            }
        } else {
            result.message(
                Severity::Info,
                format!("Coherencia moderada: {computed:.2}"),
                "",
            )
        }
    }

    /// Check 6: interdisciplinariedad frente a especialización.
    fn check_interdisciplinariedad(&self, get: &impl Fn(&str) -> f64) -> ValidationResult {
        let t = &self.thresholds;
        let inter = get(marker::INTERDISCIPLINARIEDAD);
        let result = ValidationResult::info(marker::INTERDISCIPLINARIEDAD, "(especializacion)", inter, 1.0 - inter);

        if inter > t.interdisciplinariedad_alta {
            result.message(
                Severity::Info,
                format!("Autor altamente interdisciplinario: {inter:.2}"),
                "Combina múltiples perspectivas (económica, sociológica, filosófica, psicológica)",
            )
        } else if inter < t.interdisciplinariedad_baja {
            result.message(
                Severity::Warning,
                format!("Autor muy especializado: {inter:.2}"),
                "Enfoque principalmente en una disciplina (probablemente jurídica)",
            )
        } else {
            result.message(Severity::Info, format!("Interdisciplinariedad moderada: {inter:.2}"), "")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(values: &[(&str, f64)]) -> IndexMap<Box<str>, f64> {
        values.iter().map(|(k, v)| (Box::<str>::from(*k), *v)).collect()
    }

    #[test]
    fn high_empirismo_with_high_dogmatismo_is_an_error() {
        let m = markers(&[(marker::EMPIRISMO, 0.9), (marker::DOGMATISMO, 0.85)]);
        let report = CoherenceValidator::strict().validate_markers(&m);
        assert!(!report.is_valid());
        let first = &report.results[0];
        assert_eq!(first.severity, Severity::Error);
        assert_eq!(&*first.dimension1, marker::EMPIRISMO);
        assert_eq!(&*first.dimension2, marker::DOGMATISMO);
        assert_eq!(first.value1, 0.9);
        assert_eq!(first.value2, 0.85);
    }

    #[test]
    fn high_creatividad_with_low_dogmatismo_raises_nothing() {
        let m = markers(&[(marker::CREATIVIDAD, 0.8), (marker::DOGMATISMO, 0.1)]);
        let report = CoherenceValidator::strict().validate_markers(&m);
        assert!(report.is_valid());
        let check2 = &report.results[1];
        assert_eq!(check2.severity, Severity::Info);
        assert!(check2.message.is_empty());
    }

    #[test]
    fn all_zero_markers_evaluate_to_full_coherence_not_the_old_stub() {
        let m = markers(&[]);
        assert_eq!(global_coherence(&m), 1.0);

        let report = CoherenceValidator::lenient().validate_markers(&m);
        let check5 = &report.results[4];
        assert_eq!(check5.value2, 1.0);
        assert_ne!(check5.value2, 0.5);
    }

    #[test]
    fn coherence_formula_is_deterministic_and_matches_hand_computation() {
        let m = markers(&[
            (marker::EMPIRISMO, 0.7),
            (marker::DOGMATISMO, 0.2),
            (marker::CREATIVIDAD, 0.6),
            (marker::NIVEL_ABSTRACCION, 0.6),
            (marker::COMPLEJIDAD_SINTACTICA, 0.5),
        ]);
        // 0.3*(1-0.5) + 0.3*(1-0.4) + 0.2*(1-0.05) + 0.2*(1-0.05)
        let expected = 0.15 + 0.18 + 0.19 + 0.19;
        let got = global_coherence(&m);
        assert!((got - expected).abs() < 1e-12);
        assert_eq!(got.to_bits(), global_coherence(&m).to_bits());
    }

    #[test]
    fn weak_correlation_checks_warn_but_never_error() {
        let m = markers(&[
            (marker::NIVEL_ABSTRACCION, 0.8),
            (marker::EMPIRISMO, 0.65),
            (marker::COMPLEJIDAD_SINTACTICA, 0.9),
            (marker::CREATIVIDAD, 0.2),
        ]);
        let report = CoherenceValidator::strict().validate_markers(&m);
        assert_eq!(report.results[2].severity, Severity::Warning);
        assert_eq!(report.results[3].severity, Severity::Warning);
        // las correlaciones débiles no invalidan el perfil
        assert!(report.is_valid());
    }

    #[test]
    fn interdisciplinariedad_extremes_report_info_and_warning() {
        let alto = markers(&[(marker::INTERDISCIPLINARIEDAD, 0.9)]);
        let report = CoherenceValidator::lenient().validate_markers(&alto);
        assert_eq!(report.results[5].severity, Severity::Info);
        assert!(report.results[5].message.contains("interdisciplinario"));

        let bajo = markers(&[(marker::INTERDISCIPLINARIEDAD, 0.1)]);
        let report = CoherenceValidator::lenient().validate_markers(&bajo);
        assert_eq!(report.results[5].severity, Severity::Warning);
        assert!(report.results[5].message.contains("especializado"));
    }

    #[test]
    fn lenient_mode_reports_errors_but_stays_valid() {
        let m = markers(&[(marker::EMPIRISMO, 0.9), (marker::DOGMATISMO, 0.85)]);
        let report = CoherenceValidator::lenient().validate_markers(&m);
        assert!(report.is_valid());
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn severity_serializes_uppercase_for_external_consumers() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"ERROR\"");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
    }
}
