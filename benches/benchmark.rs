use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use cognitive_profiler::profiler::evaluate::compare::similarity_matrix;
use cognitive_profiler::{CanonicalKeys, PatternSchema, Profile, ProfileAnalyzer};

// Synthetic corpus: repeated legal-Spanish paragraphs of increasing length,
// so density normalization actually kicks in.
fn build_corpus() -> Vec<(String, String)> {
    let base = "En primer lugar, debemos analizar sistemáticamente los elementos que \
                configuran esta figura jurídica. La doctrina establece claramente que \
                no puede haber ambigüedad en la interpretación. Por tanto, se sigue \
                necesariamente que la única opción viable es aplicar el criterio \
                restrictivo. Como sostiene la jurisprudencia de la Corte Suprema, el \
                principio protectorio debe ser interpretado en función de la finalidad \
                social que persigue. Sin embargo, reconozco que los datos disponibles \
                son limitados y que existe una zona gris en la aplicación práctica. ";

    (1..=16)
        .map(|i| (format!("doc-{i}"), base.repeat(i)))
        .collect()
}

fn profile_and_compare_benchmark(c: &mut Criterion) {
    let schema = Arc::new(PatternSchema::builtin_v2());
    let analyzer: ProfileAnalyzer = ProfileAnalyzer::new(Arc::clone(&schema));
    let corpus = build_corpus();

    c.bench_function("analyze_single", |b| {
        let (_, text) = &corpus[7];
        b.iter(|| analyzer.analyze("bench", text));
    });

    c.bench_function("analyze_batch_parallel", |b| {
        b.iter(|| analyzer.analyze_batch(&corpus));
    });

    let keys = CanonicalKeys::v2();
    let profiles: Vec<Profile> = corpus
        .iter()
        .map(|(source, text)| analyzer.analyze(source.as_str(), text))
        .collect();

    c.bench_function("vectorize", |b| {
        b.iter(|| keys.vectorize(&profiles[0]));
    });

    c.bench_function("similarity_matrix_16", |b| {
        let entries: Vec<(&str, &Profile)> = profiles
            .iter()
            .map(|p| (p.meta().source.as_ref(), p))
            .collect();
        b.iter(|| similarity_matrix(&keys, &entries));
    });
}

criterion_group!(benches, profile_and_compare_benchmark);
criterion_main!(benches);
