use std::sync::Arc;

use cognitive_profiler::{PatternSchema, ProfileAnalyzer};

fn main() {
    // build schema
    let schema = Arc::new(PatternSchema::builtin_v2());

    // two authors with very different ways of thinking
    let formalista = "Es indudable que la norma aplica. Por tanto, en consecuencia, \
                      se concluye que la doctrina establece el criterio restrictivo. \
                      Conforme Fallos: 329:1092, la jurisprudencia es concluyente.";
    let empirista = "Los datos disponibles y la evidencia estadística sugieren que, \
                     probablemente, el impacto regulatorio sea limitado. Propongo una \
                     reinterpretación novedosa basada en la muestra analizada.";

    // add documents to analyzer
    let mut analyzer: ProfileAnalyzer = ProfileAnalyzer::new(schema);
    analyzer.insert(analyzer.analyze_as("doc-1", "Formalista", formalista));
    analyzer.insert(analyzer.analyze_as("doc-2", "Empirista", empirista));

    // full comparison
    let affinity = analyzer.compare("doc-1", "doc-2").unwrap();
    println!("cosine:   {:.4}", affinity.cosine);
    println!("distance: {:.4}", affinity.distance);
    println!("por categoría:");
    for (category, value) in &affinity.category_affinity {
        println!("  {category}: {value:.4}");
    }
    println!("mayores divergencias:");
    for (path, delta) in &affinity.divergences {
        println!("  {path}: {delta:.4}");
    }

    // coherence report of one profile
    let report = analyzer.validate("doc-1").unwrap();
    println!("\n{}", report.render());
}
