use std::sync::Arc;

use cognitive_profiler::{PatternSchema, ProfileAnalyzer, TraitPattern};

fn main() {
    let schema = Arc::new(PatternSchema::builtin_v2());
    let mut analyzer: ProfileAnalyzer = ProfileAnalyzer::new(schema);

    analyzer.insert(analyzer.analyze_as(
        "teleologo",
        "Autor A",
        "La finalidad de la norma y el propósito del legislador definen su objetivo; \
         considero que el fin social es la meta interpretativa.",
    ));
    analyzer.insert(analyzer.analyze_as(
        "dogmatico",
        "Autor B",
        "Es indudable e inequívoco. Sin lugar a dudas la regla es concluyente.",
    ));
    analyzer.insert(analyzer.analyze_as(
        "creativo",
        "Autor C",
        "Propongo un enfoque novedoso; pienso que una reinterpretación innovadora \
         del propósito de la norma es posible.",
    ));

    // search authors close to a teleological-essayistic thought pattern
    let pattern = TraitPattern::new()
        .with("teleologico", 0.8)
        .with("ensayistico", 0.7)
        .with("creatividad", 0.6);

    let mut hits = analyzer.search(&pattern, 0.5);
    hits.sort_by_score_desc();
    println!("coincidencias (umbral 0.5):\n{:#?}", hits);

    // ranking against a reference author
    let ranking = analyzer.rank_against("teleologo").unwrap();
    println!("\nranking frente a 'teleologo':\n{:#?}", ranking);
}
