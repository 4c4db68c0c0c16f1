use std::{env, fs, process, sync::Arc, time::Instant};

use cognitive_profiler::{PatternSchema, ProfileAnalyzer};

// 使い方: cognitive-profiler [--json] [--strict] <texto.txt> [más.txt ...]
// 各ファイルを1ドキュメントとして解析し、プロファイルと整合レポートを出力する
fn main() {
    tracing_subscriber::fmt::init();

    let mut json_output = false;
    let mut strict = false;
    let mut paths: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json_output = true,
            "--strict" => strict = true,
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("usage: cognitive-profiler [--json] [--strict] <file.txt> [file.txt ...]");
        process::exit(2);
    }

    // 読めないファイルは警告してスキップ (バッチは止めない)
    let docs: Vec<(String, String)> = paths
        .iter()
        .filter_map(|path| match fs::read_to_string(path) {
            Ok(text) => Some((path.clone(), text)),
            Err(e) => {
                eprintln!("[warn] cannot read {path}: {e}");
                None
            }
        })
        .collect();

    if docs.is_empty() {
        eprintln!("no readable input files");
        process::exit(1);
    }

    let schema = Arc::new(PatternSchema::builtin_v2());
    let mut analyzer: ProfileAnalyzer = ProfileAnalyzer::new(Arc::clone(&schema));
    if strict {
        analyzer = analyzer.strict();
    }

    let start = Instant::now();
    let profiles = analyzer.analyze_batch(&docs);
    eprintln!(
        "[info] analyzed {} document(s) in {:.2?} (schema {})",
        profiles.len(),
        start.elapsed(),
        schema.version()
    );

    for profile in profiles {
        let source = profile.meta().source.clone();
        if json_output {
            match serde_json::to_string_pretty(&profile) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("[warn] cannot serialize {source}: {e}"),
            }
        } else {
            println!("== {source} ==");
            for (category, dominant) in profile.dominantes() {
                println!("  {category}: {dominant} ({:.3})", profile.score(category, dominant));
            }
        }

        match analyzer.register(profile) {
            Ok(report) => {
                if !json_output {
                    for finding in report.results.iter().filter(|r| !r.message.is_empty()) {
                        println!("  [{}] {}", finding.severity, finding.message);
                    }
                }
            }
            Err(e) => eprintln!("[warn] {e}"),
        }
    }

    // 2件以上なら相互の認知距離も出す
    if analyzer.len() >= 2 && !json_output {
        println!("\n== distancias cognitivas ==");
        let matrix = analyzer.matrix();
        for (i, key_a) in matrix.keys.iter().enumerate() {
            for (j, key_b) in matrix.keys.iter().enumerate() {
                if i < j {
                    let cosine = matrix.values[i][j];
                    println!("  {key_a} <-> {key_b}: cos={cosine:.4} dist={:.4}", 1.0 - cosine);
                }
            }
        }
    }
}
