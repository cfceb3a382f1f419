use std::time::{Duration, Instant};
use tandem_tui::{
    document::{Document, char_to_byte_idx},
    normalize::{FlatText, normalize_whitespace},
    render::{Highlight, render_document},
    replace::{Replacer, resolve_span, splice_runs},
    theme::Theme,
    translate::TranslateError,
};
use tdoc::{Document as Tree, InlineStyle, Paragraph, Span};

/// Performance benchmark suite for the replacement core and the viewer
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Flattening documents into the selection space
/// - Resolving selections that span paragraphs
/// - Splicing styled runs
/// - Full replacements through the orchestrator
/// - Pane rendering with a selection
const SMALL_DOC_PARAGRAPHS: usize = 10;
const MEDIUM_DOC_PARAGRAPHS: usize = 100;
const LARGE_DOC_PARAGRAPHS: usize = 1000;
const HUGE_DOC_PARAGRAPHS: usize = 10000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: [&str; 16] = [
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "magna",
];

/// Paragraphs of filler text; every seventh one has irregular whitespace.
fn create_test_document(num_paragraphs: usize, avg_words_per_para: usize) -> Document {
    let mut paragraphs = Vec::with_capacity(num_paragraphs);

    for i in 0..num_paragraphs {
        let separator = if i % 7 == 0 { "  \t" } else { " " };
        let mut text = String::new();
        for j in 0..avg_words_per_para {
            if j > 0 {
                text.push_str(separator);
            }
            text.push_str(SAMPLE_WORDS[(i + j) % SAMPLE_WORDS.len()]);
        }
        if i + 1 == num_paragraphs {
            text.push_str(" finis");
        }
        paragraphs.push(Paragraph::new_text().with_content(vec![Span::new_text(&text)]));
    }

    Document::from_tree(Tree::new().with_paragraphs(paragraphs))
}

/// Paragraphs split over several styled runs.
fn create_styled_document(num_paragraphs: usize) -> Document {
    let mut paragraphs = Vec::with_capacity(num_paragraphs);

    for i in 0..num_paragraphs {
        let mut bold = Span::new_text(&format!("paragraph {i}"));
        bold.style = InlineStyle::Bold;
        let mut italic = Span::new_text(" with italic");
        italic.style = InlineStyle::Italic;
        paragraphs.push(Paragraph::new_text().with_content(vec![
            Span::new_text("This is "),
            bold,
            italic,
            Span::new_text(" and plain text after it."),
        ]));
    }

    Document::from_tree(Tree::new().with_paragraphs(paragraphs))
}

/// The last word of the second to last paragraph plus the whole last one.
/// Only the end of the document matches, so the whole flat text is scanned.
fn boundary_selection(doc: &Document) -> String {
    let last = doc.len() - 1;
    let tail = doc.paragraph_text(last - 1).unwrap_or_default();
    let head = doc.paragraph_text(last).unwrap_or_default();
    let tail_word = tail.split_whitespace().last().unwrap_or_default();
    format!("{tail_word} {}", normalize_whitespace(&head))
}

fn identity(text: &str) -> Result<String, TranslateError> {
    Ok(text.to_string())
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
        println!(
            "Ops/sec:        {:.2}",
            1_000_000.0 / self.avg_duration.as_micros().max(1) as f64
        );

        if self.avg_duration.as_millis() > 100 {
            println!("\n⚠️  WARNING: Average duration > 100ms (user-perceptible lag)");
        } else if self.avg_duration.as_millis() > 16 {
            println!("\n⚠️  WARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = durations.iter().min().copied().unwrap_or_default();
    let max_duration = durations.iter().max().copied().unwrap_or_default();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sized_documents() -> Vec<(&'static str, Document)> {
    vec![
        (
            "Small (10 paras)",
            create_test_document(SMALL_DOC_PARAGRAPHS, 20),
        ),
        (
            "Medium (100 paras)",
            create_test_document(MEDIUM_DOC_PARAGRAPHS, 20),
        ),
        (
            "Large (1000 paras)",
            create_test_document(LARGE_DOC_PARAGRAPHS, 20),
        ),
        (
            "Huge (10000 paras)",
            create_test_document(HUGE_DOC_PARAGRAPHS, 20),
        ),
    ]
}

fn iterations_for(name: &str) -> usize {
    if name.contains("Huge") {
        10
    } else {
        ITERATIONS
    }
}

#[test]
fn bench_flattening() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           FLAT TEXT CONSTRUCTION BENCHMARKS                    ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, doc) in sized_documents() {
        let result = benchmark(&format!("FlatText::new - {name}"), iterations_for(name), || {
            let _ = FlatText::new(doc.paragraph_texts());
        });
        result.print();
    }
}

#[test]
fn bench_resolve_across_paragraphs() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           SELECTION RESOLUTION BENCHMARKS                      ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, doc) in sized_documents() {
        let selected = boundary_selection(&doc);

        let result = benchmark(
            &format!("resolve_span - {name}"),
            iterations_for(name),
            || {
                let resolution = resolve_span(&doc, &selected);
                assert!(resolution.is_some());
            },
        );
        result.print();
    }
}

#[test]
fn bench_splicing_styled_runs() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           RUN SPLICING BENCHMARKS                              ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let doc = create_styled_document(1);
    let runs = doc.runs(0).map(<[Span]>::to_vec).unwrap_or_default();

    let single = benchmark("splice_runs - inside one run", ITERATIONS * 10, || {
        let mut runs = runs.clone();
        splice_runs(&mut runs, 0, 4, "That");
    });
    single.print();

    let multi = benchmark("splice_runs - across three runs", ITERATIONS * 10, || {
        let mut runs = runs.clone();
        splice_runs(&mut runs, 5, 30, "a sentence");
    });
    multi.print();
}

#[test]
fn bench_full_replacement() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           ORCHESTRATED REPLACEMENT BENCHMARKS                  ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, doc) in sized_documents() {
        let result = benchmark(
            &format!("Replacer::replace (direct, last paragraph) - {name}"),
            iterations_for(name),
            || {
                let mut working = doc.clone();
                let mut replacer = Replacer::new();
                let replaced = replacer.replace(&mut working, "finis", identity);
                assert!(replaced.is_ok());
            },
        );
        result.print();
    }

    let doc = create_test_document(LARGE_DOC_PARAGRAPHS, 20);
    let selected = boundary_selection(&doc);
    let result = benchmark("Replacer::replace (cross-paragraph) - Large", ITERATIONS, || {
        let mut working = doc.clone();
        let mut replacer = Replacer::new();
        let replaced = replacer.replace(&mut working, &selected, identity);
        assert!(replaced.is_ok());
    });
    result.print();

    println!("\n💡 NOTE: The UI blocks for this long on every translation, plus the network call.");
}

#[test]
fn bench_rendering_with_selection() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           PANE RENDERING BENCHMARKS                            ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let theme = Theme::default();
    let docs = vec![
        (
            "Medium styled (100 paras)",
            create_styled_document(MEDIUM_DOC_PARAGRAPHS),
        ),
        (
            "Large styled (1000 paras)",
            create_styled_document(LARGE_DOC_PARAGRAPHS),
        ),
    ];

    for (name, doc) in docs {
        let flat = FlatText::new(doc.paragraph_texts());
        let highlight = Highlight {
            flat: &flat,
            selection: Some(10..flat.len() / 2),
            cursor: flat.len() / 2,
        };

        let plain = benchmark(&format!("render_document - {name}"), ITERATIONS, || {
            let _ = render_document(&doc, 80, None, &theme);
        });
        plain.print();

        let highlighted = benchmark(
            &format!("render_document with selection - {name}"),
            ITERATIONS,
            || {
                let _ = render_document(&doc, 80, Some(&highlight), &theme);
            },
        );
        highlighted.print();

        let overhead_pct = ((highlighted.avg_duration.as_micros() as f64
            / plain.avg_duration.as_micros().max(1) as f64)
            - 1.0)
            * 100.0;
        println!("\nSelection overhead: {:.1}%", overhead_pct);
    }
}

#[test]
fn bench_char_to_byte_conversion() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║         CHAR-TO-BYTE CONVERSION BENCHMARKS                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let text_samples = vec![
        ("Short ASCII (50 chars)", "a".repeat(50)),
        ("Long ASCII (5000 chars)", "a".repeat(5000)),
        ("Short Unicode (50 chars)", "ü".repeat(50)),
        ("Long Unicode (5000 chars)", "ü".repeat(5000)),
    ];

    for (name, text) in text_samples {
        let char_count = text.chars().count();
        let mid_point = char_count / 2;

        let result = benchmark(
            &format!("char_to_byte_idx (middle of {char_count}) - {name}"),
            ITERATIONS * 10,
            || {
                let _ = char_to_byte_idx(&text, mid_point);
            },
        );
        result.print();
    }
}
