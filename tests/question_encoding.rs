//! Question Encoding Tests
//!
//! Per-type checks of the scoring/response XML shapes:
//! - numeric tolerance normalization
//! - multiple-choice identifier-based scoring
//! - multiple-answer default weighting
//! - fill-in-blank AND/OR semantics
//! - ordering/matching permutation and credit encoding
//! - fail-fast configuration errors leaving the pool untouched

use quizpack::{
    Blank, EquationRenderer, Feedback, FillInBlankQuestion, LatexConfig, MatchingQuestion,
    MemoryContainer, MultipleAnswerQuestion, MultipleChoiceQuestion, NumericQuestion,
    OrderingQuestion, Package, PackageConfig, Pool, PoolOptions, RenderError, RenderedEquation,
    ShortResponseQuestion, Tolerance, TrueFalseQuestion,
};

struct NoopRenderer;

impl EquationRenderer for NoopRenderer {
    fn render(
        &mut self,
        formula: &str,
        _display: bool,
        _options: &LatexConfig,
    ) -> Result<RenderedEquation, RenderError> {
        Ok(RenderedEquation {
            png: formula.as_bytes().to_vec(),
            width_px: 88,
            height_px: 44,
        })
    }
}

fn memory_package() -> (Package, quizpack::container::MemoryEntries) {
    let container = MemoryContainer::new();
    let entries = container.entries();
    let pkg = Package::with_container(
        Box::new(container),
        PackageConfig::default(),
        Box::new(NoopRenderer),
    );
    (pkg, entries)
}

fn entry_text(entries: &quizpack::container::MemoryEntries, path: &str) -> String {
    let entries = entries.lock().unwrap();
    let bytes = entries
        .get(path)
        .unwrap_or_else(|| panic!("missing entry {}", path));
    String::from_utf8(bytes.clone()).unwrap()
}

/// All `response_label` idents in document order.
fn response_label_idents(document: &str) -> Vec<String> {
    let mut idents = Vec::new();
    let mut rest = document;
    while let Some(pos) = rest.find("<response_label ident=\"") {
        let start = pos + "<response_label ident=\"".len();
        let end = rest[start..].find('"').unwrap();
        idents.push(rest[start..start + end].to_string());
        rest = &rest[start + end..];
    }
    idents
}

/// Text content of the first `<tag ...>text</tag>` occurrence.
fn element_text(document: &str, tag: &str) -> String {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let start = document.find(&open).unwrap();
    let text_start = document[start..].find('>').unwrap() + start + 1;
    let text_end = document[text_start..].find(&close).unwrap() + text_start;
    document[text_start..text_end].to_string()
}

#[test]
fn test_numeric_fractional_tolerance_normalizes_for_negative_answer() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "nums", PoolOptions::default());
    pool.add_numeric(
        &mut pkg,
        NumericQuestion::new("Q", "What is -10?", -10.0, Tolerance::Fraction(0.1)),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    let low: f64 = element_text(&document, "vargte").parse().unwrap();
    let high: f64 = element_text(&document, "varlte").parse().unwrap();
    assert!(low <= high);
    assert!((low - -11.0).abs() < 1e-9);
    assert!((high - -9.0).abs() < 1e-9);
}

#[test]
fn test_multiple_choice_scoring_references_generated_ident() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(
        &mut pkg,
        "mcq",
        PoolOptions {
            preview: true,
            ..Default::default()
        },
    );
    pool.add_multiple_choice(
        &mut pkg,
        MultipleChoiceQuestion::new(
            "Q1",
            "Pick one",
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            1,
        ),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    let idents = response_label_idents(&document);
    assert_eq!(idents.len(), 3);

    // The correct-answer condition names the ident of answer index 1.
    let expected = format!(
        "<varequal respident=\"response\" case=\"No\">{}</varequal>",
        idents[1]
    );
    assert!(document.contains(&expected));

    // The preview marks exactly that answer correct.
    let preview = entry_text(&entries, "mcq_preview.html");
    assert!(preview.contains("<li class=\"correct\">B</li>"));
    assert!(preview.contains("<li class=\"incorrect\">A</li>"));
    assert!(preview.contains("<li class=\"incorrect\">C</li>"));
}

#[test]
fn test_multiple_answer_default_weights() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "maq", PoolOptions::default());
    let answers: Vec<String> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    pool.add_multiple_answer(
        &mut pkg,
        MultipleAnswerQuestion::new("Q", "Pick several", answers, vec![0, 1, 3]),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    let positive = document
        .matches(">33.333</setvar>")
        .count();
    let negative = document
        .matches(">-33.333</setvar>")
        .count();
    assert_eq!(positive, 3);
    assert_eq!(negative, 3);
}

#[test]
fn test_multiple_answer_weight_count_mismatch_fails_fast() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "maq", PoolOptions::default());
    let q = MultipleAnswerQuestion::new(
        "Q",
        "Pick",
        vec!["a".to_string(), "b".to_string()],
        vec![0],
    )
    .weights(vec![50.0]);
    assert!(pool.add_multiple_answer(&mut pkg, q).is_err());
    assert_eq!(pool.question_count(), 0);
    pool.close(&mut pkg).unwrap();

    // The failed add left no partial item behind.
    let document = entry_text(&entries, "res00001.dat");
    assert_eq!(document.matches("<item ").count(), 0);
}

#[test]
fn test_fill_in_blank_and_or_shape() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "fitb", PoolOptions::default());
    pool.add_fill_in_blank(
        &mut pkg,
        FillInBlankQuestion::new(
            "Q",
            "The capital of France is [capital], on the [river].",
            vec![
                Blank::new("capital", vec!["[Pp]aris".to_string()]),
                Blank::new(
                    "river",
                    vec!["[Ss]eine".to_string(), "La Seine".to_string()],
                ),
            ],
        ),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    // One AND over two ORs, one varsubset per pattern.
    assert_eq!(document.matches("<and>").count(), 1);
    assert_eq!(document.matches("<or>").count(), 2);
    assert_eq!(
        document.matches("<varsubset respident=\"capital\"").count(),
        1
    );
    assert_eq!(document.matches("<varsubset respident=\"river\"").count(), 2);
    assert!(document.contains("setmatch=\"Matches\""));
}

#[test]
fn test_ordering_scores_original_sequence_with_permuted_display() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "ord", PoolOptions::default());
    pool.add_ordering(
        &mut pkg,
        OrderingQuestion::new(
            "Q",
            "Order these",
            vec!["first".to_string(), "second".to_string(), "third".to_string()],
        )
        .display_order(vec![2, 0, 1]),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    let displayed = response_label_idents(&document);
    assert_eq!(displayed.len(), 3);

    // Scoring lists idents in the original answer order, which under
    // display permutation [2, 0, 1] is displayed[1], displayed[2],
    // displayed[0].
    let scoring_order: Vec<String> = {
        let and_start = document.find("<and>").unwrap();
        response_label_scoring_idents(&document[and_start..])
    };
    assert_eq!(
        scoring_order,
        vec![
            displayed[1].clone(),
            displayed[2].clone(),
            displayed[0].clone()
        ]
    );
}

/// Idents referenced by `<varequal respident="response">` inside a
/// scoring block, in order.
fn response_label_scoring_idents(fragment: &str) -> Vec<String> {
    let marker = "<varequal respident=\"response\" case=\"No\">";
    let mut idents = Vec::new();
    let mut rest = fragment;
    while let Some(pos) = rest.find(marker) {
        let start = pos + marker.len();
        let end = rest[start..].find('<').unwrap();
        idents.push(rest[start..start + end].to_string());
        rest = &rest[start + end..];
    }
    idents
}

#[test]
fn test_ordering_rejects_invalid_permutation() {
    let (mut pkg, _entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "ord", PoolOptions::default());
    let q = OrderingQuestion::new("Q", "Order", vec!["a".to_string(), "b".to_string()])
        .display_order(vec![1, 1]);
    assert!(pool.add_ordering(&mut pkg, q).is_err());
}

#[test]
fn test_matching_encodes_one_credit_assignment_per_pairing() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "match", PoolOptions::default());
    pool.add_matching(
        &mut pkg,
        MatchingQuestion::new(
            "Q",
            "Match them",
            vec![
                ("H".to_string(), "Hydrogen".to_string()),
                ("He".to_string(), "Helium".to_string()),
                ("Li".to_string(), "Lithium".to_string()),
                ("Be".to_string(), "Beryllium".to_string()),
            ],
        )
        .distractors(vec!["Unobtainium".to_string()]),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    // One partial-credit assignment per pairing, not two.
    assert_eq!(document.matches("PartialCreditPercent").count(), 4);
    assert!(document.contains(">25.00</setvar>"));
    // Each left item offers every right item including the distractor.
    let idents = response_label_idents(&document);
    assert_eq!(idents.len(), 4 * 5);
}

#[test]
fn test_true_false_scores_declared_truth() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "tf", PoolOptions::default());
    pool.add_true_false(&mut pkg, TrueFalseQuestion::new("Q", "Rust is fast", true))
        .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    assert!(document
        .contains("<varequal respident=\"response\" case=\"No\">true</varequal>"));
    assert!(document.contains("<response_label ident=\"true\""));
    assert!(document.contains("<response_label ident=\"false\""));
}

#[test]
fn test_short_response_always_scores_full_credit() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(&mut pkg, "sr", PoolOptions::default());
    pool.add_short_response(
        &mut pkg,
        ShortResponseQuestion::new("Q", "Explain ownership")
            .sample_answer("Each value has a single owner.")
            .rows(5),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    // Deterministic full-credit branch with an empty condition.
    assert!(document.contains(
        "<respcondition title=\"correct\"><conditionvar/><setvar variablename=\"SCORE\" action=\"Set\">SCORE.max</setvar>"
    ));
    assert!(document.contains("rows=\"5\""));
    assert!(document.contains("Each value has a single owner."));
}

#[test]
fn test_feedback_texts_are_processed_into_both_streams() {
    let (mut pkg, entries) = memory_package();
    let mut pool = Pool::new(
        &mut pkg,
        "fb",
        PoolOptions {
            preview: true,
            ..Default::default()
        },
    );
    pool.add_true_false(
        &mut pkg,
        TrueFalseQuestion::new("Q", "Check", false).feedback(Feedback {
            positive: "Right: $x$".to_string(),
            negative: "Wrong".to_string(),
        }),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();

    let document = entry_text(&entries, "res00001.dat");
    // Package stream feedback carries the xid locator form.
    assert!(document.contains("@X@EmbeddedFile.requestUrlStub@X@bbcswebdav/xid-"));
    // Preview stream carries the literal path form.
    let preview = entry_text(&entries, "fb_preview.html");
    assert!(preview.contains("csfiles/home_dir/LaTeX__xid-"));
}
