//! Choice-based questions: multiple choice, multiple answer, true/false
//!
//! Answers carry freshly generated identifiers rather than positional
//! ones, so presentation shuffling never disturbs the scoring encoding.
//! Multiple-answer scoring is additive per option (partial credit is
//! inherent); multiple-choice is all-or-nothing on one identifier.

use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::xml::Element;

use super::errors::{ConfigError, QuestionResult};
use super::{
    answer_ident, asi_metadata, display_feedback, empty_solution, flow_formatted,
    incorrect_condition, item_feedback, outcomes, process_feedback, question_block, setvar_score,
    EncodedQuestion, Feedback, MetadataSpec, ProcessedFeedback,
};

/// Single-correct multiple choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub title: String,
    pub text: String,
    pub answers: Vec<String>,
    pub correct: usize,
    /// Presentation shuffle only; never affects scoring.
    pub shuffle: bool,
    pub feedback: Feedback,
}

impl MultipleChoiceQuestion {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        answers: Vec<String>,
        correct: usize,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            answers,
            correct,
            shuffle: true,
            feedback: Feedback::default(),
        }
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Multiple answer with additive per-option weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleAnswerQuestion {
    pub title: String,
    pub text: String,
    pub answers: Vec<String>,
    /// Indices of the correct options.
    pub correct: Vec<usize>,
    /// Per-option score contributions; computed from `correct` when
    /// absent. Must match the answer count when supplied.
    pub weights: Option<Vec<f64>>,
    pub shuffle: bool,
    pub feedback: Feedback,
}

impl MultipleAnswerQuestion {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        answers: Vec<String>,
        correct: Vec<usize>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            answers,
            correct,
            weights: None,
            shuffle: true,
            feedback: Feedback::default(),
        }
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// True/false question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    pub title: String,
    pub text: String,
    pub answer: bool,
    pub feedback: Feedback,
}

impl TrueFalseQuestion {
    pub fn new(title: impl Into<String>, text: impl Into<String>, answer: bool) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            answer,
            feedback: Feedback::default(),
        }
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Default multiple-answer weighting: `+100/|correct|` per correct
/// option, `−100/(n−|correct|)` per incorrect one, so selecting exactly
/// the correct subset nets 100 and every wrong inclusion or omission is
/// penalized proportionally.
pub(crate) fn default_weights(count: usize, correct: &[usize]) -> Vec<f64> {
    let n_correct = correct.len();
    (0..count)
        .map(|i| {
            if correct.contains(&i) {
                100.0 / n_correct as f64
            } else {
                -100.0 / (count - n_correct) as f64
            }
        })
        .collect()
}

/// Shared presentation block: the option list with fresh idents plus the
/// preview list items.
struct ChoiceBlock {
    response: Element,
    idents: Vec<String>,
    preview_items: String,
}

fn choice_block(
    pkg: &mut Package,
    answers: &[String],
    shuffle: bool,
    cardinality: &str,
    is_correct: impl Fn(usize) -> bool,
) -> QuestionResult<ChoiceBlock> {
    let mut render_choice = Element::new("render_choice")
        .attr("shuffle", if shuffle { "Yes" } else { "No" })
        .attr("minnumber", "0")
        .attr("maxnumber", "0");

    let mut idents = Vec::with_capacity(answers.len());
    let mut preview_items = String::new();
    for (index, answer) in answers.iter().enumerate() {
        let ident = answer_ident();
        let processed = pkg.process_text(answer)?;
        render_choice = render_choice.child(
            Element::new("flow_label").attr("class", "Block").child(
                Element::new("response_label")
                    .attr("ident", &ident)
                    .attr("shuffle", "Yes")
                    .attr("rarea", "Ellipse")
                    .attr("rrange", "Exact")
                    .child(flow_formatted(&processed.package)),
            ),
        );
        let class = if is_correct(index) { "correct" } else { "incorrect" };
        preview_items.push_str(&format!("<li class=\"{}\">{}</li>", class, processed.preview));
        idents.push(ident);
    }

    let response = Element::new("flow").attr("class", "RESPONSE_BLOCK").child(
        Element::new("response_lid")
            .attr("ident", "response")
            .attr("rcardinality", cardinality)
            .attr("rtiming", "No")
            .child(render_choice),
    );
    Ok(ChoiceBlock {
        response,
        idents,
        preview_items,
    })
}

fn item_shell(pkg: &mut Package, title: &str, spec: &MetadataSpec<'_>) -> Element {
    Element::new("item")
        .attr("title", title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), spec))
}

fn preview_item(stem: &str, answers: &str, feedback: &ProcessedFeedback) -> String {
    format!(
        "<li>{}<ul>{}</ul>{}</li>",
        stem,
        answers,
        feedback.preview_footer()
    )
}

pub(crate) fn encode_multiple_choice(
    pkg: &mut Package,
    q: &MultipleChoiceQuestion,
) -> QuestionResult<EncodedQuestion> {
    if q.answers.is_empty() {
        return Err(ConfigError::NoAnswers(q.title.clone()).into());
    }
    if q.correct >= q.answers.len() {
        return Err(ConfigError::AnswerIndexOutOfRange {
            index: q.correct,
            count: q.answers.len(),
        }
        .into());
    }

    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;
    let choices = choice_block(pkg, &q.answers, q.shuffle, "Single", |i| i == q.correct)?;

    let spec = MetadataSpec {
        score_max: "10.000000000000000".to_string(),
        ..Default::default()
    };
    let mut item = item_shell(pkg, &q.title, &spec);
    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(choices.response),
        ),
    );

    let mut resprocessing = Element::new("resprocessing")
        .attr("scoremodel", "SumOfScores")
        .child(outcomes())
        .child(
            Element::new("respcondition")
                .attr("title", "correct")
                .child(
                    Element::new("conditionvar").child(
                        Element::new("varequal")
                            .attr("respident", "response")
                            .attr("case", "No")
                            .text(&choices.idents[q.correct]),
                    ),
                )
                .child(setvar_score("SCORE.max"))
                .child(display_feedback("correct")),
        )
        .child(incorrect_condition());
    // Per-answer feedback hooks, scored 100 for the correct option.
    for (index, ident) in choices.idents.iter().enumerate() {
        resprocessing = resprocessing.child(
            Element::new("respcondition")
                .child(
                    Element::new("conditionvar").child(
                        Element::new("varequal")
                            .attr("respident", ident)
                            .attr("case", "No"),
                    ),
                )
                .child(setvar_score(if index == q.correct { "100" } else { "0" }))
                .child(display_feedback(ident)),
        );
    }
    item = item.child(resprocessing);

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));
    for ident in &choices.idents {
        item = item.child(empty_solution(ident));
    }

    let preview = preview_item(&stem.preview, &choices.preview_items, &feedback);
    Ok(EncodedQuestion { item, preview })
}

pub(crate) fn encode_multiple_answer(
    pkg: &mut Package,
    q: &MultipleAnswerQuestion,
) -> QuestionResult<EncodedQuestion> {
    if q.answers.is_empty() {
        return Err(ConfigError::NoAnswers(q.title.clone()).into());
    }
    if q.correct.is_empty() {
        return Err(ConfigError::NoCorrectAnswers(q.title.clone()).into());
    }
    for &index in &q.correct {
        if index >= q.answers.len() {
            return Err(ConfigError::AnswerIndexOutOfRange {
                index,
                count: q.answers.len(),
            }
            .into());
        }
    }
    let weights = match &q.weights {
        Some(weights) => {
            if weights.len() != q.answers.len() {
                return Err(ConfigError::WeightCountMismatch {
                    expected: q.answers.len(),
                    actual: weights.len(),
                }
                .into());
            }
            weights.clone()
        }
        None => default_weights(q.answers.len(), &q.correct),
    };

    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;
    let choices = choice_block(pkg, &q.answers, q.shuffle, "Multiple", |i| {
        q.correct.contains(&i)
    })?;

    let spec = MetadataSpec {
        question_type: "Multiple Answer",
        partial_credit: "true",
        negative_points: "Q",
        ..Default::default()
    };
    let mut item = item_shell(pkg, &q.title, &spec);
    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(choices.response),
        ),
    );

    // Full credit requires selecting every correct option and none of
    // the others.
    let mut all = Element::new("and");
    for (index, ident) in choices.idents.iter().enumerate() {
        let varequal = Element::new("varequal")
            .attr("respident", "response")
            .attr("case", "No")
            .text(ident);
        if q.correct.contains(&index) {
            all = all.child(varequal);
        } else {
            all = all.child(Element::new("not").child(varequal));
        }
    }
    let mut resprocessing = Element::new("resprocessing")
        .attr("scoremodel", "SumOfScores")
        .child(outcomes())
        .child(
            Element::new("respcondition")
                .attr("title", "correct")
                .child(Element::new("conditionvar").child(all))
                .child(setvar_score("SCORE.max"))
                .child(display_feedback("correct")),
        )
        .child(incorrect_condition());
    // Each option contributes its weight independently.
    for (index, ident) in choices.idents.iter().enumerate() {
        resprocessing = resprocessing.child(
            Element::new("respcondition")
                .child(
                    Element::new("conditionvar").child(
                        Element::new("varequal")
                            .attr("respident", ident)
                            .attr("case", "No"),
                    ),
                )
                .child(setvar_score(&format!("{:.3}", weights[index]))),
        );
    }
    item = item.child(resprocessing);

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));
    for ident in &choices.idents {
        item = item.child(empty_solution(ident));
    }

    let preview = preview_item(&stem.preview, &choices.preview_items, &feedback);
    Ok(EncodedQuestion { item, preview })
}

pub(crate) fn encode_true_false(
    pkg: &mut Package,
    q: &TrueFalseQuestion,
) -> QuestionResult<EncodedQuestion> {
    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;

    let spec = MetadataSpec {
        question_type: "True/False",
        ..Default::default()
    };
    let mut item = item_shell(pkg, &q.title, &spec);

    // Fixed true/false option pair with plain-text labels.
    let mut flow_label = Element::new("flow_label").attr("class", "Block");
    for label in ["true", "false"] {
        flow_label = flow_label.child(
            Element::new("response_label")
                .attr("ident", label)
                .attr("shuffle", "Yes")
                .attr("rarea", "Ellipse")
                .attr("rrange", "Exact")
                .child(
                    Element::new("flow_mat").attr("class", "Block").child(
                        Element::new("material").child(
                            Element::new("mattext")
                                .attr("charset", "us-ascii")
                                .attr("texttype", "text/plain")
                                .text(label),
                        ),
                    ),
                ),
        );
    }
    let response = Element::new("flow").attr("class", "RESPONSE_BLOCK").child(
        Element::new("response_lid")
            .attr("ident", "response")
            .attr("rcardinality", "Single")
            .attr("rtiming", "No")
            .child(
                Element::new("render_choice")
                    .attr("shuffle", "No")
                    .attr("minnumber", "0")
                    .attr("maxnumber", "0")
                    .child(flow_label),
            ),
    );
    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(response),
        ),
    );

    let expected = if q.answer { "true" } else { "false" };
    item = item.child(
        Element::new("resprocessing")
            .attr("scoremodel", "SumOfScores")
            .child(outcomes())
            .child(
                Element::new("respcondition")
                    .attr("title", "correct")
                    .child(
                        Element::new("conditionvar").child(
                            Element::new("varequal")
                                .attr("respident", "response")
                                .attr("case", "No")
                                .text(expected),
                        ),
                    )
                    .child(setvar_score("SCORE.max"))
                    .child(display_feedback("correct")),
            )
            .child(incorrect_condition()),
    );

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));

    let answers = format!(
        "<li class=\"correct\">{}</li>",
        if q.answer { "True" } else { "False" }
    );
    let preview = preview_item(&stem.preview, &answers, &feedback);
    Ok(EncodedQuestion { item, preview })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_six_answers_three_correct() {
        let weights = default_weights(6, &[0, 1, 3]);
        let expected = [
            100.0 / 3.0,
            100.0 / 3.0,
            -100.0 / 3.0,
            100.0 / 3.0,
            -100.0 / 3.0,
            -100.0 / 3.0,
        ];
        for (actual, expected) in weights.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-9);
        }
        let correct_sum: f64 = [0usize, 1, 3].iter().map(|&i| weights[i]).sum();
        assert!((correct_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_weights_all_correct_has_no_penalty_terms() {
        let weights = default_weights(3, &[0, 1, 2]);
        for weight in weights {
            assert!((weight - 100.0 / 3.0).abs() < 1e-9);
        }
    }
}
