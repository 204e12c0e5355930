//! Ordering and matching questions
//!
//! Both present a permuted view of caller-supplied answers. Ordering is
//! all-or-nothing on the original sequence; matching grades each left
//! item independently and additively, with optional distractor right
//! items that can be chosen but never score.

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::xml::Element;

use super::errors::{ConfigError, QuestionResult};
use super::{
    answer_ident, asi_metadata, display_feedback, flow_formatted, incorrect_condition,
    item_feedback, material, outcomes, process_feedback, question_block, setvar_score,
    EncodedQuestion, Feedback, MetadataSpec,
};

/// Ordering question: `answers` is the correct sequence; the display
/// permutation is presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingQuestion {
    pub title: String,
    pub text: String,
    pub answers: Vec<String>,
    /// Explicit display permutation of `0..answers.len()`; a random one
    /// is drawn when absent.
    pub display_order: Option<Vec<usize>>,
    pub feedback: Feedback,
}

impl OrderingQuestion {
    pub fn new(title: impl Into<String>, text: impl Into<String>, answers: Vec<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            answers,
            display_order: None,
            feedback: Feedback::default(),
        }
    }

    pub fn display_order(mut self, order: Vec<usize>) -> Self {
        self.display_order = Some(order);
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Matching question: left/right pairs plus distractor right items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingQuestion {
    pub title: String,
    pub text: String,
    pub pairs: Vec<(String, String)>,
    /// Extra right-side items that never match anything.
    pub distractors: Vec<String>,
    /// Penalty percentage applied to wrong pairings.
    pub negative_weight: f64,
    pub feedback: Feedback,
}

impl MatchingQuestion {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        pairs: Vec<(String, String)>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            pairs,
            distractors: Vec::new(),
            negative_weight: 0.0,
            feedback: Feedback::default(),
        }
    }

    pub fn distractors(mut self, distractors: Vec<String>) -> Self {
        self.distractors = distractors;
        self
    }

    pub fn negative_weight(mut self, weight: f64) -> Self {
        self.negative_weight = weight;
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

fn validated_permutation(
    order: &Option<Vec<usize>>,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<usize>, ConfigError> {
    match order {
        Some(order) => {
            let mut seen = order.clone();
            seen.sort_unstable();
            if seen != (0..count).collect::<Vec<_>>() {
                return Err(ConfigError::InvalidPermutation(count));
            }
            Ok(order.clone())
        }
        None => {
            let mut order: Vec<usize> = (0..count).collect();
            order.shuffle(rng);
            Ok(order)
        }
    }
}

pub(crate) fn encode_ordering(
    pkg: &mut Package,
    q: &OrderingQuestion,
    rng: &mut dyn RngCore,
) -> QuestionResult<EncodedQuestion> {
    if q.answers.is_empty() {
        return Err(ConfigError::NoAnswers(q.title.clone()).into());
    }
    let display_order = validated_permutation(&q.display_order, q.answers.len(), rng)?;

    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;

    let spec = MetadataSpec {
        question_type: "Ordering",
        partial_credit: "true",
        number_type: "letter_lower",
        ..Default::default()
    };
    let mut item = Element::new("item")
        .attr("title", &q.title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), &spec));

    let idents: Vec<String> = q.answers.iter().map(|_| answer_ident()).collect();
    let mut render_choice = Element::new("render_choice")
        .attr("shuffle", "No")
        .attr("minnumber", "0")
        .attr("maxnumber", "0");
    let mut answers_preview = String::new();
    for &index in &display_order {
        let processed = pkg.process_text(&q.answers[index])?;
        render_choice = render_choice.child(
            Element::new("flow_label").attr("class", "Block").child(
                Element::new("response_label")
                    .attr("ident", &idents[index])
                    .attr("shuffle", "Yes")
                    .attr("rarea", "Ellipse")
                    .attr("rrange", "Exact")
                    .child(flow_formatted(&processed.package)),
            ),
        );
        answers_preview.push_str(&format!(
            "<li value=\"{}\">{}</li>",
            index + 1,
            processed.preview
        ));
    }
    let response = Element::new("flow").attr("class", "RESPONSE_BLOCK").child(
        Element::new("response_lid")
            .attr("ident", "response")
            .attr("rcardinality", "Ordered")
            .attr("rtiming", "No")
            .child(render_choice),
    );
    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(response),
        ),
    );

    // Full credit iff the submitted sequence equals the original
    // identifier sequence, position by position.
    let mut all = Element::new("and");
    for ident in &idents {
        all = all.child(
            Element::new("varequal")
                .attr("respident", "response")
                .attr("case", "No")
                .text(ident),
        );
    }
    item = item.child(
        Element::new("resprocessing")
            .attr("scoremodel", "SumOfScores")
            .child(outcomes())
            .child(
                Element::new("respcondition")
                    .attr("title", "correct")
                    .child(Element::new("conditionvar").child(all))
                    .child(setvar_score("SCORE.max"))
                    .child(display_feedback("correct")),
            )
            .child(incorrect_condition()),
    );

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));

    let preview = format!(
        "<li>{}<ol>{}</ol>{}</li>",
        stem.preview,
        answers_preview,
        feedback.preview_footer()
    );
    Ok(EncodedQuestion { item, preview })
}

pub(crate) fn encode_matching(
    pkg: &mut Package,
    q: &MatchingQuestion,
) -> QuestionResult<EncodedQuestion> {
    if q.pairs.is_empty() {
        return Err(ConfigError::NoPairs(q.title.clone()).into());
    }
    let positive_weight = 100.0 / q.pairs.len() as f64;

    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;

    let spec = MetadataSpec {
        question_type: "Matching",
        partial_credit: "true",
        negative_points: "Q",
        number_type: "letter_upper",
        ..Default::default()
    };
    let mut item = Element::new("item")
        .attr("title", &q.title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), &spec));

    let right_count = q.pairs.len() + q.distractors.len();
    let mut left_idents = Vec::with_capacity(q.pairs.len());
    let mut choice_idents: Vec<Vec<String>> = Vec::with_capacity(q.pairs.len());
    let mut response = Element::new("flow").attr("class", "RESPONSE_BLOCK");
    let mut answers_preview = String::new();

    for (index, (left, right)) in q.pairs.iter().enumerate() {
        let left_ident = answer_ident();
        let idents: Vec<String> = (0..right_count).map(|_| answer_ident()).collect();

        let mut flow_label = Element::new("flow_label").attr("class", "Block");
        for ident in &idents {
            flow_label = flow_label.child(
                Element::new("response_label")
                    .attr("ident", ident)
                    .attr("shuffle", "Yes")
                    .attr("rarea", "Ellipse")
                    .attr("rrange", "Exact"),
            );
        }
        let processed_left = pkg.process_text(left)?;
        response = response.child(
            Element::new("flow")
                .attr("class", "Block")
                .child(
                    Element::new("response_lid")
                        .attr("ident", &left_ident)
                        .attr("rcardinality", "Single")
                        .attr("rtiming", "No")
                        .child(
                            Element::new("render_choice")
                                .attr("shuffle", "Yes")
                                .attr("minnumber", "0")
                                .attr("maxnumber", "0")
                                .child(flow_label),
                        ),
                )
                .child(
                    Element::new("flow")
                        .attr("class", "FORMATTED_TEXT_BLOCK")
                        .child(material(&processed_left.package)),
                ),
        );
        answers_preview.push_str(&format!(
            "<li value=\"{}\">{}</li>",
            index + 1,
            processed_left.preview
        ));
        let processed_right = pkg.process_text(right)?;
        answers_preview.push_str(&format!(
            "<li class=\"correct\">{}</li>",
            processed_right.preview
        ));

        left_idents.push(left_ident);
        choice_idents.push(idents);
    }

    // Right-hand column: the paired answers followed by distractors.
    let mut right_block = Element::new("flow").attr("class", "RIGHT_MATCH_BLOCK");
    for (_, right) in &q.pairs {
        let processed = pkg.process_text(right)?;
        right_block = right_block.child(
            Element::new("flow").attr("class", "Block").child(
                Element::new("flow")
                    .attr("class", "FORMATTED_TEXT_BLOCK")
                    .child(material(&processed.package)),
            ),
        );
    }
    for distractor in &q.distractors {
        let processed = pkg.process_text(distractor)?;
        right_block = right_block.child(
            Element::new("flow").attr("class", "Block").child(
                Element::new("flow")
                    .attr("class", "FORMATTED_TEXT_BLOCK")
                    .child(material(&processed.package)),
            ),
        );
        answers_preview.push_str(&format!(
            "<li class=\"incorrect\">{}</li>",
            processed.preview
        ));
    }

    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(response)
                .child(right_block),
        ),
    );

    // Each correct pairing contributes its share independently; the
    // credit assignment is encoded once per pairing.
    let mut resprocessing = Element::new("resprocessing")
        .attr("scoremodel", "SumOfScores")
        .child(outcomes());
    for (index, left_ident) in left_idents.iter().enumerate() {
        resprocessing = resprocessing.child(
            Element::new("respcondition")
                .child(
                    Element::new("conditionvar").child(
                        Element::new("varequal")
                            .attr("respident", left_ident)
                            .attr("case", "No")
                            .text(&choice_idents[index][index]),
                    ),
                )
                .child(
                    Element::new("setvar")
                        .attr("PartialCreditPercent", "SCORE")
                        .attr("action", "Set")
                        .text(format!("{:.2}", positive_weight)),
                )
                .child(
                    Element::new("setvar")
                        .attr("NegativeCreditPercent", "SCORE")
                        .attr("action", "Set")
                        .text(format!("{:.2}", q.negative_weight)),
                )
                .child(display_feedback("correct")),
        );
    }
    resprocessing = resprocessing.child(incorrect_condition());
    item = item.child(resprocessing);

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));

    let preview = format!(
        "<li>{}<ol>{}</ol>{}</li>",
        stem.preview,
        answers_preview,
        feedback.preview_footer()
    );
    Ok(EncodedQuestion { item, preview })
}
