//! Short-response questions
//!
//! Ungraded free text: any submission scores full credit (the question
//! is self-graded or participation-style), but the scoring branch is
//! still encoded deterministically so automated grading never errors.
//! The sample answer appears as solution feedback only.

use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::xml::Element;

use super::errors::QuestionResult;
use super::{
    asi_metadata, display_feedback, incorrect_condition, item_feedback, material, outcomes,
    process_feedback, question_block, setvar_score, EncodedQuestion, Feedback, MetadataSpec,
};

/// A free-text question with a sample answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortResponseQuestion {
    pub title: String,
    pub text: String,
    /// Shown to graders and in previews; never used for scoring.
    pub sample_answer: String,
    /// Text-entry rows presented to the student.
    pub rows: u32,
    /// Character limit; zero means unlimited.
    pub max_chars: u32,
    pub feedback: Feedback,
}

impl ShortResponseQuestion {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            sample_answer: String::new(),
            rows: 3,
            max_chars: 0,
            feedback: Feedback::default(),
        }
    }

    pub fn sample_answer(mut self, answer: impl Into<String>) -> Self {
        self.sample_answer = answer.into();
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn max_chars(mut self, max_chars: u32) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

pub(crate) fn encode_short_response(
    pkg: &mut Package,
    q: &ShortResponseQuestion,
) -> QuestionResult<EncodedQuestion> {
    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;
    let sample = pkg.process_text(&q.sample_answer)?;

    let spec = MetadataSpec {
        question_type: "Short Response",
        ..Default::default()
    };
    let mut item = Element::new("item")
        .attr("title", &q.title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), &spec));

    let response = Element::new("flow").attr("class", "RESPONSE_BLOCK").child(
        Element::new("response_str")
            .attr("ident", "response")
            .attr("rcardinality", "Single")
            .attr("rtiming", "No")
            .child(
                Element::new("render_fib")
                    .attr("charset", "us-ascii")
                    .attr("encoding", "UTF_8")
                    .attr("rows", q.rows.to_string())
                    .attr("columns", "127")
                    .attr("maxchars", q.max_chars.to_string())
                    .attr("prompt", "Box")
                    .attr("fibtype", "String")
                    .attr("minnumber", "0")
                    .attr("maxnumber", "0"),
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

    // Unconditional full-credit branch: the empty conditionvar matches
    // any submission.
    item = item.child(
        Element::new("resprocessing")
            .attr("scoremodel", "SumOfScores")
            .child(outcomes())
            .child(
                Element::new("respcondition")
                    .attr("title", "correct")
                    .child(Element::new("conditionvar"))
                    .child(setvar_score("SCORE.max"))
                    .child(display_feedback("correct")),
            )
            .child(incorrect_condition()),
    );

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));
    item = item.child(
        Element::new("itemfeedback")
            .attr("ident", "solution")
            .attr("view", "All")
            .child(
                Element::new("solution")
                    .attr("view", "All")
                    .attr("feedbackstyle", "Complete")
                    .child(
                        Element::new("solutionmaterial").child(
                            Element::new("flow_mat")
                                .attr("class", "Block")
                                .child(material(&sample.package)),
                        ),
                    ),
            ),
    );

    let preview = format!(
        "<li>{}<ul><li class=\"correct\">Sample answer: {}</li></ul>{}</li>",
        stem.preview,
        sample.preview,
        feedback.preview_footer()
    );
    Ok(EncodedQuestion { item, preview })
}
