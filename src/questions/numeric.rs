//! Numeric questions
//!
//! A numeric answer is graded against an inclusive `[low, high]` range.
//! Callers specify the range as a symmetric fractional tolerance, a
//! symmetric absolute tolerance, or explicit bounds; all three forms
//! normalize to the same encoding.

use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::xml::Element;

use super::errors::{ConfigError, ConfigResult, QuestionResult};
use super::{
    asi_metadata, display_feedback, incorrect_condition, item_feedback, outcomes, process_feedback,
    question_block, setvar_score, EncodedQuestion, Feedback, MetadataSpec,
};

/// Accepted-answer range specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tolerance {
    /// Symmetric fractional tolerance around the answer: `0.1` accepts
    /// anything within ten percent.
    Fraction(f64),
    /// Symmetric absolute tolerance around the answer.
    Absolute(f64),
    /// Explicit inclusive bounds.
    Bounds { low: f64, high: f64 },
}

impl Tolerance {
    /// Normalizes to inclusive `[low, high]` bounds. The fractional form
    /// must sort its endpoints: for a negative answer, `answer·(1−f)` is
    /// the larger value.
    pub fn bounds_for(&self, answer: f64) -> ConfigResult<(f64, f64)> {
        match *self {
            Tolerance::Fraction(fraction) => {
                let a = answer * (1.0 - fraction);
                let b = answer * (1.0 + fraction);
                Ok((a.min(b), a.max(b)))
            }
            Tolerance::Absolute(amount) => Ok((answer - amount.abs(), answer + amount.abs())),
            Tolerance::Bounds { low, high } => {
                if low > high {
                    Err(ConfigError::ReversedBounds { low, high })
                } else {
                    Ok((low, high))
                }
            }
        }
    }
}

/// A numeric question with a toleranced answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericQuestion {
    pub title: String,
    pub text: String,
    pub answer: f64,
    pub tolerance: Tolerance,
    pub feedback: Feedback,
}

impl NumericQuestion {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        answer: f64,
        tolerance: Tolerance,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            answer,
            tolerance,
            feedback: Feedback::default(),
        }
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

pub(crate) fn encode_numeric(
    pkg: &mut Package,
    q: &NumericQuestion,
) -> QuestionResult<EncodedQuestion> {
    let (low, high) = q.tolerance.bounds_for(q.answer)?;
    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;

    let spec = MetadataSpec {
        question_type: "Numeric",
        ..Default::default()
    };
    let mut item = Element::new("item")
        .attr("title", &q.title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), &spec));

    let response = Element::new("flow").attr("class", "RESPONSE_BLOCK").child(
        Element::new("response_num")
            .attr("ident", "response")
            .attr("rcardinality", "Single")
            .attr("rtiming", "No")
            .child(
                Element::new("render_fib")
                    .attr("charset", "us-ascii")
                    .attr("encoding", "UTF_8")
                    .attr("rows", "0")
                    .attr("columns", "0")
                    .attr("maxchars", "0")
                    .attr("prompt", "Box")
                    .attr("fibtype", "Decimal")
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

    let correct = Element::new("respcondition")
        .attr("title", "correct")
        .child(
            Element::new("conditionvar")
                .child(
                    Element::new("vargte")
                        .attr("respident", "response")
                        .text(low.to_string()),
                )
                .child(
                    Element::new("varlte")
                        .attr("respident", "response")
                        .text(high.to_string()),
                )
                .child(
                    Element::new("varequal")
                        .attr("respident", "response")
                        .attr("case", "No")
                        .text(q.answer.to_string()),
                ),
        )
        .child(setvar_score("SCORE.max"))
        .child(display_feedback("correct"));
    item = item.child(
        Element::new("resprocessing")
            .attr("scoremodel", "SumOfScores")
            .child(outcomes())
            .child(correct)
            .child(incorrect_condition()),
    );

    item = item
        .child(item_feedback("correct", &feedback.bb_positive))
        .child(item_feedback("incorrect", &feedback.bb_negative));

    let preview = format!(
        "<li>{}<ul><li class=\"correct\"><b>{} &le; Answer &le; {}</b>:{}</li>\
         <li class=\"incorrect\"><b>Else</b>:{}</li></ul></li>",
        stem.preview, low, high, feedback.html_positive, feedback.html_negative
    );

    Ok(EncodedQuestion { item, preview })
}
