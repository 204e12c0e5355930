//! Fill-in-the-blank questions
//!
//! One or more named blanks, each with a set of acceptable regex
//! patterns. Grading is AND across blanks and OR within a blank's
//! alternatives: full credit only when every blank matches at least one
//! of its patterns, zero otherwise.

use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::xml::Element;

use super::errors::{ConfigError, QuestionResult};
use super::{
    asi_metadata, display_feedback, incorrect_condition, item_feedback, outcomes, process_feedback,
    question_block, setvar_score, EncodedQuestion, Feedback, MetadataSpec,
};

/// One named blank and its acceptable answer patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blank {
    pub name: String,
    pub patterns: Vec<String>,
}

impl Blank {
    pub fn new(name: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }
}

/// A fill-in-the-blank question with regex-graded blanks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillInBlankQuestion {
    pub title: String,
    pub text: String,
    pub blanks: Vec<Blank>,
    pub feedback: Feedback,
}

impl FillInBlankQuestion {
    pub fn new(title: impl Into<String>, text: impl Into<String>, blanks: Vec<Blank>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            blanks,
            feedback: Feedback::default(),
        }
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

pub(crate) fn encode_fill_in_blank(
    pkg: &mut Package,
    q: &FillInBlankQuestion,
) -> QuestionResult<EncodedQuestion> {
    if q.blanks.is_empty() {
        return Err(ConfigError::NoBlanks(q.title.clone()).into());
    }
    for blank in &q.blanks {
        if blank.patterns.is_empty() {
            return Err(ConfigError::EmptyBlank(blank.name.clone()).into());
        }
    }

    let stem = pkg.process_text(&q.text)?;
    let feedback = process_feedback(pkg, &q.feedback)?;

    let spec = MetadataSpec {
        question_type: "Fill in the Blank Plus",
        partial_credit: "true",
        ..Default::default()
    };
    let mut item = Element::new("item")
        .attr("title", &q.title)
        .attr("maxattempts", "0")
        .child(asi_metadata(pkg.next_object_id(), &spec));

    let mut response = Element::new("flow").attr("class", "RESPONSE_BLOCK");
    for blank in &q.blanks {
        response = response.child(
            Element::new("response_str")
                .attr("ident", &blank.name)
                .attr("rcardinality", "Single")
                .attr("rtiming", "No")
                .child(
                    Element::new("render_choice")
                        .attr("charset", "us-ascii")
                        .attr("columns", "0")
                        .attr("encoding", "UTF_8")
                        .attr("fibtype", "String")
                        .attr("maxchars", "0")
                        .attr("maxnumber", "0")
                        .attr("minnumber", "0")
                        .attr("prompt", "Box")
                        .attr("rows", "0"),
                ),
        );
    }
    item = item.child(
        Element::new("presentation").child(
            Element::new("flow")
                .attr("class", "Block")
                .child(question_block(&stem.package))
                .child(response),
        ),
    );

    // AND across blanks, OR within each blank's pattern set.
    let mut all = Element::new("and");
    let mut answers_preview = String::new();
    for blank in &q.blanks {
        let mut any = Element::new("or");
        for pattern in &blank.patterns {
            any = any.child(
                Element::new("varsubset")
                    .attr("respident", &blank.name)
                    .attr("setmatch", "Matches")
                    .text(pattern),
            );
        }
        all = all.child(any);
        answers_preview.push_str(&format!(
            "<li class=\"correct\">{}: {}</li>",
            blank.name,
            blank.patterns.join(" | ")
        ));
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
        "<li>{}<ul>{}</ul>{}</li>",
        stem.preview,
        answers_preview,
        feedback.preview_footer()
    );
    Ok(EncodedQuestion { item, preview })
}
