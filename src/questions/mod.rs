//! Question encoding subsystem
//!
//! One encoder per question type, each assembling the response and
//! scoring XML for the Blackboard `questestinterop` dialect plus a
//! preview list item. Encoders are fail-fast: every text field is
//! processed and every parameter validated before the finished `<item>`
//! is handed back, so nothing partial can reach a pool document.
//!
//! The shared building blocks here (metadata key block, material/flow
//! wrappers, scoring scaffolds) mirror the shapes Blackboard emits in
//! its own pool exports; deviating from them breaks import.

mod arrangement;
mod calculated;
mod choice;
mod errors;
mod fitb;
mod numeric;
mod response;

pub use arrangement::{MatchingQuestion, OrderingQuestion};
pub use calculated::{
    round_sf, significant_figure_pattern, CalcOutcome, CalculatedNumericQuestion, RandomVariable,
    VarValue,
};
pub use choice::{MultipleAnswerQuestion, MultipleChoiceQuestion, TrueFalseQuestion};
pub use errors::{ConfigError, ConfigResult, QuestionError, QuestionResult};
pub use fitb::{Blank, FillInBlankQuestion};
pub use numeric::{NumericQuestion, Tolerance};
pub use response::ShortResponseQuestion;

pub(crate) use arrangement::{encode_matching, encode_ordering};
pub(crate) use calculated::expand as expand_calculated;
pub(crate) use choice::{encode_multiple_answer, encode_multiple_choice, encode_true_false};
pub(crate) use fitb::encode_fill_in_blank;
pub(crate) use numeric::encode_numeric;
pub(crate) use response::encode_short_response;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ContentError;
use crate::package::Package;
use crate::xml::Element;

/// Feedback texts shown after grading. Both pass through the inline
/// content processor, so they may carry images and math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub positive: String,
    pub negative: String,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            positive: "Good work".to_string(),
            negative: "That's not correct".to_string(),
        }
    }
}

/// A fully encoded question: the `<item>` fragment for the pool
/// document and the list item for the pool preview.
pub(crate) struct EncodedQuestion {
    pub item: Element,
    pub preview: String,
}

/// Values for the metadata key block every assessment object carries.
/// Defaults match a plain pool item; encoders override per type.
pub(crate) struct MetadataSpec<'a> {
    pub asi_type: &'a str,
    pub assessment_type: &'a str,
    pub section_type: &'a str,
    pub question_type: &'a str,
    pub score_max: String,
    pub weight: String,
    pub partial_credit: &'a str,
    pub negative_points: &'a str,
    pub number_type: &'a str,
    pub instructor_notes: &'a str,
}

impl Default for MetadataSpec<'_> {
    fn default() -> Self {
        Self {
            asi_type: "Item",
            assessment_type: "Pool",
            section_type: "Subsection",
            question_type: "Multiple Choice",
            score_max: "-1.0".to_string(),
            weight: "0".to_string(),
            partial_credit: "false",
            negative_points: "N",
            number_type: "none",
            instructor_notes: "",
        }
    }
}

/// Builds the `<assessmentmetadata>`/`<sectionmetadata>`/`<itemmetadata>`
/// block. Key order is fixed by the dialect.
pub(crate) fn asi_metadata(object_id: u64, spec: &MetadataSpec<'_>) -> Element {
    let mut metadata = Element::new(format!("{}metadata", spec.asi_type.to_lowercase()));
    for (key, value) in [
        ("bbmd_asi_object_id", format!("_{}_1", object_id)),
        ("bbmd_asitype", spec.asi_type.to_string()),
        ("bbmd_assessmenttype", spec.assessment_type.to_string()),
        ("bbmd_sectiontype", spec.section_type.to_string()),
        ("bbmd_questiontype", spec.question_type.to_string()),
        ("bbmd_is_from_cartridge", "false".to_string()),
        ("bbmd_is_disabled", "false".to_string()),
        ("bbmd_negative_points_ind", spec.negative_points.to_string()),
        ("bbmd_canvas_fullcrdt_ind", "false".to_string()),
        ("bbmd_all_fullcredit_ind", "false".to_string()),
        ("bbmd_numbertype", spec.number_type.to_string()),
        ("bbmd_partialcredit", spec.partial_credit.to_string()),
        ("bbmd_orientationtype", "vertical".to_string()),
        ("bbmd_is_extracredit", "false".to_string()),
        ("qmd_absolutescore_max", spec.score_max.clone()),
        ("qmd_weighting", spec.weight.clone()),
        ("qmd_instructornotes", spec.instructor_notes.to_string()),
    ] {
        metadata.push(Element::new(key).text(value));
    }
    metadata
}

/// `<material>` carrying HTML-formatted text.
pub(crate) fn material(text: &str) -> Element {
    Element::new("material").child(
        Element::new("mat_extension")
            .child(Element::new("mat_formattedtext").attr("type", "HTML").text(text)),
    )
}

/// `flow_mat[FORMATTED_TEXT_BLOCK] > material`.
pub(crate) fn flow_formatted(text: &str) -> Element {
    Element::new("flow_mat")
        .attr("class", "FORMATTED_TEXT_BLOCK")
        .child(material(text))
}

/// `flow_mat[Block] > flow_mat[FORMATTED_TEXT_BLOCK] > material`.
pub(crate) fn flow_block(text: &str) -> Element {
    Element::new("flow_mat")
        .attr("class", "Block")
        .child(flow_formatted(text))
}

/// `flow[QUESTION_BLOCK] > flow[FORMATTED_TEXT_BLOCK] > material` with
/// the processed question stem.
pub(crate) fn question_block(text: &str) -> Element {
    Element::new("flow").attr("class", "QUESTION_BLOCK").child(
        Element::new("flow")
            .attr("class", "FORMATTED_TEXT_BLOCK")
            .child(material(text)),
    )
}

/// `<outcomes>` block declaring the SCORE decision variable.
pub(crate) fn outcomes() -> Element {
    Element::new("outcomes").child(
        Element::new("decvar")
            .attr("varname", "SCORE")
            .attr("vartype", "Decimal")
            .attr("defaultval", "0")
            .attr("minvalue", "0"),
    )
}

pub(crate) fn setvar_score(value: &str) -> Element {
    Element::new("setvar")
        .attr("variablename", "SCORE")
        .attr("action", "Set")
        .text(value)
}

pub(crate) fn display_feedback(linkrefid: &str) -> Element {
    Element::new("displayfeedback")
        .attr("linkrefid", linkrefid)
        .attr("feedbacktype", "Response")
}

/// Catch-all zero-score branch every scoring block ends with.
pub(crate) fn incorrect_condition() -> Element {
    Element::new("respcondition")
        .attr("title", "incorrect")
        .child(Element::new("conditionvar").child(Element::new("other")))
        .child(setvar_score("0"))
        .child(display_feedback("incorrect"))
}

/// `<itemfeedback>` with a formatted text body.
pub(crate) fn item_feedback(ident: &str, text: &str) -> Element {
    Element::new("itemfeedback")
        .attr("ident", ident)
        .attr("view", "All")
        .child(flow_block(text))
}

/// Empty per-answer solution block the dialect expects after the
/// correct/incorrect feedback pair.
pub(crate) fn empty_solution(ident: &str) -> Element {
    Element::new("itemfeedback")
        .attr("ident", ident)
        .attr("view", "All")
        .child(
            Element::new("solution")
                .attr("view", "All")
                .attr("feedbackstyle", "Complete")
                .child(Element::new("solutionmaterial").child(flow_block(""))),
        )
}

/// Fresh non-positional answer identifier, so the rendering layer may
/// shuffle presentation without touching the scoring encoding.
pub(crate) fn answer_ident() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Both feedback texts run through the inline processor.
pub(crate) struct ProcessedFeedback {
    pub bb_positive: String,
    pub bb_negative: String,
    pub html_positive: String,
    pub html_negative: String,
    empty: bool,
}

impl ProcessedFeedback {
    /// Preview footer showing both feedback texts, or nothing when the
    /// caller supplied none.
    pub fn preview_footer(&self) -> String {
        if self.empty {
            String::new()
        } else {
            format!(
                "<div>+:{}</div><div>-:{}</div>",
                self.html_positive, self.html_negative
            )
        }
    }
}

pub(crate) fn process_feedback(
    pkg: &mut Package,
    feedback: &Feedback,
) -> Result<ProcessedFeedback, ContentError> {
    let positive = pkg.process_text(&feedback.positive)?;
    let negative = pkg.process_text(&feedback.negative)?;
    Ok(ProcessedFeedback {
        bb_positive: positive.package,
        bb_negative: negative.package,
        html_positive: positive.preview,
        html_negative: negative.preview,
        empty: feedback.positive.is_empty() && feedback.negative.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_block_key_order() {
        let spec = MetadataSpec {
            question_type: "Numeric",
            ..Default::default()
        };
        let xml = asi_metadata(3_191_883, &spec).to_xml();
        assert!(xml.starts_with("<itemmetadata><bbmd_asi_object_id>_3191883_1</bbmd_asi_object_id>"));
        assert!(xml.contains("<bbmd_questiontype>Numeric</bbmd_questiontype>"));
        assert!(xml.ends_with("<qmd_instructornotes></qmd_instructornotes></itemmetadata>"));
    }

    #[test]
    fn test_material_wraps_html_as_text() {
        let xml = material("<b>stem</b>").to_xml();
        assert!(xml.contains("&lt;b&gt;stem&lt;/b&gt;"));
    }

    #[test]
    fn test_answer_idents_are_unique() {
        assert_ne!(answer_ident(), answer_ident());
    }

    #[test]
    fn test_incorrect_condition_shape() {
        let xml = incorrect_condition().to_xml();
        assert!(xml.contains("<conditionvar><other/></conditionvar>"));
        assert!(xml.contains(r#"<setvar variablename="SCORE" action="Set">0</setvar>"#));
    }
}
