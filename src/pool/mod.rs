//! Pool and test assembly
//!
//! A pool accumulates encoded questions and, on close, registers its
//! document as a package resource (optionally with an HTML preview). A
//! test composes closed pools into randomly drawn, point-weighted
//! subsections. Closing consumes the value, so nothing can be added to
//! a closed pool or test.

mod preview;

pub use test::{Test, TestOptions};

use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::package::{Package, PackageResult};
use crate::questions::{
    self, CalcOutcome, CalculatedNumericQuestion, FillInBlankQuestion, MatchingQuestion,
    MultipleAnswerQuestion, MultipleChoiceQuestion, NumericQuestion, OrderingQuestion,
    QuestionResult, ShortResponseQuestion, TrueFalseQuestion,
};
use crate::questions::{asi_metadata, EncodedQuestion, MetadataSpec};
use crate::xml::Element;

use std::collections::BTreeMap;

/// Pool behavior knobs. The test-related fields only matter for pools
/// attached to a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolOptions {
    pub description: String,
    pub instructions: String,
    /// Write a `<name>_preview.html` entry on close.
    pub preview: bool,
    /// Marks per drawn question when the pool feeds a test section.
    pub points_per_question: f64,
    /// Questions drawn per attempt when the pool feeds a test section.
    pub questions_per_test: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            description: "Created by quizpack".to_string(),
            instructions: String::new(),
            preview: false,
            points_per_question: 10.0,
            questions_per_test: 1,
        }
    }
}

/// A closed pool: everything a test section or caller needs to refer
/// back to it.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    pub name: String,
    /// Manifest resource id of the registered pool document.
    pub resource_id: String,
    pub points_per_question: f64,
    pub questions_per_test: usize,
    pub(crate) preview_items: Vec<String>,
}

/// An open question pool.
pub struct Pool {
    name: String,
    options: PoolOptions,
    assessment_object_id: u64,
    section_object_id: u64,
    items: Vec<Element>,
    preview_items: Vec<String>,
}

impl Pool {
    /// Opens a pool. Identifier allocation happens here, so open order
    /// is reflected in the generated metadata ids.
    pub fn new(pkg: &mut Package, name: impl Into<String>, options: PoolOptions) -> Self {
        Self {
            name: name.into(),
            options,
            assessment_object_id: pkg.next_object_id(),
            section_object_id: pkg.next_object_id(),
            items: Vec::new(),
            preview_items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn question_count(&self) -> usize {
        self.items.len()
    }

    fn append(&mut self, encoded: EncodedQuestion) {
        self.items.push(encoded.item);
        self.preview_items.push(encoded.preview);
    }

    pub fn add_numeric(&mut self, pkg: &mut Package, q: NumericQuestion) -> QuestionResult<()> {
        self.append(questions::encode_numeric(pkg, &q)?);
        tracing::info!(title = %q.title, "added numeric question");
        Ok(())
    }

    pub fn add_multiple_choice(
        &mut self,
        pkg: &mut Package,
        q: MultipleChoiceQuestion,
    ) -> QuestionResult<()> {
        self.append(questions::encode_multiple_choice(pkg, &q)?);
        tracing::info!(title = %q.title, "added multiple choice question");
        Ok(())
    }

    pub fn add_multiple_answer(
        &mut self,
        pkg: &mut Package,
        q: MultipleAnswerQuestion,
    ) -> QuestionResult<()> {
        self.append(questions::encode_multiple_answer(pkg, &q)?);
        tracing::info!(title = %q.title, "added multiple answer question");
        Ok(())
    }

    pub fn add_true_false(&mut self, pkg: &mut Package, q: TrueFalseQuestion) -> QuestionResult<()> {
        self.append(questions::encode_true_false(pkg, &q)?);
        tracing::info!(title = %q.title, "added true/false question");
        Ok(())
    }

    pub fn add_short_response(
        &mut self,
        pkg: &mut Package,
        q: ShortResponseQuestion,
    ) -> QuestionResult<()> {
        self.append(questions::encode_short_response(pkg, &q)?);
        tracing::info!(title = %q.title, "added short response question");
        Ok(())
    }

    pub fn add_fill_in_blank(
        &mut self,
        pkg: &mut Package,
        q: FillInBlankQuestion,
    ) -> QuestionResult<()> {
        self.append(questions::encode_fill_in_blank(pkg, &q)?);
        tracing::info!(title = %q.title, "added fill-in-blank question");
        Ok(())
    }

    pub fn add_ordering(&mut self, pkg: &mut Package, q: OrderingQuestion) -> QuestionResult<()> {
        self.append(questions::encode_ordering(pkg, &q, &mut thread_rng())?);
        tracing::info!(title = %q.title, "added ordering question");
        Ok(())
    }

    pub fn add_matching(&mut self, pkg: &mut Package, q: MatchingQuestion) -> QuestionResult<()> {
        self.append(questions::encode_matching(pkg, &q)?);
        tracing::info!(title = %q.title, "added matching question");
        Ok(())
    }

    /// Draws `q.count` accepted parameter combinations and adds one
    /// numeric question per draw. Rejected draws (the calculation
    /// returned `None`) are redrawn, not counted.
    pub fn add_calculated_numeric(
        &mut self,
        pkg: &mut Package,
        mut q: CalculatedNumericQuestion,
        mut calc: impl FnMut(&BTreeMap<String, f64>) -> Option<CalcOutcome>,
    ) -> QuestionResult<()> {
        let generated = questions::expand_calculated(&mut q, &mut calc, &mut thread_rng())?;
        for question in generated {
            self.add_numeric(pkg, question)?;
        }
        Ok(())
    }

    /// Finalizes the pool document, registers it as a package resource,
    /// and writes the preview entry when configured. Consumes the pool;
    /// no questions can be added afterwards.
    pub fn close(self, pkg: &mut Package) -> PackageResult<PoolHandle> {
        let assessment_spec = MetadataSpec {
            asi_type: "Assessment",
            score_max: "0".to_string(),
            ..Default::default()
        };
        let section_spec = MetadataSpec {
            asi_type: "Section",
            score_max: "0".to_string(),
            ..Default::default()
        };

        let mut section =
            Element::new("section").child(asi_metadata(self.section_object_id, &section_spec));
        for item in self.items {
            section = section.child(item);
        }

        let assessment = Element::new("assessment")
            .attr("title", &self.name)
            .child(asi_metadata(self.assessment_object_id, &assessment_spec))
            .child(
                Element::new("rubric")
                    .attr("view", "All")
                    .child(flow_mat_material(&self.options.instructions)),
            )
            .child(
                Element::new("presentation_material")
                    .child(flow_mat_material(&self.options.description)),
            )
            .child(section);
        let document = Element::new("questestinterop").child(assessment).to_document();

        if self.options.preview {
            let body = self.preview_items.concat();
            pkg.write_preview(
                &format!("{}_preview.html", self.name),
                &preview::document(&format!("Pool:{}", self.name), &body),
            )?;
        }

        let resource_id = pkg.register_resource(&self.name, "assessment/x-bb-qti-pool", &document)?;
        tracing::info!(pool = %self.name, resource = %resource_id, "closed pool");
        Ok(PoolHandle {
            name: self.name,
            resource_id,
            points_per_question: self.options.points_per_question,
            questions_per_test: self.options.questions_per_test,
            preview_items: self.preview_items,
        })
    }

    /// Closes the pool and registers it as a scored subsection of
    /// `test` in one step.
    pub fn close_into(self, pkg: &mut Package, test: &mut Test) -> PackageResult<PoolHandle> {
        let handle = self.close(pkg)?;
        test.attach(pkg, &handle);
        Ok(handle)
    }
}

/// `flow_mat[Block] > material` used by rubric and description blocks.
pub(crate) fn flow_mat_material(text: &str) -> Element {
    Element::new("flow_mat")
        .attr("class", "Block")
        .child(questions::material(text))
}
