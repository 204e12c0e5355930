//! quizpack - a deterministic Blackboard/QTI quiz content package builder
//!
//! Builds importable question pools and tests: questions are encoded
//! into the legacy `questestinterop` dialect, rich text is scanned for
//! inline images and `$`/`$$` LaTeX spans (rendered through a pluggable
//! typesetter and embedded exactly once per distinct content), and
//! everything lands in a ZIP container with an IMS manifest plus HTML
//! previews.
//!
//! ```no_run
//! use quizpack::{MultipleChoiceQuestion, Package, PackageConfig, Pool, PoolOptions};
//! # fn renderer() -> Box<dyn quizpack::EquationRenderer> { unimplemented!() }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::create("COURSE.zip", PackageConfig::default(), renderer())?;
//! let mut pool = Pool::new(&mut pkg, "Algebra", PoolOptions::default());
//! pool.add_multiple_choice(
//!     &mut pkg,
//!     MultipleChoiceQuestion::new(
//!         "Q1",
//!         "What is $x$ if $$x + 1 = 3$$?",
//!         vec!["1".into(), "2".into(), "3".into()],
//!         1,
//!     ),
//! )?;
//! pool.close(&mut pkg)?;
//! pkg.close()?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod container;
pub mod content;
pub mod package;
pub mod pool;
pub mod questions;
pub mod xml;

mod ids;

pub use assets::{AssetError, AssetRef, AssetStore};
pub use container::{ContainerError, ContainerWriter, MemoryContainer, ZipContainer};
pub use content::{
    ContentError, EquationRenderer, LatexConfig, ProcessedText, RenderError, RenderedEquation,
};
pub use package::{Package, PackageConfig, PackageError, PackageResult};
pub use pool::{Pool, PoolHandle, PoolOptions, Test, TestOptions};
pub use questions::{
    Blank, CalcOutcome, CalculatedNumericQuestion, ConfigError, Feedback, FillInBlankQuestion,
    MatchingQuestion, MultipleAnswerQuestion, MultipleChoiceQuestion, NumericQuestion,
    OrderingQuestion, QuestionError, RandomVariable, ShortResponseQuestion, Tolerance,
    TrueFalseQuestion, VarValue,
};
