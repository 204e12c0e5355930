//! Calculated numeric questions
//!
//! A generator over the numeric encoder: each emitted question is one
//! random draw of the declared variables, run through a caller-supplied
//! pure calculation, with `[name]` placeholders substituted into the
//! stem and feedback. Draws the calculation rejects are redrawn rather
//! than counted, so exactly `count` questions come out.

use std::collections::BTreeMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::errors::{ConfigError, ConfigResult};
use super::numeric::{NumericQuestion, Tolerance};
use super::Feedback;

/// Hard ceiling on rejected draws before the generator gives up; a
/// calculation that rejects everything would otherwise loop forever.
const MAX_REJECTED_DRAWS: usize = 10_000;

/// How one question variable is drawn.
pub enum RandomVariable {
    /// Sampled from a caller-supplied distribution and rounded to the
    /// given number of significant figures.
    Distribution {
        sample: Box<dyn FnMut(&mut dyn RngCore) -> f64>,
        sig_figs: u32,
    },
    /// Chosen uniformly from a discrete candidate list.
    Choices(Vec<f64>),
}

impl RandomVariable {
    pub fn distribution(
        sig_figs: u32,
        sample: impl FnMut(&mut dyn RngCore) -> f64 + 'static,
    ) -> Self {
        Self::Distribution {
            sample: Box::new(sample),
            sig_figs,
        }
    }

    pub fn choices(values: Vec<f64>) -> Self {
        Self::Choices(values)
    }
}

impl fmt::Debug for RandomVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distribution { sig_figs, .. } => f
                .debug_struct("Distribution")
                .field("sig_figs", sig_figs)
                .finish_non_exhaustive(),
            Self::Choices(values) => f.debug_tuple("Choices").field(values).finish(),
        }
    }
}

/// A value substituted for a `[name]` placeholder.
#[derive(Debug, Clone)]
pub enum VarValue {
    Number(f64),
    /// Pre-formatted text, e.g. a LaTeX expression for a derived value.
    Text(String),
}

impl VarValue {
    fn render(&self) -> String {
        match self {
            VarValue::Number(value) => value.to_string(),
            VarValue::Text(text) => text.clone(),
        }
    }
}

/// What the calculation returns for one accepted draw.
#[derive(Debug, Clone, Default)]
pub struct CalcOutcome {
    /// Derived values to substitute alongside the drawn variables.
    pub values: BTreeMap<String, VarValue>,
    /// The graded answer; also substituted as `[answer]`.
    pub answer: f64,
    /// Per-draw override of the absolute tolerance.
    pub abs_error: Option<f64>,
}

/// Template for a batch of generated numeric questions.
pub struct CalculatedNumericQuestion {
    pub title: String,
    pub text: String,
    pub variables: BTreeMap<String, RandomVariable>,
    /// How many questions to emit. Rejected draws do not count.
    pub count: usize,
    pub tolerance: Tolerance,
    pub feedback: Feedback,
}

impl CalculatedNumericQuestion {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        variables: BTreeMap<String, RandomVariable>,
        count: usize,
        tolerance: Tolerance,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            variables,
            count,
            tolerance,
            feedback: Feedback::default(),
        }
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Expands the template into `count` concrete numeric questions. The
/// calculation sees each draw and either returns an outcome or `None`
/// to reject the combination, which triggers a fresh draw.
pub(crate) fn expand(
    q: &mut CalculatedNumericQuestion,
    calc: &mut dyn FnMut(&BTreeMap<String, f64>) -> Option<CalcOutcome>,
    rng: &mut dyn RngCore,
) -> ConfigResult<Vec<NumericQuestion>> {
    let mut emitted = Vec::with_capacity(q.count);
    let mut rejected = 0usize;

    while emitted.len() < q.count {
        let mut drawn: BTreeMap<String, f64> = BTreeMap::new();
        for (name, variable) in q.variables.iter_mut() {
            let value = match variable {
                RandomVariable::Distribution { sample, sig_figs } => {
                    round_sf(sample(rng), *sig_figs)
                }
                RandomVariable::Choices(values) => *values
                    .choose(rng)
                    .ok_or_else(|| ConfigError::NoChoices(name.clone()))?,
            };
            drawn.insert(name.clone(), value);
        }

        let Some(outcome) = calc(&drawn) else {
            rejected += 1;
            if rejected > MAX_REJECTED_DRAWS {
                return Err(ConfigError::DrawsExhausted(rejected));
            }
            continue;
        };

        let mut values: BTreeMap<String, VarValue> = drawn
            .into_iter()
            .map(|(name, value)| (name, VarValue::Number(value)))
            .collect();
        values.extend(outcome.values);
        values.insert("answer".to_string(), VarValue::Number(outcome.answer));

        let tolerance = match outcome.abs_error {
            Some(amount) => Tolerance::Absolute(amount),
            None => q.tolerance.clone(),
        };

        emitted.push(
            NumericQuestion::new(
                q.title.clone(),
                substitute(&q.text, &values),
                outcome.answer,
                tolerance,
            )
            .feedback(Feedback {
                positive: substitute(&q.feedback.positive, &values),
                negative: substitute(&q.feedback.negative, &values),
            }),
        );
    }
    Ok(emitted)
}

fn substitute(template: &str, values: &BTreeMap<String, VarValue>) -> String {
    let mut out = template.to_string();
    for (name, value) in values {
        out = out.replace(&format!("[{}]", name), &value.render());
    }
    out
}

/// Rounds to the given number of significant figures.
pub fn round_sf(value: f64, sig_figs: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = sig_figs.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    (value * factor).round() / factor
}

/// Regex accepting a number written to `sig_figs` significant figures of
/// `value`, for grading numeric answers typed into fill-in-blank
/// questions. Digits beyond the significant ones are unconstrained.
pub fn significant_figure_pattern(value: f64, sig_figs: u32) -> String {
    let sf = sig_figs.max(1) as usize;
    let mut pattern = String::from("^[ ]*");
    pattern.push_str(if value < 0.0 { "-" } else { r"\+?" });

    let digits = round_sf(value.abs(), sig_figs).to_string();
    let dot_index = digits.find('.').unwrap_or(digits.len());

    if digits.starts_with('0') {
        // 0.xxx form: the leading zeros then up to sf significant digits
        // must appear; anything after is free.
        let mut prefix = String::from("0");
        if let Some(fraction) = digits.strip_prefix("0.") {
            let zeros = fraction.len() - fraction.trim_start_matches('0').len();
            let take = zeros + (fraction.len() - zeros).min(sf);
            prefix.push('.');
            prefix.push_str(&fraction[..take]);
        }
        pattern.push_str(&prefix.replace('.', r"\."));
        pattern.push_str("[0-9]*[ ]*");
    } else if dot_index >= sf {
        // All significant digits sit left of the decimal point; the
        // remaining integer digits are free.
        pattern.push_str(&digits[..sf]);
        pattern.push_str(&format!("[0-9]{{{}}}", dot_index - sf));
        pattern.push_str(r"(\.|($|[ ]+))");
    } else {
        // The decimal point falls inside the significant digits.
        let take = digits.len().min(sf + 1);
        pattern.push_str(&digits[..take].replace('.', r"\."));
    }
    pattern
}
