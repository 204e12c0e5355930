//! HTML preview scaffolding
//!
//! Previews are a convenience rendering of the same logical content the
//! package carries: one list item per question, with correct answers
//! highlighted. The styling matches what graders are used to seeing
//! from pool exports.

const PREVIEW_STYLE: &str = "<style>li.correct {list-style-type:none; background-color: #e6ffcc;}\n \
li.incorrect{list-style-type:none; background-color:#ffcccc} \
li.correct:before{content:'\\2713\\0020'; color: darkgreen}\n \
li.incorrect:before{content:'\\2718\\0020'; color: red}\n \
li::marker { vertical-align: top; } \
.pool {border: 1px solid black; padding: 0.5em}\n \
.pool ul li {border-bottom:1px solid black; padding: 0.5em} </style>";

/// Wraps accumulated body markup into a standalone preview document.
pub(crate) fn document(title: &str, body: &str) -> String {
    format!(
        "<html><head>{}</head><body><h1>{}</h1><ol class=\"mainlist\">{}</ol></body></html>",
        PREVIEW_STYLE, title, body
    )
}
