//! Unicode-math tokenizer: locates math spans, maps Unicode mathematical
//! characters to LaTeX and wraps them with inline or display delimiters.

mod density;
mod segment;
mod symbols;

pub use density::{is_inline_math, math_density, strong_indicator_count};
pub use segment::{find_inline_spans, MathProcessor, MathSegment};
pub use symbols::{
    is_greek, is_operator, is_relation_operator, is_strong_indicator, subscript_char,
    superscript_char, unicode_to_latex, GREEK, OPERATORS, SUBSCRIPTS, SUPERSCRIPTS,
};
