//! Unicode-to-LaTeX mapping tables.
//!
//! Immutable process-wide tables, scanned linearly; fewer than 200
//! entries total. Uppercase Greek letters indistinguishable from Latin
//! map to the Latin letter, matching how LaTeX renders them.

/// Greek letters (plus variant forms) to LaTeX commands.
pub static GREEK: &[(char, &str)] = &[
    // Lowercase
    ('α', "\\alpha"),
    ('β', "\\beta"),
    ('γ', "\\gamma"),
    ('δ', "\\delta"),
    ('ε', "\\epsilon"),
    ('ζ', "\\zeta"),
    ('η', "\\eta"),
    ('θ', "\\theta"),
    ('ι', "\\iota"),
    ('κ', "\\kappa"),
    ('λ', "\\lambda"),
    ('μ', "\\mu"),
    ('ν', "\\nu"),
    ('ξ', "\\xi"),
    ('ο', "o"),
    ('π', "\\pi"),
    ('ρ', "\\rho"),
    ('ς', "\\varsigma"),
    ('σ', "\\sigma"),
    ('τ', "\\tau"),
    ('υ', "\\upsilon"),
    ('φ', "\\phi"),
    ('χ', "\\chi"),
    ('ψ', "\\psi"),
    ('ω', "\\omega"),
    // Variant forms
    ('ϑ', "\\vartheta"),
    ('ϕ', "\\phi"),
    ('ϵ', "\\epsilon"),
    ('ϖ', "\\varpi"),
    ('ϱ', "\\varrho"),
    // Uppercase with distinct glyphs
    ('Γ', "\\Gamma"),
    ('Δ', "\\Delta"),
    ('Θ', "\\Theta"),
    ('Λ', "\\Lambda"),
    ('Ξ', "\\Xi"),
    ('Π', "\\Pi"),
    ('Σ', "\\Sigma"),
    ('Φ', "\\Phi"),
    ('Ψ', "\\Psi"),
    ('Ω', "\\Omega"),
    // Uppercase that collides with Latin
    ('Α', "A"),
    ('Β', "B"),
    ('Ε', "E"),
    ('Ζ', "Z"),
    ('Η', "H"),
    ('Ι', "I"),
    ('Κ', "K"),
    ('Μ', "M"),
    ('Ν', "N"),
    ('Ο', "O"),
    ('Ρ', "P"),
    ('Τ', "T"),
    ('Υ', "Y"),
    ('Χ', "X"),
];

/// Superscript glyphs to their base characters, grouped into `^{…}`.
pub static SUPERSCRIPTS: &[(char, char)] = &[
    ('⁰', '0'),
    ('¹', '1'),
    ('²', '2'),
    ('³', '3'),
    ('⁴', '4'),
    ('⁵', '5'),
    ('⁶', '6'),
    ('⁷', '7'),
    ('⁸', '8'),
    ('⁹', '9'),
    ('⁺', '+'),
    ('⁻', '-'),
    ('⁼', '='),
    ('⁽', '('),
    ('⁾', ')'),
    ('ⁿ', 'n'),
    ('ⁱ', 'i'),
];

/// Subscript glyphs to their base characters, grouped into `_{…}`.
pub static SUBSCRIPTS: &[(char, char)] = &[
    ('₀', '0'),
    ('₁', '1'),
    ('₂', '2'),
    ('₃', '3'),
    ('₄', '4'),
    ('₅', '5'),
    ('₆', '6'),
    ('₇', '7'),
    ('₈', '8'),
    ('₉', '9'),
    ('₊', '+'),
    ('₋', '-'),
    ('₌', '='),
    ('₍', '('),
    ('₎', ')'),
    ('ₐ', 'a'),
    ('ₑ', 'e'),
    ('ₒ', 'o'),
    ('ₓ', 'x'),
    ('ₘ', 'm'),
    ('ₙ', 'n'),
];

/// Mathematical operators, relations, arrows, set and logic symbols,
/// calculus constructs, brackets and dots.
pub static OPERATORS: &[(char, &str)] = &[
    // Arithmetic
    ('×', "\\times"),
    ('÷', "\\div"),
    ('±', "\\pm"),
    ('∓', "\\mp"),
    ('⋅', "\\cdot"),
    ('∗', "\\ast"),
    ('∘', "\\circ"),
    // Relations
    ('≤', "\\leq"),
    ('≥', "\\geq"),
    ('≠', "\\neq"),
    ('≈', "\\approx"),
    ('≡', "\\equiv"),
    ('∼', "\\sim"),
    ('≃', "\\simeq"),
    ('≅', "\\cong"),
    ('∝', "\\propto"),
    ('≪', "\\ll"),
    ('≫', "\\gg"),
    // Analysis
    ('∞', "\\infty"),
    ('∂', "\\partial"),
    ('∇', "\\nabla"),
    ('ℏ', "\\hbar"),
    ('ℓ', "\\ell"),
    ('ℜ', "\\Re"),
    ('ℑ', "\\Im"),
    ('ℵ', "\\aleph"),
    // Set theory
    ('∈', "\\in"),
    ('∉', "\\notin"),
    ('∋', "\\ni"),
    ('⊂', "\\subset"),
    ('⊃', "\\supset"),
    ('⊆', "\\subseteq"),
    ('⊇', "\\supseteq"),
    ('∪', "\\cup"),
    ('∩', "\\cap"),
    ('∅', "\\emptyset"),
    ('∖', "\\setminus"),
    // Logic
    ('∧', "\\land"),
    ('∨', "\\lor"),
    ('¬', "\\neg"),
    ('∀', "\\forall"),
    ('∃', "\\exists"),
    ('∄', "\\nexists"),
    ('∴', "\\therefore"),
    ('∵', "\\because"),
    // Circled operators
    ('⊕', "\\oplus"),
    ('⊖', "\\ominus"),
    ('⊗', "\\otimes"),
    ('⊘', "\\oslash"),
    ('⊙', "\\odot"),
    // Geometry
    ('⊥', "\\perp"),
    ('∥', "\\parallel"),
    ('∠', "\\angle"),
    ('°', "^{\\circ}"),
    // Calculus
    ('∑', "\\sum"),
    ('∏', "\\prod"),
    ('∐', "\\coprod"),
    ('∫', "\\int"),
    ('∬', "\\iint"),
    ('∭', "\\iiint"),
    ('∮', "\\oint"),
    ('√', "\\sqrt"),
    // Arrows
    ('→', "\\rightarrow"),
    ('←', "\\leftarrow"),
    ('↔', "\\leftrightarrow"),
    ('⇒', "\\Rightarrow"),
    ('⇐', "\\Leftarrow"),
    ('⇔', "\\Leftrightarrow"),
    ('↦', "\\mapsto"),
    ('↑', "\\uparrow"),
    ('↓', "\\downarrow"),
    ('⟶', "\\longrightarrow"),
    ('⟵', "\\longleftarrow"),
    // Brackets
    ('⟨', "\\langle"),
    ('⟩', "\\rangle"),
    ('⌊', "\\lfloor"),
    ('⌋', "\\rfloor"),
    ('⌈', "\\lceil"),
    ('⌉', "\\rceil"),
    ('∣', "\\mid"),
    // Dots and primes
    ('…', "\\ldots"),
    ('⋯', "\\cdots"),
    ('⋮', "\\vdots"),
    ('⋱', "\\ddots"),
    ('′', "'"),
    ('″', "''"),
    // Blackboard sets
    ('ℕ', "\\mathbb{N}"),
    ('ℤ', "\\mathbb{Z}"),
    ('ℚ', "\\mathbb{Q}"),
    ('ℝ', "\\mathbb{R}"),
    ('ℂ', "\\mathbb{C}"),
];

/// Relation operators that make a standalone line look like an equation.
pub static RELATION_OPERATORS: &[char] = &[
    '=', '≤', '≥', '≠', '≈', '≃', '⇒', '→', '⇔', '↦', '∝',
];

/// Look up the LaTeX mapping for a Greek letter.
pub fn greek_to_latex(c: char) -> Option<&'static str> {
    GREEK.iter().find(|(g, _)| *g == c).map(|(_, l)| *l)
}

/// Look up the LaTeX mapping for an operator.
pub fn operator_to_latex(c: char) -> Option<&'static str> {
    OPERATORS.iter().find(|(o, _)| *o == c).map(|(_, l)| *l)
}

/// Look up the LaTeX mapping for any mapped math character.
pub fn unicode_to_latex(c: char) -> Option<&'static str> {
    greek_to_latex(c).or_else(|| operator_to_latex(c))
}

/// Base character of a superscript glyph.
pub fn superscript_char(c: char) -> Option<char> {
    SUPERSCRIPTS.iter().find(|(s, _)| *s == c).map(|(_, b)| *b)
}

/// Base character of a subscript glyph.
pub fn subscript_char(c: char) -> Option<char> {
    SUBSCRIPTS.iter().find(|(s, _)| *s == c).map(|(_, b)| *b)
}

/// Check if a character is a Greek letter in the table.
pub fn is_greek(c: char) -> bool {
    greek_to_latex(c).is_some()
}

/// Check if a character is a mapped operator.
pub fn is_operator(c: char) -> bool {
    operator_to_latex(c).is_some()
}

/// Strong math indicator: Greek, super/subscript, operator, caret or
/// underscore.
pub fn is_strong_indicator(c: char) -> bool {
    c == '^'
        || c == '_'
        || superscript_char(c).is_some()
        || subscript_char(c).is_some()
        || is_greek(c)
        || is_operator(c)
}

/// Check if a character is an equation-relation operator.
pub fn is_relation_operator(c: char) -> bool {
    RELATION_OPERATORS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_greek_entry_maps() {
        for (c, expected) in GREEK {
            let got = unicode_to_latex(*c).expect("greek letter must map");
            assert_eq!(got, *expected);
        }
    }

    #[test]
    fn test_every_operator_entry_maps() {
        for (c, expected) in OPERATORS {
            let got = unicode_to_latex(*c).expect("operator must map");
            assert_eq!(got, *expected);
        }
    }

    #[test]
    fn test_every_script_entry_maps() {
        for (c, _) in SUPERSCRIPTS {
            assert!(superscript_char(*c).is_some());
        }
        for (c, _) in SUBSCRIPTS {
            assert!(subscript_char(*c).is_some());
        }
    }

    #[test]
    fn test_latin_collision_mapping() {
        assert_eq!(greek_to_latex('Α'), Some("A"));
        assert_eq!(greek_to_latex('Ε'), Some("E"));
        assert_eq!(greek_to_latex('Γ'), Some("\\Gamma"));
    }

    #[test]
    fn test_strong_indicators() {
        assert!(is_strong_indicator('π'));
        assert!(is_strong_indicator('²'));
        assert!(is_strong_indicator('₃'));
        assert!(is_strong_indicator('∑'));
        assert!(is_strong_indicator('^'));
        assert!(!is_strong_indicator('a'));
        assert!(!is_strong_indicator('='));
    }

    #[test]
    fn test_table_sizes() {
        assert!(GREEK.len() >= 50);
        assert!(OPERATORS.len() >= 80);
        assert!(SUPERSCRIPTS.len() >= 12);
        assert!(SUBSCRIPTS.len() >= 12);
    }
}
