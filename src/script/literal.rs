use crate::graph::Literal;
use itertools::Itertools;
use std::fmt::{self, Write};

/// Python reserved words; never valid as a bare identifier.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Renders a literal as Python source, preserving its type.
pub struct PyLiteral<'a>(pub &'a Literal);

impl fmt::Display for PyLiteral<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Literal::Null => f.write_str("None"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::UInt(u) => write!(f, "{}", u),
            Literal::Float(x) => write_float(f, *x),
            Literal::String(s) => write_string(f, s),
            Literal::List(items) => {
                write!(f, "[{}]", items.iter().map(PyLiteral).join(", "))
            }
            Literal::Map(fields) => {
                f.write_char('{')?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_string(f, key)?;
                    write!(f, ": {}", PyLiteral(value))?;
                }
                f.write_char('}')
            }
        }
    }
}

/// Shorthand for `PyLiteral(literal).to_string()`.
pub fn render_literal(literal: &Literal) -> String {
    PyLiteral(literal).to_string()
}

/// Renders `s` as a double-quoted Python string literal.
pub fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    // Writing into a String cannot fail
    let _ = write_string(&mut out, s);
    out
}

/// True when `name` can be used verbatim as a Python identifier (ASCII subset).
pub fn is_python_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic());
    starts_well
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !PYTHON_KEYWORDS.contains(&name)
}

fn write_float(f: &mut impl Write, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("float(\"nan\")")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "float(\"inf\")" } else { "-float(\"inf\")" })
    } else {
        // Debug keeps the decimal point ("1.0") so Python reads a float back
        write!(f, "{:?}", x)
    }
}

fn write_string(f: &mut impl Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 || c == '\u{7f}' => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
