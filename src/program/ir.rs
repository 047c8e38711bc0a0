//! Kernel-body intermediate representation
//!
//! Templates build their kernel bodies as a statement list rather than
//! raw text; a separate deterministic emission pass renders source. This
//! keeps template logic assertable (bounds guards, lane guards, loop
//! structure) independent of textual formatting.

/// One statement in a kernel body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// A complete single-line statement, including its trailing `;`
    Line(String),
    /// A `//` comment line
    Comment(String),
    /// Blank separator line
    Blank,
    /// Conditional with optional else branch
    If {
        /// Condition expression text
        cond: String,
        /// Statements of the then-branch
        then_body: Vec<Stmt>,
        /// Statements of the else-branch (empty = no else)
        else_body: Vec<Stmt>,
    },
    /// Counted loop; bounds must be constant expressions so the legacy
    /// dialect can unroll
    For {
        /// Init clause, e.g. `int i = 0`
        init: String,
        /// Condition clause
        cond: String,
        /// Step clause, e.g. `i++`
        step: String,
        /// Loop body
        body: Vec<Stmt>,
    },
}

impl Stmt {
    /// Single-line statement from anything displayable.
    pub fn line(text: impl Into<String>) -> Self {
        Stmt::Line(text.into())
    }
}

/// A helper function emitted before `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperFn {
    /// Full signature, e.g. `float wrap_coord(int c, int extent)`
    pub signature: String,
    /// Function body
    pub body: Vec<Stmt>,
}

/// A template's kernel body: helper functions plus the `main` entry
/// point. Emission is deterministic; equal IR always renders to equal
/// text, which underwrites cache-key reuse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KernelIr {
    /// Helper functions, emitted in order before `main`
    pub helpers: Vec<HelperFn>,
    /// Statements of `void main()`
    pub main: Vec<Stmt>,
}

impl KernelIr {
    /// Empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Body with only `main` statements.
    pub fn with_main(main: Vec<Stmt>) -> Self {
        Self {
            helpers: Vec::new(),
            main,
        }
    }

    /// Render the body to source text.
    pub fn emit(&self) -> String {
        let mut out = String::new();
        for helper in &self.helpers {
            out.push_str(&helper.signature);
            out.push_str(" {\n");
            emit_stmts(&helper.body, 1, &mut out);
            out.push_str("}\n\n");
        }
        out.push_str("void main() {\n");
        emit_stmts(&self.main, 1, &mut out);
        out.push_str("}\n");
        out
    }
}

fn emit_stmts(stmts: &[Stmt], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    for stmt in stmts {
        match stmt {
            Stmt::Line(text) => {
                out.push_str(&pad);
                out.push_str(text);
                out.push('\n');
            }
            Stmt::Comment(text) => {
                out.push_str(&pad);
                out.push_str("// ");
                out.push_str(text);
                out.push('\n');
            }
            Stmt::Blank => out.push('\n'),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                out.push_str(&pad);
                out.push_str("if (");
                out.push_str(cond);
                out.push_str(") {\n");
                emit_stmts(then_body, depth + 1, out);
                if else_body.is_empty() {
                    out.push_str(&pad);
                    out.push_str("}\n");
                } else {
                    out.push_str(&pad);
                    out.push_str("} else {\n");
                    emit_stmts(else_body, depth + 1, out);
                    out.push_str(&pad);
                    out.push_str("}\n");
                }
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                out.push_str(&pad);
                out.push_str(&format!("for ({init}; {cond}; {step}) {{\n"));
                emit_stmts(body, depth + 1, out);
                out.push_str(&pad);
                out.push_str("}\n");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_nested() {
        let ir = KernelIr::with_main(vec![
            Stmt::line("float v = 0.0;"),
            Stmt::If {
                cond: "idx < 4".to_string(),
                then_body: vec![Stmt::line("v = 1.0;")],
                else_body: vec![Stmt::line("v = 2.0;")],
            },
            Stmt::line("set_output(v);"),
        ]);
        let text = ir.emit();
        assert!(text.starts_with("void main() {\n"));
        assert!(text.contains("  if (idx < 4) {\n    v = 1.0;\n  } else {"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_emit_deterministic() {
        let ir = KernelIr::with_main(vec![Stmt::For {
            init: "int i = 0".to_string(),
            cond: "i < 8".to_string(),
            step: "i++".to_string(),
            body: vec![Stmt::line("acc += get_source(i);")],
        }]);
        assert_eq!(ir.emit(), ir.emit());
        assert!(ir.emit().contains("for (int i = 0; i < 8; i++) {"));
    }

    #[test]
    fn test_helper_emission_precedes_main() {
        let ir = KernelIr {
            helpers: vec![HelperFn {
                signature: "float square(float x)".to_string(),
                body: vec![Stmt::line("return x * x;")],
            }],
            main: vec![Stmt::line("set_output(square(2.0));")],
        };
        let text = ir.emit();
        let helper_pos = text.find("float square").unwrap();
        let main_pos = text.find("void main").unwrap();
        assert!(helper_pos < main_pos);
    }
}
