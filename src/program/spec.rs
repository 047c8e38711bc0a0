//! Program specifications
//!
//! Instantiating a template against concrete shapes yields a
//! [`ProgramSpec`]: the kernel body plus everything the assembler,
//! cache, and binder need to know about the program. A spec is immutable
//! and content-addressable.

use super::ir::KernelIr;
use super::param::ParamDecl;

/// The immutable product of template instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSpec {
    /// Template identity, part of every cache key
    pub key: &'static str,
    /// Named operand slots the kernel reads, in binding order
    pub operand_names: Vec<&'static str>,
    /// Logical shape of the output
    pub output_shape: Vec<usize>,
    /// All sampled operands are stored 2x2-packed
    pub packed_inputs: bool,
    /// The output is written 2x2-packed (four result lanes per texel)
    pub packed_output: bool,
    /// Custom parameters the kernel declares beyond operand plumbing
    pub custom_params: Vec<ParamDecl>,
    /// Kernel body, emitted after the assembler's boilerplate
    pub body: KernelIr,
}

impl ProgramSpec {
    /// Rendered kernel-body text (deterministic for equal specs).
    pub fn body_text(&self) -> String {
        self.body.emit()
    }

    /// Output logical rank.
    pub fn output_rank(&self) -> usize {
        self.output_shape.len()
    }
}
