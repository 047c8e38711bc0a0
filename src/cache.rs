//! Compilation cache and key derivation
//!
//! Maps (template identity, operand signature, capability profile) to a
//! compiled program, compiling at most once per distinct key. The cache
//! is an explicit object with an injected lifetime — constructed by the
//! host, torn down at shutdown — never an ambient singleton.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::assembler::assemble;
use crate::binding::OperandBinding;
use crate::context::DeviceContext;
use crate::error::{Error, Result};
use crate::profile::CapabilityProfile;
use crate::program::ProgramSpec;
use crate::shape::broadcast_dims;

/// A compiled program plus everything needed to bind and re-dispatch it.
///
/// Created on first cache miss for a key; never mutated afterwards.
pub struct CompiledProgram<C: DeviceContext> {
    /// The spec this program was compiled from
    pub spec: ProgramSpec,
    /// Operand bindings at compile time, for bind-time validation
    pub inputs: Vec<OperandBinding>,
    /// Output binding at compile time
    pub output: OperandBinding,
    /// Profile this program was specialized for
    pub profile: CapabilityProfile,
    /// Full assembled source
    pub source: String,
    /// Opaque compiled-program handle
    pub program: C::Program,
    /// Parameter name to runtime binding location, resolved once at
    /// compile time. Names whose location was optimized out are absent.
    pub locations: HashMap<String, C::Location>,
}

impl<C: DeviceContext> std::fmt::Debug for CompiledProgram<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("key", &self.spec.key)
            .field("output_shape", &self.spec.output_shape)
            .finish_non_exhaustive()
    }
}

/// Process-wide compilation cache.
///
/// The single mutex makes "read-check, write-if-absent" atomic per key:
/// two concurrent dispatches with equal derived keys can never produce
/// two different compiled programs.
pub struct ProgramCache<C: DeviceContext> {
    entries: Mutex<HashMap<String, Arc<CompiledProgram<C>>>>,
}

impl<C: DeviceContext> Default for ProgramCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DeviceContext> ProgramCache<C> {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no programs.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every cached program (shutdown / explicit eviction).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Look up or compile the program for a spec.
    ///
    /// On a miss: assembles source, compiles through the context, and
    /// records parameter binding locations once. On a hit: returns the
    /// existing instance.
    pub fn get_or_compile(
        &self,
        ctx: &C,
        spec: &ProgramSpec,
        inputs: &[OperandBinding],
        out: &OperandBinding,
        profile: &CapabilityProfile,
    ) -> Result<Arc<CompiledProgram<C>>> {
        let key = shader_key(spec, inputs, out, profile);
        let mut entries = self.entries.lock();
        if let Some(compiled) = entries.get(&key) {
            return Ok(compiled.clone());
        }

        let source = assemble(spec, inputs, out, profile)?;
        let program = ctx.compile(&source).map_err(|err| match err {
            Error::CompileFailed { reason, .. } => Error::CompileFailed {
                reason,
                offending_source: source.clone(),
            },
            other => other,
        })?;

        let mut locations = HashMap::new();
        for name in expected_uniforms(spec, inputs, out, profile) {
            if let Some(location) = ctx.param_location(&program, &name) {
                locations.insert(name, location);
            }
        }

        let compiled = Arc::new(CompiledProgram {
            spec: spec.clone(),
            inputs: inputs.to_vec(),
            output: out.clone(),
            profile: *profile,
            source,
            program,
            locations,
        });
        entries.insert(key, compiled.clone());
        Ok(compiled)
    }
}

/// Every uniform name the assembled program may declare, in binding
/// order. The binder walks the same list.
pub fn expected_uniforms(
    spec: &ProgramSpec,
    inputs: &[OperandBinding],
    out: &OperandBinding,
    profile: &CapabilityProfile,
) -> Vec<String> {
    let mut names = Vec::new();
    for (name, binding) in spec.operand_names.iter().zip(inputs) {
        names.push((*name).to_string());
        if binding.inline {
            continue;
        }
        if binding.flat_offset != 0 {
            names.push(format!("{name}_offset"));
        }
        if !binding.is_packed() && profile.use_shape_uniforms(binding.rank()) {
            names.push(format!("{name}_shape"));
            names.push(format!("{name}_tex_shape"));
        }
    }
    if !out.is_packed() && profile.use_shape_uniforms(out.rank()) {
        names.push("out_shape".to_string());
        names.push("out_tex_shape".to_string());
    }
    for decl in &spec.custom_params {
        names.push(decl.name.to_string());
    }
    names
}

// ============================================================================
// Key derivation
// ============================================================================

/// Derive the structural cache key for a dispatch.
///
/// Shape-baked operands contribute their full logical and physical
/// shapes; runtime-parameterized operands collapse to a reduced
/// structural signature (rank, size-1 flags, degenerate-surface flags,
/// broadcast positions) so that many concrete shapes share one compiled
/// program. The template identity, rendered body text, and profile
/// discriminator complete the key.
pub fn shader_key(
    spec: &ProgramSpec,
    inputs: &[OperandBinding],
    out: &OperandBinding,
    profile: &CapabilityProfile,
) -> String {
    let mut key = String::new();
    let _ = write!(key, "{}&", spec.key);
    for binding in inputs {
        operand_signature(&mut key, binding, out, profile);
    }
    key.push('|');
    operand_signature(&mut key, out, out, profile);
    let _ = write!(key, "&{}&", profile.cache_tag());
    key.push_str(&spec.body_text());
    key
}

fn operand_signature(
    key: &mut String,
    binding: &OperandBinding,
    out: &OperandBinding,
    profile: &CapabilityProfile,
) {
    if binding.inline {
        let _ = write!(key, "[inline:{:?}]", binding.shape);
        return;
    }
    let offset_flag = u8::from(binding.flat_offset != 0);
    if !binding.is_packed() && profile.use_shape_uniforms(binding.rank()) {
        let singleton_flags: String = binding
            .shape
            .iter()
            .map(|&extent| if extent == 1 { '1' } else { 'x' })
            .collect();
        let degenerate = match binding.surface {
            Some(s) => format!("{}{}", u8::from(s.rows == 1), u8::from(s.cols == 1)),
            None => "--".to_string(),
        };
        let bcast = broadcast_dims(&binding.shape, &out.shape);
        let _ = write!(
            key,
            "[r{}:{singleton_flags}:{degenerate}:b{bcast:?}:o{offset_flag}]",
            binding.rank()
        );
    } else {
        let surface = match binding.surface {
            Some(s) => format!("{}x{}", s.rows, s.cols),
            None => "?".to_string(),
        };
        let _ = write!(
            key,
            "[{:?}:{surface}:{:?}:o{offset_flag}]",
            binding.shape, binding.packing
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Dialect;
    use crate::program::{KernelIr, Stmt};

    fn spec(shape: &[usize]) -> ProgramSpec {
        ProgramSpec {
            key: "copy",
            operand_names: vec!["source"],
            output_shape: shape.to_vec(),
            packed_inputs: false,
            packed_output: false,
            custom_params: vec![],
            body: KernelIr::with_main(vec![Stmt::line(
                "set_output(get_source_at_out_coords());",
            )]),
        }
    }

    #[test]
    fn test_baked_keys_distinguish_shapes() {
        let profile = CapabilityProfile::baked(Dialect::Es300);
        let a = shader_key(
            &spec(&[4, 3]),
            &[OperandBinding::dense(&[4, 3]).unwrap()],
            &OperandBinding::dense(&[4, 3]).unwrap(),
            &profile,
        );
        let b = shader_key(
            &spec(&[5, 3]),
            &[OperandBinding::dense(&[5, 3]).unwrap()],
            &OperandBinding::dense(&[5, 3]).unwrap(),
            &profile,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_parameterized_keys_collapse_shapes() {
        let profile = CapabilityProfile::parameterized(Dialect::Es300);
        let a = shader_key(
            &spec(&[4, 3]),
            &[OperandBinding::parameterized(&[4, 3]).unwrap()],
            &OperandBinding::parameterized(&[4, 3]).unwrap(),
            &profile,
        );
        let b = shader_key(
            &spec(&[9, 7]),
            &[OperandBinding::parameterized(&[9, 7]).unwrap()],
            &OperandBinding::parameterized(&[9, 7]).unwrap(),
            &profile,
        );
        // same rank, no singleton dims, same broadcast structure
        assert_eq!(a, b);

        let c = shader_key(
            &spec(&[1, 7]),
            &[OperandBinding::parameterized(&[1, 7]).unwrap()],
            &OperandBinding::parameterized(&[1, 7]).unwrap(),
            &profile,
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_profile_in_key() {
        let inputs = [OperandBinding::dense(&[4, 3]).unwrap()];
        let out = OperandBinding::dense(&[4, 3]).unwrap();
        let s = spec(&[4, 3]);
        let a = shader_key(&s, &inputs, &out, &CapabilityProfile::baked(Dialect::Es100));
        let b = shader_key(&s, &inputs, &out, &CapabilityProfile::baked(Dialect::Es300));
        assert_ne!(a, b);
    }

    #[test]
    fn test_offset_flag_in_key() {
        let profile = CapabilityProfile::baked(Dialect::Es300);
        let out = OperandBinding::dense(&[4, 3]).unwrap();
        let s = spec(&[4, 3]);
        let plain = shader_key(
            &s,
            &[OperandBinding::dense(&[4, 3]).unwrap()],
            &out,
            &profile,
        );
        let shifted = shader_key(
            &s,
            &[OperandBinding::dense(&[4, 3]).unwrap().with_offset(6)],
            &out,
            &profile,
        );
        assert_ne!(plain, shifted);
    }
}
