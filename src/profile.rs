//! Capability profiles
//!
//! The host's device probe supplies a [`CapabilityProfile`]; this crate
//! only consumes the flags and never detects them. The profile selects
//! one of two shading dialects, whether a custom NaN test must be
//! emitted, and whether logical/physical shapes are baked into source as
//! literals or deferred to runtime-settable uniforms.

/// Target shading-language dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Legacy ES-style dialect: `texture2D` sampling, `gl_FragColor`
    /// output, no version pragma, no native `isnan`
    Es100,
    /// Modern ES-style dialect: `texture` sampling, declared `out`
    /// variable, `#version 300 es` pragma
    Es300,
}

impl Dialect {
    /// Sampling function name in this dialect.
    pub fn sample_fn(&self) -> &'static str {
        match self {
            Dialect::Es100 => "texture2D",
            Dialect::Es300 => "texture",
        }
    }

    /// Name of the fragment output variable.
    pub fn output_var(&self) -> &'static str {
        match self {
            Dialect::Es100 => "gl_FragColor",
            Dialect::Es300 => "frag_color",
        }
    }
}

/// Flags describing the compile target, supplied by the host's
/// device/driver capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityProfile {
    /// Which shading dialect to emit
    pub dialect: Dialect,
    /// Emit a custom NaN test even where the dialect has a native one
    /// (some drivers miscompile it)
    pub needs_nan_shim: bool,
    /// Defer shape values to runtime-settable uniforms so one compiled
    /// program serves every shape with the same structural signature
    pub runtime_shapes: bool,
    /// Ranks up to this threshold use shape uniforms when
    /// `runtime_shapes` is enabled; higher ranks are always baked
    pub uniform_rank_threshold: usize,
}

impl CapabilityProfile {
    /// Profile that bakes all shapes as source literals.
    pub fn baked(dialect: Dialect) -> Self {
        Self {
            dialect,
            needs_nan_shim: dialect == Dialect::Es100,
            runtime_shapes: false,
            uniform_rank_threshold: 4,
        }
    }

    /// Profile that defers shapes to runtime uniforms for ranks within
    /// the threshold.
    pub fn parameterized(dialect: Dialect) -> Self {
        Self {
            runtime_shapes: true,
            ..Self::baked(dialect)
        }
    }

    /// Whether an operand of `rank` uses shape uniforms under this
    /// profile. Packed operands always bake their shapes.
    pub fn use_shape_uniforms(&self, rank: usize) -> bool {
        self.runtime_shapes && rank >= 1 && rank <= self.uniform_rank_threshold
    }

    /// Whether the NaN shim must be emitted: always for the legacy
    /// dialect (no native test), and on request for the modern one.
    pub fn emit_nan_shim(&self) -> bool {
        self.needs_nan_shim || self.dialect == Dialect::Es100
    }

    /// Stable discriminator string for cache keys.
    pub fn cache_tag(&self) -> String {
        format!(
            "{:?}|nan{}|rt{}|thr{}",
            self.dialect,
            u8::from(self.needs_nan_shim),
            u8::from(self.runtime_shapes),
            self.uniform_rank_threshold
        )
    }
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self::baked(Dialect::Es300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_uniform_threshold() {
        let p = CapabilityProfile::parameterized(Dialect::Es300);
        assert!(p.use_shape_uniforms(1));
        assert!(p.use_shape_uniforms(4));
        assert!(!p.use_shape_uniforms(5));
        assert!(!p.use_shape_uniforms(0));

        let baked = CapabilityProfile::baked(Dialect::Es300);
        assert!(!baked.use_shape_uniforms(2));
    }

    #[test]
    fn test_cache_tag_distinguishes_profiles() {
        let a = CapabilityProfile::baked(Dialect::Es100);
        let b = CapabilityProfile::baked(Dialect::Es300);
        let c = CapabilityProfile::parameterized(Dialect::Es300);
        assert_ne!(a.cache_tag(), b.cache_tag());
        assert_ne!(b.cache_tag(), c.cache_tag());
    }

    #[test]
    fn test_legacy_dialect_always_shims_nan() {
        assert!(CapabilityProfile::baked(Dialect::Es100).emit_nan_shim());
        assert!(!CapabilityProfile::baked(Dialect::Es300).emit_nan_shim());
    }
}
