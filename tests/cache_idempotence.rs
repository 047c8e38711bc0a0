//! Compilation cache behavior: at-most-one-compile-per-key, identity of
//! reused programs, and structural key collapsing under runtime shapes.

mod common;

use std::sync::Arc;

use common::MockContext;
use shadr::binding::OperandBinding;
use shadr::cache::ProgramCache;
use shadr::error::Error;
use shadr::profile::{CapabilityProfile, Dialect};
use shadr::templates::{synthesize, OpDescriptor};

fn slice_op(source: &[usize], dest: &[usize]) -> OpDescriptor {
    OpDescriptor::Slice {
        source_shape: source.to_vec(),
        dest_shape: dest.to_vec(),
    }
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_get_or_compile_is_idempotent() {
    let ctx = MockContext::new();
    let cache: ProgramCache<MockContext> = ProgramCache::new();
    let profile = CapabilityProfile::baked(Dialect::Es300);

    let spec = synthesize(&slice_op(&[4, 3], &[2, 3])).unwrap();
    let inputs = [OperandBinding::dense(&[4, 3]).unwrap()];
    let out = OperandBinding::dense(&[2, 3]).unwrap();

    let first = cache
        .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
        .unwrap();
    let second = cache
        .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
        .unwrap();

    // identical instance, assembler and compiler invoked exactly once
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ctx.compile_count.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_distinct_shapes_compile_separately_when_baked() {
    let ctx = MockContext::new();
    let cache: ProgramCache<MockContext> = ProgramCache::new();
    let profile = CapabilityProfile::baked(Dialect::Es300);

    for rows in [4usize, 5, 6] {
        let spec = synthesize(&slice_op(&[rows, 3], &[2, 3])).unwrap();
        let inputs = [OperandBinding::dense(&[rows, 3]).unwrap()];
        let out = OperandBinding::dense(&[2, 3]).unwrap();
        cache
            .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
            .unwrap();
    }
    assert_eq!(ctx.compile_count.get(), 3);
}

#[test]
fn test_structural_signature_collapses_parameterized_shapes() {
    let ctx = MockContext::new();
    let cache: ProgramCache<MockContext> = ProgramCache::new();
    let profile = CapabilityProfile::parameterized(Dialect::Es300);

    // many concrete shapes, one structural shape: rank 2, no singleton
    // dims, no broadcast, no offset
    for (src, dst) in [([4, 3], [2, 3]), ([9, 7], [5, 6]), ([100, 41], [7, 2])] {
        let spec = synthesize(&slice_op(&src, &dst)).unwrap();
        let inputs = [OperandBinding::parameterized(&src).unwrap()];
        let out = OperandBinding::parameterized(&dst).unwrap();
        cache
            .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
            .unwrap();
    }
    assert_eq!(ctx.compile_count.get(), 1, "one compile for the class");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_profile_discriminates_keys() {
    let ctx = MockContext::new();
    let cache: ProgramCache<MockContext> = ProgramCache::new();

    let spec = synthesize(&slice_op(&[4, 3], &[2, 3])).unwrap();
    let inputs = [OperandBinding::dense(&[4, 3]).unwrap()];
    let out = OperandBinding::dense(&[2, 3]).unwrap();

    for dialect in [Dialect::Es100, Dialect::Es300] {
        cache
            .get_or_compile(&ctx, &spec, &inputs, &out, &CapabilityProfile::baked(dialect))
            .unwrap();
    }
    assert_eq!(ctx.compile_count.get(), 2);
}

#[test]
fn test_clear_evicts_programs() {
    let ctx = MockContext::new();
    let cache: ProgramCache<MockContext> = ProgramCache::new();
    let profile = CapabilityProfile::baked(Dialect::Es300);

    let spec = synthesize(&slice_op(&[4, 3], &[2, 3])).unwrap();
    let inputs = [OperandBinding::dense(&[4, 3]).unwrap()];
    let out = OperandBinding::dense(&[2, 3]).unwrap();

    cache
        .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
        .unwrap();
    cache.clear();
    assert!(cache.is_empty());
    cache
        .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
        .unwrap();
    assert_eq!(ctx.compile_count.get(), 2);
}

// ============================================================================
// Compile failure
// ============================================================================

#[test]
fn test_compile_failure_surfaces_offending_source() {
    let ctx = MockContext::new();
    ctx.fail_compile.set(true);
    let cache: ProgramCache<MockContext> = ProgramCache::new();
    let profile = CapabilityProfile::baked(Dialect::Es300);

    let spec = synthesize(&slice_op(&[4, 3], &[2, 3])).unwrap();
    let inputs = [OperandBinding::dense(&[4, 3]).unwrap()];
    let out = OperandBinding::dense(&[2, 3]).unwrap();

    let err = cache
        .get_or_compile(&ctx, &spec, &inputs, &out, &profile)
        .unwrap_err();
    match err {
        Error::CompileFailed { reason, offending_source: source } => {
            assert_eq!(reason, "mock compile failure");
            // the complete generated source rides along for diagnosis
            assert!(source.contains("void main()"));
            assert!(source.contains("get_source"));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
    // a failed compile is never cached
    assert!(cache.is_empty());
}
