//! Common test utilities
#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use shadr::context::DeviceContext;
use shadr::error::{Error, Result};
use shadr::program::ParamValue;

/// A surface handle the mock hands out; the id is all that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSurface {
    pub id: usize,
}

/// One recorded action against the mock device.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    BindSurface {
        uniform: String,
        unit: usize,
        surface: usize,
    },
    WriteParam {
        uniform: String,
        value: ParamValue,
    },
    Dispatch {
        program: usize,
        output: usize,
    },
}

/// Recording device context: every compile and bind is captured so
/// tests can assert on exactly what the engine asked the device to do.
#[derive(Default)]
pub struct MockContext {
    pub compile_count: Cell<usize>,
    pub sources: RefCell<Vec<String>>,
    pub actions: RefCell<Vec<Action>>,
    pub fail_compile: Cell<bool>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded actions, oldest first.
    pub fn take_actions(&self) -> Vec<Action> {
        std::mem::take(&mut *self.actions.borrow_mut())
    }

    pub fn dispatch_count(&self) -> usize {
        self.actions
            .borrow()
            .iter()
            .filter(|action| matches!(action, Action::Dispatch { .. }))
            .count()
    }

    pub fn last_source(&self) -> String {
        self.sources.borrow().last().cloned().unwrap_or_default()
    }
}

impl DeviceContext for MockContext {
    type Program = usize;
    type Surface = MockSurface;
    type Location = String;

    fn compile(&self, source: &str) -> Result<usize> {
        if self.fail_compile.get() {
            return Err(Error::CompileFailed {
                reason: "mock compile failure".to_string(),
                offending_source: String::new(),
            });
        }
        let id = self.compile_count.get();
        self.compile_count.set(id + 1);
        self.sources.borrow_mut().push(source.to_string());
        Ok(id)
    }

    fn param_location(&self, _program: &usize, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn bind_surface(&self, location: &String, surface: &MockSurface, unit: usize) -> Result<()> {
        self.actions.borrow_mut().push(Action::BindSurface {
            uniform: location.clone(),
            unit,
            surface: surface.id,
        });
        Ok(())
    }

    fn write_param(&self, location: &String, value: &ParamValue) -> Result<()> {
        self.actions.borrow_mut().push(Action::WriteParam {
            uniform: location.clone(),
            value: value.clone(),
        });
        Ok(())
    }

    fn dispatch(&self, program: &usize, output: &MockSurface) -> Result<()> {
        self.actions.borrow_mut().push(Action::Dispatch {
            program: *program,
            output: output.id,
        });
        Ok(())
    }
}

/// Assert two f32 slices are exactly equal, with an index in the
/// failure message.
pub fn assert_values(got: &[f32], expected: &[f32], msg: &str) {
    assert_eq!(got.len(), expected.len(), "{msg}: length mismatch");
    for (i, (g, e)) in got.iter().zip(expected).enumerate() {
        assert_eq!(g, e, "{msg}: element {i} differs");
    }
}
