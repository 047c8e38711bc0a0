//! Declared custom parameters and their runtime values
//!
//! Every parameter a template declares carries one of a closed set of
//! types; the execution binder matches values against declarations
//! exhaustively, so an unhandled parameter type cannot exist.

/// Type of a declared custom parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Scalar float
    Float,
    /// Scalar int
    Int,
    /// 2-component float vector
    Vec2,
    /// 3-component float vector
    Vec3,
    /// 4-component float vector
    Vec4,
    /// 2-component int vector
    IVec2,
    /// 3-component int vector
    IVec3,
    /// 4-component int vector
    IVec4,
    /// Fixed-length float array
    FloatArray(usize),
    /// Fixed-length int array
    IntArray(usize),
}

impl ParamType {
    /// GLSL uniform declaration for a parameter of this type.
    pub fn decl(&self, name: &str) -> String {
        match self {
            ParamType::Float => format!("uniform float {name};"),
            ParamType::Int => format!("uniform int {name};"),
            ParamType::Vec2 => format!("uniform vec2 {name};"),
            ParamType::Vec3 => format!("uniform vec3 {name};"),
            ParamType::Vec4 => format!("uniform vec4 {name};"),
            ParamType::IVec2 => format!("uniform ivec2 {name};"),
            ParamType::IVec3 => format!("uniform ivec3 {name};"),
            ParamType::IVec4 => format!("uniform ivec4 {name};"),
            ParamType::FloatArray(n) => format!("uniform float {name}[{n}];"),
            ParamType::IntArray(n) => format!("uniform int {name}[{n}];"),
        }
    }

    /// Display name used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamType::Float => "float",
            ParamType::Int => "int",
            ParamType::Vec2 => "vec2",
            ParamType::Vec3 => "vec3",
            ParamType::Vec4 => "vec4",
            ParamType::IVec2 => "ivec2",
            ParamType::IVec3 => "ivec3",
            ParamType::IVec4 => "ivec4",
            ParamType::FloatArray(_) => "float[]",
            ParamType::IntArray(_) => "int[]",
        }
    }
}

/// A named parameter declaration on a program template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Uniform name in generated source
    pub name: &'static str,
    /// Declared type
    pub ty: ParamType,
}

impl ParamDecl {
    /// Construct a declaration.
    pub fn new(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty }
    }
}

/// A runtime value for a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Scalar float
    Float(f32),
    /// Scalar int
    Int(i32),
    /// 2-component float vector
    Vec2([f32; 2]),
    /// 3-component float vector
    Vec3([f32; 3]),
    /// 4-component float vector
    Vec4([f32; 4]),
    /// 2-component int vector
    IVec2([i32; 2]),
    /// 3-component int vector
    IVec3([i32; 3]),
    /// 4-component int vector
    IVec4([i32; 4]),
    /// Float array
    FloatArray(Vec<f32>),
    /// Int array
    IntArray(Vec<i32>),
}

impl ParamValue {
    /// Whether this value satisfies a declared type, including array
    /// lengths.
    pub fn matches(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (ParamValue::Float(_), ParamType::Float) => true,
            (ParamValue::Int(_), ParamType::Int) => true,
            (ParamValue::Vec2(_), ParamType::Vec2) => true,
            (ParamValue::Vec3(_), ParamType::Vec3) => true,
            (ParamValue::Vec4(_), ParamType::Vec4) => true,
            (ParamValue::IVec2(_), ParamType::IVec2) => true,
            (ParamValue::IVec3(_), ParamType::IVec3) => true,
            (ParamValue::IVec4(_), ParamType::IVec4) => true,
            (ParamValue::FloatArray(v), ParamType::FloatArray(n)) => v.len() == *n,
            (ParamValue::IntArray(v), ParamType::IntArray(n)) => v.len() == *n,
            _ => false,
        }
    }

    /// Display name used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Float(_) => "float",
            ParamValue::Int(_) => "int",
            ParamValue::Vec2(_) => "vec2",
            ParamValue::Vec3(_) => "vec3",
            ParamValue::Vec4(_) => "vec4",
            ParamValue::IVec2(_) => "ivec2",
            ParamValue::IVec3(_) => "ivec3",
            ParamValue::IVec4(_) => "ivec4",
            ParamValue::FloatArray(_) => "float[]",
            ParamValue::IntArray(_) => "int[]",
        }
    }
}
