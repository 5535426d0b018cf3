//! Typed uniform values.
//!
//! The kind of a uniform is decided once when it is created and never changes
//! afterwards; updates match on it instead of probing the incoming value.

use std::{cell::RefCell, rc::Rc};

use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3, Vector4};
use serde_json::Value;

use crate::data_structures::texture::Texture;

#[derive(Clone, Debug, PartialEq)]
pub enum Uniform {
    Plain(Value),
    Vector2(Vector2<f32>),
    Vector3(Vector3<f32>),
    Vector4(Vector4<f32>),
    Matrix4(Matrix4<f32>),
    Texture(Texture),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Plain,
    Vector2,
    Vector3,
    Vector4,
    Matrix4,
    Texture,
}

/// A uniform slot shared between every material that references it.
///
/// Camera matrices are handed to all plots of a scene as the *same* slot, so
/// a camera update is visible everywhere without touching the plots.
pub type UniformSlot = Rc<RefCell<Uniform>>;

pub fn slot(uniform: Uniform) -> UniformSlot {
    Rc::new(RefCell::new(uniform))
}

impl Uniform {
    pub fn identity() -> Self {
        Uniform::Matrix4(Matrix4::identity())
    }

    pub fn kind(&self) -> UniformKind {
        match self {
            Uniform::Plain(_) => UniformKind::Plain,
            Uniform::Vector2(_) => UniformKind::Vector2,
            Uniform::Vector3(_) => UniformKind::Vector3,
            Uniform::Vector4(_) => UniformKind::Vector4,
            Uniform::Matrix4(_) => UniformKind::Matrix4,
            Uniform::Texture(_) => UniformKind::Texture,
        }
    }

    /// Promotes numeric sequences of length 2, 3, 4 and 16 to the matching
    /// vector or (column-major) matrix type.
    pub fn from_numbers(numbers: &[f32]) -> Option<Self> {
        match numbers.len() {
            2 => Some(Uniform::Vector2(Vector2::new(numbers[0], numbers[1]))),
            3 => Some(Uniform::Vector3(Vector3::new(
                numbers[0], numbers[1], numbers[2],
            ))),
            4 => Some(Uniform::Vector4(Vector4::new(
                numbers[0], numbers[1], numbers[2], numbers[3],
            ))),
            16 => {
                let mut matrix = Matrix4::identity();
                let components: &mut [f32; 16] = matrix.as_mut();
                components.copy_from_slice(numbers);
                Some(Uniform::Matrix4(matrix))
            }
            _ => None,
        }
    }

    /// Components of a vector or matrix uniform, `None` for other kinds.
    pub fn components(&self) -> Option<&[f32]> {
        match self {
            Uniform::Vector2(v) => Some(AsRef::<[f32; 2]>::as_ref(v).as_slice()),
            Uniform::Vector3(v) => Some(AsRef::<[f32; 3]>::as_ref(v).as_slice()),
            Uniform::Vector4(v) => Some(AsRef::<[f32; 4]>::as_ref(v).as_slice()),
            Uniform::Matrix4(m) => Some(AsRef::<[f32; 16]>::as_ref(m).as_slice()),
            Uniform::Plain(_) | Uniform::Texture(_) => None,
        }
    }

    pub fn components_mut(&mut self) -> Option<&mut [f32]> {
        match self {
            Uniform::Vector2(v) => Some(AsMut::<[f32; 2]>::as_mut(v).as_mut_slice()),
            Uniform::Vector3(v) => Some(AsMut::<[f32; 3]>::as_mut(v).as_mut_slice()),
            Uniform::Vector4(v) => Some(AsMut::<[f32; 4]>::as_mut(v).as_mut_slice()),
            Uniform::Matrix4(m) => Some(AsMut::<[f32; 16]>::as_mut(m).as_mut_slice()),
            Uniform::Plain(_) | Uniform::Texture(_) => None,
        }
    }

    pub fn as_matrix4(&self) -> Option<Matrix4<f32>> {
        match self {
            Uniform::Matrix4(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            Uniform::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_texture_mut(&mut self) -> Option<&mut Texture> {
        match self {
            Uniform::Texture(t) => Some(t),
            _ => None,
        }
    }

    /// Appends this uniform to a std140-style block: scalars and vectors take
    /// one 16 byte slot, matrices four. Textures and non-numeric values are
    /// bound separately and contribute nothing.
    pub(crate) fn pack_into(&self, block: &mut Vec<f32>) {
        let start = block.len();
        match self {
            Uniform::Plain(Value::Number(n)) => block.push(n.as_f64().unwrap_or(0.0) as f32),
            Uniform::Plain(Value::Bool(b)) => block.push(if *b { 1.0 } else { 0.0 }),
            Uniform::Plain(_) | Uniform::Texture(_) => return,
            numeric => block.extend_from_slice(numeric.components().unwrap_or(&[])),
        }
        let written = block.len() - start;
        let padded = written.div_ceil(4) * 4;
        block.resize(start + padded, 0.0);
    }
}
