//! # Uniform Block (`uniform_buffer.rs`)
//!
//! Host-side mirror of the shader's uniform block:
//!
//! ```wgsl
//! struct Uniforms {
//!     camera: mat4x4<f32>,
//!     model: mat4x4<f32>,
//! };
//! ```
//!
//! `camera` is the camera's `projection * view` matrix and `model` places the grid in the
//! world (identity unless the grid is spinning). Keeping them separate lets the shader
//! compute `camera * model * position` without the host re-multiplying per frame.
//!
//! Two column-major 4x4 matrices are 128 bytes with no padding, which satisfies the
//! 16-byte alignment rules for uniform buffers. The `convert-bytemuck` feature of
//! `nalgebra-glm` makes `Mat4` itself `Pod`.

use nalgebra_glm as glm;

/// Matrices uploaded to `@group(0) @binding(0)` once per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformBuffer {
    pub camera: glm::Mat4,
    pub model: glm::Mat4,
}

impl Default for UniformBuffer {
    fn default() -> Self {
        Self {
            camera: glm::Mat4::identity(),
            model: glm::Mat4::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_two_packed_matrices() {
        assert_eq!(std::mem::size_of::<UniformBuffer>(), 128);

        let uniforms = UniformBuffer {
            camera: glm::Mat4::identity() * 2.0,
            model: glm::Mat4::identity(),
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniforms));
        assert_eq!(floats.len(), 32);
        assert_eq!(floats[0], 2.0);
        assert_eq!(floats[16], 1.0);
        assert_eq!(floats[17], 0.0);
    }
}
