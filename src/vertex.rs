//! # Vertex Layout (`vertex.rs`)
//!
//! Defines the per-point data uploaded to the GPU. Each point of the grid carries its
//! position in world space and an RGBA color; the render pipeline draws one vertex per
//! point using the `PointList` topology, so there is no index buffer.
//!
//! The struct is `#[repr(C)]` and derives `bytemuck::Pod` so a slice of vertices can be
//! handed to `wgpu` as raw bytes without copying. The attribute locations declared in
//! [`Vertex::vertex_attributes`] must match the `VertexInput` struct of the WGSL shader:
//!
//! - `@location(0) position: vec3<f32>`
//! - `@location(1) color: vec4<f32>`

/// A single colored point.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position `[x, y, z]`.
    pub position: [f32; 3],
    /// Linear color `[r, g, b, a]`.
    pub color: [f32; 4],
}

impl Vertex {
    /// Size of one vertex in bytes, used to size uploads against device limits.
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    /// Attribute descriptions for the position and color fields.
    pub fn vertex_attributes() -> &'static [wgpu::VertexAttribute] {
        &Self::ATTRIBUTES
    }

    /// Buffer layout describing how `wgpu` steps through a buffer of vertices.
    pub fn description() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::vertex_attributes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::SIZE, 28);

        let attributes = Vertex::vertex_attributes();
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[0].shader_location, 0);
        assert_eq!(attributes[1].offset, 12);
        assert_eq!(attributes[1].shader_location, 1);
        assert_eq!(Vertex::description().array_stride, Vertex::SIZE);
    }
}
