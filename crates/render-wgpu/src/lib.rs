//! wgpu frame renderer for the cube field.
//!
//! Draws a 2x10x10 grid of cubes, each spun by the same pair of time-driven
//! rotations and lit by one fixed directional light, seen through a camera
//! that only translates.
//!
//! # Invariants
//! - The shader program, mesh and instance buffers are created once in init
//!   and never reallocated.
//! - A failed init leaves no GPU objects behind.
//! - Depth is cleared only when the depth target is (re)created unless
//!   `RenderConfig::clear_depth_each_frame` is set.

mod gpu;
pub mod mesh;
pub mod program;
pub mod shaders;
pub mod uniforms;

pub use gpu::{CubeRenderer, RenderConfig};
pub use program::{
    CompiledShader, LinkedProgram, ProgramError, ProgramSource, ShaderProgram, ShaderStage,
    compile_shader, link_program,
};
