/// Entry point of the vertex stage.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Entry point of the fragment stage.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL vertex stage: `P * V * W * Ry * Rx * pos`, normal rotated by the
/// upper 3x3 of `W * Ry * Rx`.
pub const VERTEX_SHADER: &str = r#"
struct Transforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    rotation_x: mat4x4<f32>,
    rotation_y: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> transforms: Transforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) world_0: vec4<f32>,
    @location(3) world_1: vec4<f32>,
    @location(4) world_2: vec4<f32>,
    @location(5) world_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let world = mat4x4<f32>(
        instance.world_0,
        instance.world_1,
        instance.world_2,
        instance.world_3,
    );
    let model = world * transforms.rotation_y * transforms.rotation_x;

    var out: VertexOutput;
    out.clip_position = transforms.projection * transforms.view * model * vec4<f32>(vertex.position, 1.0);
    out.normal = mat3x3<f32>(model[0].xyz, model[1].xyz, model[2].xyz) * vertex.normal;
    return out;
}
"#;

/// WGSL fragment stage: half-Lambert blend between white and dark grey.
pub const FRAGMENT_SHADER: &str = r#"
struct Light {
    dir_to_light: vec3<f32>,
};

@group(0) @binding(1)
var<uniform> light: Light;

@fragment
fn fs_main(@location(0) normal: vec3<f32>) -> @location(0) vec4<f32> {
    let n = normalize(normal);
    let d = dot(light.dir_to_light, n);
    let f = (d + 1.0) * 0.5;
    let c = f * vec3<f32>(1.0, 1.0, 1.0) + (1.0 - f) * vec3<f32>(0.2, 0.2, 0.2);
    return vec4<f32>(c, 1.0);
}
"#;
