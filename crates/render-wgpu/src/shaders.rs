//! WGSL sources. Both passes share the per-frame block and the fog helper.

pub const BOX_VS: &str = "vs_box";
pub const BOX_FS: &str = "fs_box";
pub const GRID_VS: &str = "vs_grid";
pub const GRID_FS: &str = "fs_grid";

/// Per-frame block, laid out like `gpu::FrameUniforms`.
macro_rules! frame_wgsl {
    () => {
        r#"
struct Frame {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    sky: vec4<f32>,
    // x: distance where fog starts, y: distance where it is total.
    fog: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

fn fogged(rgb: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let span = max(frame.fog.y - frame.fog.x, 0.001);
    let d = distance(world_pos, frame.eye.xyz);
    return mix(rgb, frame.sky.rgb, clamp((d - frame.fog.x) / span, 0.0, 1.0));
}
"#
    };
}

/// Bounds boxes: hemisphere ambient plus one sun, Z up.
pub const BOX_SHADER: &str = concat!(
    frame_wgsl!(),
    r#"
const SUN: vec3<f32> = vec3<f32>(0.37, -0.28, 0.89);
const GROUND_BOUNCE: vec3<f32> = vec3<f32>(0.32, 0.27, 0.2);

struct Corner {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Placement {
    @location(2) col_0: vec4<f32>,
    @location(3) col_1: vec4<f32>,
    @location(4) col_2: vec4<f32>,
    @location(5) col_3: vec4<f32>,
    @location(6) tint: vec4<f32>,
};

struct Lit {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tint: vec4<f32>,
};

@vertex
fn vs_box(corner: Corner, placement: Placement) -> Lit {
    let basis = mat3x3<f32>(placement.col_0.xyz, placement.col_1.xyz, placement.col_2.xyz);
    let world = basis * corner.position + placement.col_3.xyz;

    // Boxes stretch per axis; dividing by the squared column lengths keeps
    // normals perpendicular to the stretched faces.
    let scale = vec3<f32>(length(basis[0]), length(basis[1]), length(basis[2]));
    let normal = basis * (corner.normal / max(scale * scale, vec3<f32>(1e-8)));

    var lit: Lit;
    lit.clip = frame.view_proj * vec4<f32>(world, 1.0);
    lit.world_pos = world;
    lit.normal = normal;
    lit.tint = placement.tint;
    return lit;
}

@fragment
fn fs_box(lit: Lit) -> @location(0) vec4<f32> {
    let n = normalize(lit.normal);
    let ambient = mix(GROUND_BOUNCE, frame.sky.rgb, n.z * 0.5 + 0.5) * 0.5;
    let sun = max(dot(n, SUN), 0.0) * 0.7;
    let rgb = lit.tint.rgb * (ambient + vec3<f32>(sun));
    return vec4<f32>(fogged(rgb, lit.world_pos), lit.tint.a);
}
"#
);

/// Ground grid lines, fading into the sky with distance.
pub const GRID_SHADER: &str = concat!(
    frame_wgsl!(),
    r#"
struct Line {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct Faded {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_grid(line: Line) -> Faded {
    var out: Faded;
    out.clip = frame.view_proj * vec4<f32>(line.position, 1.0);
    out.world_pos = line.position;
    out.color = line.color;
    return out;
}

@fragment
fn fs_grid(in: Faded) -> @location(0) vec4<f32> {
    return vec4<f32>(fogged(in.color.rgb, in.world_pos), in.color.a);
}
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    fn declares(source: &str, entry: &str) -> bool {
        source.contains(&format!("fn {entry}("))
    }

    #[test]
    fn entry_points_exist() {
        assert!(declares(BOX_SHADER, BOX_VS));
        assert!(declares(BOX_SHADER, BOX_FS));
        assert!(declares(GRID_SHADER, GRID_VS));
        assert!(declares(GRID_SHADER, GRID_FS));
        assert!(!declares(GRID_SHADER, BOX_VS));
    }

    #[test]
    fn box_shader_reads_every_instance_column() {
        for location in 2..=6 {
            assert!(BOX_SHADER.contains(&format!("@location({location})")));
        }
    }

    #[test]
    fn both_passes_share_the_frame_block() {
        for source in [BOX_SHADER, GRID_SHADER] {
            assert_eq!(source.matches("struct Frame {").count(), 1);
            assert!(source.contains("fn fogged("));
        }
    }
}
