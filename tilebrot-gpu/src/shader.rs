//! WGSL source for the escape-time fragment shader.

use crate::kernel::Precision;

/// Shader template; `$T` is replaced by the scalar type.
///
/// The quad is a four-vertex triangle strip built from the vertex index, so
/// no vertex buffer is needed. Framebuffer row 0 holds the last field row,
/// which puts the imaginary axis pointing up on screen.
const TEMPLATE: &str = r#"
struct Bounds {
    min_re: $T,
    min_im: $T,
    step_re: $T,
    step_im: $T,
    height: u32,
    max_iter: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<uniform> bounds: Bounds;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(index & 1u) * 2.0 - 1.0;
    let y = f32(index >> 1u) * 2.0 - 1.0;
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    let px = u32(frag.x);
    let py = bounds.height - 1u - u32(frag.y);

    let cr = bounds.min_re + $T(px) * bounds.step_re;
    let ci = bounds.min_im + $T(py) * bounds.step_im;

    var r = cr;
    var i = ci;
    var iter = bounds.max_iter;
    for (var k = 0u; k < bounds.max_iter; k++) {
        let r2 = r * r;
        let i2 = i * i;
        if (r2 + i2 >= $T(4.0)) {
            iter = k;
            break;
        }
        let ri = r * i;
        i = ri + ri + ci;
        r = r2 - i2 + cr;
    }

    // Low byte in red, high byte in green.
    return vec4<f32>(f32(iter % 256u) / 255.0, f32(iter / 256u) / 255.0, 0.0, 1.0);
}
"#;

/// WGSL for the given precision.
pub fn shader_source(precision: Precision) -> String {
    let scalar = match precision {
        Precision::Float => "f32",
        Precision::Double => "f64",
    };
    TEMPLATE.replace("$T", scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_source_has_no_doubles() {
        let src = shader_source(Precision::Float);
        assert!(!src.contains("$T"));
        assert!(!src.contains("f64"));
        assert!(src.contains("min_re: f32"));
    }

    #[test]
    fn double_source_uses_f64_math() {
        let src = shader_source(Precision::Double);
        assert!(!src.contains("$T"));
        assert!(src.contains("min_re: f64"));
        assert!(src.contains("f64(4.0)"));
        // Colour output stays single precision.
        assert!(src.contains("-> @location(0) vec4<f32>"));
    }

    #[test]
    fn entry_points_present() {
        for precision in [Precision::Float, Precision::Double] {
            let src = shader_source(precision);
            assert!(src.contains("fn vs_main"));
            assert!(src.contains("fn fs_main"));
        }
    }
}
