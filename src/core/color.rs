use nalgebra::Vector4;

/// Quantizes a linear RGBA color to 8 bits per channel.
///
/// Values are clamped to [0, 1] and rounded. No tone mapping or gamma curve is
/// applied: shader output goes to the image unchanged, like a plain GL window.
#[inline]
pub fn to_rgba8(color: &Vector4<f32>) -> [u8; 4] {
    let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(color.x), q(color.y), q(color.z), q(color.w)]
}

/// Parses a `[r, g, b]` triple from configuration into an opaque color.
#[inline]
pub fn opaque(rgb: [f32; 3]) -> Vector4<f32> {
    Vector4::new(rgb[0], rgb[1], rgb[2], 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_clamps_and_rounds() {
        assert_eq!(to_rgba8(&Vector4::new(0.0, 1.0, 0.5, 1.0)), [0, 255, 128, 255]);
        assert_eq!(to_rgba8(&Vector4::new(-0.3, 1.7, 0.8, 1.0)), [0, 255, 204, 255]);
    }
}
