use super::camera::{ColorBuffer, DepthBuffer};

fn source_coord(i: usize, target: usize, source: usize) -> f64 {
    if target <= 1 || source <= 1 {
        return 0.0;
    }
    i as f64 * (source - 1) as f64 / (target - 1) as f64
}

/// Integer corners and fractional weights of a source coordinate.
fn split(coord: f64, source: usize) -> (usize, usize, f64) {
    let lo = (coord.floor() as usize).min(source.saturating_sub(1));
    let hi = (lo + 1).min(source.saturating_sub(1));
    (lo, hi, coord - lo as f64)
}

fn bilinear<F>(width: usize, height: usize, x: f64, y: f64, sample: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let (x0, x1, tx) = split(x, width);
    let (y0, y1, ty) = split(y, height);
    let top = sample(x0, y0) * (1.0 - tx) + sample(x1, y0) * tx;
    let bottom = sample(x0, y1) * (1.0 - tx) + sample(x1, y1) * tx;
    top * (1.0 - ty) + bottom * ty
}

/// Bilinear resample onto a `width x height` grid. Target index `i` of `n`
/// maps to source coordinate `i * (src - 1) / (n - 1)`, matching the
/// `linspace(0, 1, n)` reconstruction grid.
pub fn resample_depth(depth: &DepthBuffer, width: usize, height: usize) -> DepthBuffer {
    if depth.width == width && depth.height == height {
        return depth.clone();
    }
    let src = |x: usize, y: usize| f64::from(depth.values[y * depth.width + x]);
    let mut values = Vec::with_capacity(width * height);
    for row in 0..height {
        let sy = source_coord(row, height, depth.height);
        for col in 0..width {
            let sx = source_coord(col, width, depth.width);
            values.push(bilinear(depth.width, depth.height, sx, sy, src) as f32);
        }
    }
    DepthBuffer {
        width,
        height,
        values,
    }
}

pub fn resample_color(color: &ColorBuffer, width: usize, height: usize) -> ColorBuffer {
    if color.width == width && color.height == height {
        return color.clone();
    }
    let mut pixels = Vec::with_capacity(width * height);
    for row in 0..height {
        let sy = source_coord(row, height, color.height);
        for col in 0..width {
            let sx = source_coord(col, width, color.width);
            let mut rgb = [0u8; 3];
            for (channel, out) in rgb.iter_mut().enumerate() {
                let src = |x: usize, y: usize| f64::from(color.pixels[y * color.width + x][channel]);
                let v = bilinear(color.width, color.height, sx, sy, src);
                *out = v.round().clamp(0.0, 255.0) as u8;
            }
            pixels.push(rgb);
        }
    }
    ColorBuffer {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn upsampling_interpolates_between_corners() {
        let depth = DepthBuffer::new(2, 1, vec![0.0, 1.0]).unwrap();
        let out = resample_depth(&depth, 3, 1);
        assert_relative_eq!(out.values[1], 0.5);
        assert_relative_eq!(out.values[2], 1.0);
    }

    #[test]
    fn same_size_is_identity() {
        let color = ColorBuffer::filled(4, 4, [10, 20, 30]);
        assert_eq!(resample_color(&color, 4, 4), color);
    }

    #[test]
    fn constant_color_survives_downsampling() {
        let color = ColorBuffer::filled(8, 6, [200, 100, 0]);
        let out = resample_color(&color, 3, 3);
        assert!(out.pixels.iter().all(|&p| p == [200, 100, 0]));
    }
}
