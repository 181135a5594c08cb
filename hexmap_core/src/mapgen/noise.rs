/// Smooth deterministic noise used to perturb per-cell temperature.
///
/// Each generation run samples one of four independent channels so two runs
/// with different seeds do not share the same jitter pattern.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JitterField {
    seed: u32,
}

pub(crate) const JITTER_CHANNELS: u32 = 4;

/// Lattice spacing and weight of each layer, coarsest first.
const LAYERS: [(f32, f32); 2] = [(0.3, 2.0), (0.6, 1.0)];

impl JitterField {
    pub(crate) fn new(seed: u64, channel: u32) -> Self {
        debug_assert!(channel < JITTER_CHANNELS);
        let folded = (seed ^ (seed >> 29)) as u32;
        let salt = 0x7E3A_0001 ^ channel.wrapping_mul(0x85EB_CA6B);
        Self {
            seed: folded.rotate_left(channel * 8) ^ salt,
        }
    }

    /// Noise in `[0, 1]` at an offset cell position.
    pub(crate) fn sample(&self, x: u32, z: u32) -> f32 {
        let mut total = 0.0;
        let mut weights = 0.0;
        for (layer, &(frequency, weight)) in LAYERS.iter().enumerate() {
            total += self.layer(layer as u32, x as f32 * frequency, z as f32 * frequency) * weight;
            weights += weight;
        }
        (total / weights).clamp(0.0, 1.0)
    }

    /// Bilinear blend of the four lattice corners around `(u, v)`.
    fn layer(&self, layer: u32, u: f32, v: f32) -> f32 {
        let (cu, cv) = (u.floor(), v.floor());
        let (iu, iv) = (cu as i32, cv as i32);
        let tu = ease(u - cu);
        let tv = ease(v - cv);
        let south = lerp(self.corner(layer, iu, iv), self.corner(layer, iu + 1, iv), tu);
        let north = lerp(
            self.corner(layer, iu, iv + 1),
            self.corner(layer, iu + 1, iv + 1),
            tu,
        );
        lerp(south, north, tv)
    }

    /// Stable value in `[0, 1]` for one lattice corner.
    fn corner(&self, layer: u32, iu: i32, iv: i32) -> f32 {
        let mut h = self.seed.wrapping_add(layer.wrapping_mul(0x9E37_79B9));
        h ^= (iu as u32).wrapping_mul(0x27D4_EB2F);
        h = h.rotate_left(15) ^ (iv as u32).wrapping_mul(0x1656_67B1);
        h ^= h >> 16;
        h = h.wrapping_mul(0x7FEB_352D);
        h ^= h >> 15;
        (h >> 16) as f32 / u16::MAX as f32
    }
}

fn ease(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_bounded_and_repeatable() {
        let field = JitterField::new(99, 2);
        for z in 0..20 {
            for x in 0..20 {
                let v = field.sample(x, z);
                assert!((0.0..=1.0).contains(&v));
                assert_eq!(v, JitterField::new(99, 2).sample(x, z));
            }
        }
    }

    #[test]
    fn neighbouring_cells_vary_smoothly() {
        let field = JitterField::new(3, 0);
        for x in 0..40 {
            let step = (field.sample(x, 5) - field.sample(x + 1, 5)).abs();
            assert!(step < 0.65, "jump of {step} at x={x}");
        }
    }

    #[test]
    fn channels_differ() {
        let a = JitterField::new(7, 0);
        let b = JitterField::new(7, 1);
        let differs = (0..30).any(|i| a.sample(i, i / 2) != b.sample(i, i / 2));
        assert!(differs);
    }
}
