//! World-space point clouds built from depth maps.

use crate::math::{Mat4, Real, Vec3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Per-point colors of a cloud.
///
/// Colors loaded from snapshot PNGs are 8-bit; float colors in [0, 1] are
/// quantized (round + clamp) when a writer needs 8-bit channels.
#[derive(Debug, Clone)]
pub enum CloudColors {
    Rgb8(Vec<[u8; 3]>),
    UnitFloat(Vec<[Real; 3]>),
}

impl CloudColors {
    pub fn len(&self) -> usize {
        match self {
            CloudColors::Rgb8(v) => v.len(),
            CloudColors::UnitFloat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The i-th color as 8-bit channels, quantizing float colors.
    pub fn rgb8(&self, i: usize) -> [u8; 3] {
        match self {
            CloudColors::Rgb8(v) => v[i],
            CloudColors::UnitFloat(v) => {
                let c = v[i];
                [
                    quantize_channel(c[0]),
                    quantize_channel(c[1]),
                    quantize_channel(c[2]),
                ]
            }
        }
    }

    fn select(&self, keep: &[usize]) -> CloudColors {
        match self {
            CloudColors::Rgb8(v) => CloudColors::Rgb8(keep.iter().map(|&i| v[i]).collect()),
            CloudColors::UnitFloat(v) => {
                CloudColors::UnitFloat(keep.iter().map(|&i| v[i]).collect())
            }
        }
    }

    fn append(&mut self, other: &CloudColors) {
        match (self, other) {
            (CloudColors::Rgb8(a), CloudColors::Rgb8(b)) => a.extend_from_slice(b),
            (CloudColors::UnitFloat(a), CloudColors::UnitFloat(b)) => a.extend_from_slice(b),
            (a, b) => {
                // Mixed precision: fall back to 8-bit for the whole run.
                let mut merged: Vec<[u8; 3]> = (0..a.len()).map(|i| a.rgb8(i)).collect();
                merged.extend((0..b.len()).map(|i| b.rgb8(i)));
                *a = CloudColors::Rgb8(merged);
            }
        }
    }
}

/// Quantize a unit-interval color channel to 8 bits with round and clamp.
pub fn quantize_channel(value: Real) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Points unprojected from one depth map, with parallel optional colors and
/// source pixel coordinates.
///
/// The three sequences share one ordering; every filter applies the same
/// mask to all of them.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// World-space positions.
    pub points: Vec<Vec3>,
    /// Per-point colors, parallel to `points`.
    pub colors: Option<CloudColors>,
    /// Source pixel coordinates `(x, y)`, parallel to `points`.
    pub pixels: Vec<[u32; 2]>,
    /// Source image width in pixels.
    pub width: u32,
    /// Source image height in pixels.
    pub height: u32,
    /// World-to-screen transform the points were unprojected from.
    pub world_to_screen: Mat4,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep every `every_nth` element of a random permutation of the points.
    ///
    /// With `seed = None` the permutation differs between runs; pass a seed
    /// for reproducible output. `every_nth == 0` or `1` keeps everything
    /// (in permuted order for 1, untouched for 0, matching a disabled
    /// subsample).
    pub fn random_subsample(&mut self, every_nth: usize, seed: Option<u64>) {
        if every_nth == 0 {
            return;
        }
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut perm: Vec<usize> = (0..self.points.len()).collect();
        perm.shuffle(&mut rng);
        let keep: Vec<usize> = perm.into_iter().step_by(every_nth).collect();
        self.retain_indices(&keep);
    }

    fn retain_indices(&mut self, keep: &[usize]) {
        self.points = keep.iter().map(|&i| self.points[i]).collect();
        self.pixels = keep.iter().map(|&i| self.pixels[i]).collect();
        if let Some(colors) = &self.colors {
            self.colors = Some(colors.select(keep));
        }
    }
}

/// Concatenation of several clouds.
///
/// Only positions and colors survive a merge; pixel coordinates are
/// meaningless across frames. Colors are kept only when every part has
/// them. Points are never deduplicated.
#[derive(Debug, Clone)]
pub struct MergedCloud {
    pub points: Vec<Vec3>,
    pub colors: Option<CloudColors>,
}

impl MergedCloud {
    pub fn from_clouds(clouds: &[PointCloud]) -> Self {
        let all_colored = !clouds.is_empty() && clouds.iter().all(|c| c.colors.is_some());
        let mut points = Vec::with_capacity(clouds.iter().map(PointCloud::len).sum());
        let mut colors: Option<CloudColors> = None;
        for cloud in clouds {
            points.extend_from_slice(&cloud.points);
            if all_colored {
                let part = cloud.colors.as_ref().expect("checked all_colored");
                match &mut colors {
                    Some(acc) => acc.append(part),
                    None => colors = Some(part.clone()),
                }
            }
        }
        Self { points, colors }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud_of(n: usize, colored: bool) -> PointCloud {
        PointCloud {
            points: (0..n).map(|i| Vec3::new(i as Real, 0.0, 0.0)).collect(),
            colors: colored.then(|| CloudColors::Rgb8(vec![[1, 2, 3]; n])),
            pixels: (0..n).map(|i| [i as u32, 0]).collect(),
            width: n as u32,
            height: 1,
            world_to_screen: Mat4::identity(),
        }
    }

    #[test]
    fn subsample_keeps_every_nth_of_a_permutation() {
        let mut c = cloud_of(100, true);
        c.random_subsample(10, Some(7));
        assert_eq!(c.len(), 10);
        assert_eq!(c.pixels.len(), 10);
        assert_eq!(c.colors.as_ref().unwrap().len(), 10);
        // Parallel arrays stay aligned after the shuffle.
        for (p, px) in c.points.iter().zip(&c.pixels) {
            assert_eq!(p.x as u32, px[0]);
        }
    }

    #[test]
    fn subsample_is_deterministic_with_a_seed() {
        let mut a = cloud_of(50, false);
        let mut b = cloud_of(50, false);
        a.random_subsample(5, Some(42));
        b.random_subsample(5, Some(42));
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn subsample_zero_is_disabled() {
        let mut c = cloud_of(20, false);
        c.random_subsample(0, Some(1));
        assert_eq!(c.len(), 20);
    }

    #[test]
    fn merge_concatenates_without_dedup() {
        let merged = MergedCloud::from_clouds(&[cloud_of(3, true), cloud_of(3, true)]);
        assert_eq!(merged.len(), 6);
        assert_eq!(merged.colors.as_ref().unwrap().len(), 6);
    }

    #[test]
    fn merge_drops_colors_unless_all_parts_have_them() {
        let merged = MergedCloud::from_clouds(&[cloud_of(3, true), cloud_of(2, false)]);
        assert_eq!(merged.len(), 5);
        assert!(merged.colors.is_none());
    }

    #[test]
    fn float_colors_quantize_with_round_and_clamp() {
        let c = CloudColors::UnitFloat(vec![[0.0, 0.5, 1.0], [-0.2, 1.7, 0.501]]);
        assert_eq!(c.rgb8(0), [0, 128, 255]);
        assert_eq!(c.rgb8(1), [0, 255, 128]);
    }
}
