/// Moving-average smoothing of integer sensor signals
use nalgebra::Vector3;

/// Fixed-capacity ring buffer keeping a running sum of its contents.
///
/// The buffer is seeded full at construction, so the mean is defined
/// before the first real sample arrives.
#[derive(Debug, Clone)]
pub struct Sampler {
    samples: Box<[i32]>,
    next: usize,
    sum: i64,
}

impl Sampler {
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, seed: i32) -> Self {
        assert!(capacity > 0, "sampler capacity must be non-zero");
        Self {
            samples: vec![seed; capacity].into_boxed_slice(),
            next: 0,
            sum: seed as i64 * capacity as i64,
        }
    }

    /// Replace the oldest sample with `value`
    pub fn push(&mut self, value: i32) {
        self.sum -= self.samples[self.next] as i64;
        self.samples[self.next] = value;
        self.sum += value as i64;
        self.next = (self.next + 1) % self.samples.len();
    }

    /// Integer mean, truncated towards zero
    pub fn mean(&self) -> i32 {
        (self.sum / self.samples.len() as i64) as i32
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }
}

/// One sampler per accelerometer axis
#[derive(Debug, Clone)]
pub struct AxisSamplers {
    pub x: Sampler,
    pub y: Sampler,
    pub z: Sampler,
}

impl AxisSamplers {
    pub fn new(capacity: usize, seed: [i32; 3]) -> Self {
        Self {
            x: Sampler::new(capacity, seed[0]),
            y: Sampler::new(capacity, seed[1]),
            z: Sampler::new(capacity, seed[2]),
        }
    }

    pub fn push(&mut self, x: i32, y: i32, z: i32) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }

    pub fn mean(&self) -> Vector3<f32> {
        Vector3::new(
            self.x.mean() as f32,
            self.y.mean() as f32,
            self.z.mean() as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents_sum(sampler: &Sampler) -> i64 {
        sampler.samples.iter().map(|&s| s as i64).sum()
    }

    #[test]
    fn test_seeded_mean() {
        let sampler = Sampler::new(8, -816);
        assert_eq!(sampler.mean(), -816);
        assert_eq!(sampler.capacity(), 8);
    }

    #[test]
    fn test_identical_values_give_exact_mean() {
        let mut sampler = Sampler::new(8, 0);
        for _ in 0..8 {
            sampler.push(37);
        }
        assert_eq!(sampler.mean(), 37);
    }

    #[test]
    fn test_mean_reflects_only_last_pushes() {
        let mut sampler = Sampler::new(4, 1000);
        for v in [1, 2, 3, 4, 5, 6, 7, 8] {
            sampler.push(v);
        }
        // last four: 5, 6, 7, 8
        assert_eq!(sampler.sum(), 26);
        assert_eq!(sampler.mean(), 6);
    }

    #[test]
    fn test_running_sum_matches_contents() {
        let mut sampler = Sampler::new(5, -81);
        for (i, v) in [-3, 900, -571, 12, 0, 44, -1000, 7].iter().enumerate() {
            sampler.push(*v);
            assert_eq!(sampler.sum(), contents_sum(&sampler), "after push {}", i);
        }
    }

    #[test]
    fn test_partial_displacement() {
        let mut sampler = Sampler::new(4, 0);
        sampler.push(40);
        assert_eq!(sampler.mean(), 10);
    }

    #[test]
    fn test_mean_truncates_toward_zero() {
        let mut sampler = Sampler::new(2, 0);
        sampler.push(-3);
        assert_eq!(sampler.mean(), -1);
    }

    #[test]
    fn test_axis_samplers() {
        let mut samplers = AxisSamplers::new(2, [-81, -816, -571]);
        assert_eq!(samplers.mean(), Vector3::new(-81.0, -816.0, -571.0));
        samplers.push(0, 0, -1000);
        samplers.push(0, 0, -1000);
        assert_eq!(samplers.mean(), Vector3::new(0.0, 0.0, -1000.0));
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_rejected() {
        let _ = Sampler::new(0, 0);
    }
}
