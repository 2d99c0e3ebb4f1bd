use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The arithmetic mean of a stream of values, accumulated in `f64`.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	n: u64,
	m: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of values aggregated so far.
	pub fn n(&self) -> u64 {
		self.n
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = f32;
	/// `None` if no values were aggregated.
	type Output = Option<f32>;

	fn update(&mut self, value: f32) {
		self.n += 1;
		let n = self.n.to_f64().unwrap();
		self.m += (value as f64 - self.m) / n;
	}

	fn merge(&mut self, other: Self) {
		if other.n == 0 {
			return;
		}
		let n = self.n + other.n;
		let self_n = self.n.to_f64().unwrap();
		let other_n = other.n.to_f64().unwrap();
		self.m = (self_n * self.m + other_n * other.m) / n.to_f64().unwrap();
		self.n = n;
	}

	fn finalize(self) -> Option<f32> {
		match self.n {
			0 => None,
			_ => Some(self.m as f32),
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::new();
	for value in &[1.0, 2.0, 3.0, 6.0] {
		mean.update(*value);
	}
	assert_eq!(mean.n(), 4);
	assert_eq!(mean.finalize(), Some(3.0));
}

#[test]
fn test_mean_empty() {
	assert_eq!(Mean::new().finalize(), None);
}

#[test]
fn test_mean_merge() {
	let mut left = Mean::new();
	left.update(1.0);
	left.update(2.0);
	let mut right = Mean::new();
	right.update(6.0);
	left.merge(right);
	left.merge(Mean::new());
	assert_eq!(left.finalize(), Some(3.0));
}
