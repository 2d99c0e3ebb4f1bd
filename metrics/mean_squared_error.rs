use super::{mean::Mean, StreamingMetric};

/// The mean squared error is the mean of squared differences between the predicted value and the label.
#[derive(Clone, Debug, Default)]
pub struct MeanSquaredError(Mean);

impl MeanSquaredError {
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of (prediction, label) pairs aggregated so far.
	pub fn n(&self) -> u64 {
		self.0.n()
	}
}

impl StreamingMetric<'_> for MeanSquaredError {
	/// (prediction, label)
	type Input = (f32, f32);
	type Output = Option<f32>;

	fn update(&mut self, value: Self::Input) {
		self.0.update((value.1 - value.0).powi(2))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

#[test]
fn test_mean_squared_error() {
	let mut metric = MeanSquaredError::new();
	metric.update((1.0, 2.0));
	metric.update((1.0, 4.0));
	assert_eq!(metric.n(), 2);
	assert_eq!(metric.finalize(), Some(5.0));
}

#[test]
fn test_mean_squared_error_merge_matches_single_pass() {
	let pairs = [(1.0, 2.0), (0.5, 0.5), (3.0, 1.0), (-1.0, 1.0)];
	let mut single = MeanSquaredError::new();
	pairs.iter().for_each(|pair| single.update(*pair));
	let mut left = MeanSquaredError::new();
	let mut right = MeanSquaredError::new();
	pairs[..1].iter().for_each(|pair| left.update(*pair));
	pairs[1..].iter().for_each(|pair| right.update(*pair));
	left.merge(right);
	assert_eq!(left.finalize(), single.finalize());
}
