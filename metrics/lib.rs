/*!
This crate defines the [`Metric`](trait.Metric.html) and [`StreamingMetric`](trait.StreamingMetric.html) traits and a number of metrics for evaluating regression predictions with shape (n_examples, n_channels, height, width), such as [`MaskedMeanSquaredError`](struct.MaskedMeanSquaredError.html), which ignores labels marked as missing, and [`Accuracy`](struct.Accuracy.html).

Fallible functions return this crate's [`Error`](enum.Error.html). In an application, wrap them with `anyhow`:

```
use eval_metrics::masked_mean_squared_error;
use ndarray::prelude::*;

fn loss() -> anyhow::Result<f32> {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = arr2(&[[0.0, 2.0], [2.0, 2.0]]).into_shape((1, 1, 2, 2))?;
	Ok(masked_mean_squared_error(predictions.view(), labels.view())?)
}

assert_eq!(loss().unwrap(), 1.0);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod accuracy;
mod config;
mod error;
mod masked_mean_squared_error;
mod mean;
mod mean_squared_error;

pub use self::accuracy::{accuracy_fast, accuracy_item_by_item, Accuracy, AccuracyOptions};
pub use self::config::Config;
pub use self::error::{Error, Result};
pub use self::masked_mean_squared_error::{
	masked_mean_squared_error, masked_mean_squared_error_per_example, MaskedMeanSquaredError,
	MaskedMeanSquaredErrorInput, MaskedMeanSquaredErrorOptions,
	MaskedMeanSquaredErrorPerExampleOutput, MISSING_VALUE,
};
pub use self::mean::Mean;
pub use self::mean_squared_error::MeanSquaredError;

/**
A `Metric` is computed in one call when the whole input is available, as [`MaskedMeanSquaredError`](struct.MaskedMeanSquaredError.html) is for a batch of 4-D predictions and labels.

The generic lifetime `'a` lets `Input` borrow array views from the caller.
*/
pub trait Metric<'a> {
	type Input;
	type Output;
	fn compute(input: Self::Input) -> Self::Output;
}

/**
A `StreamingMetric` is aggregated one value at a time with `update()`. Metrics aggregated over separate chunks of a dataset are combined with `merge()`, and `finalize()` produces the result.

# Examples

This metric counts the labels that are present, that is not equal to [`MISSING_VALUE`](constant.MISSING_VALUE.html).

```
use eval_metrics::{StreamingMetric, MISSING_VALUE};

#[derive(Default)]
struct PresentCount(usize);

impl StreamingMetric<'_> for PresentCount {
	type Input = f32;
	type Output = usize;
	fn update(&mut self, label: Self::Input) {
		if label != MISSING_VALUE {
			self.0 += 1;
		}
	}
	fn merge(&mut self, other: Self) { self.0 += other.0 }
	fn finalize(self) -> Self::Output { self.0 }
}

let mut left = PresentCount::default();
left.update(0.0);
left.update(2.0);
let mut right = PresentCount::default();
right.update(3.0);
left.merge(right);
assert_eq!(left.finalize(), 2);
```
*/
pub trait StreamingMetric<'a> {
	/// The value aggregated by `update()`.
	type Input;
	/// The result of `finalize()`.
	type Output;
	fn update(&mut self, input: Self::Input);
	fn merge(&mut self, other: Self);
	fn finalize(self) -> Self::Output;
}
