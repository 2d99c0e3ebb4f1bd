use super::{
	error::{check_shapes, Error, Result},
	MeanSquaredError, Metric, StreamingMetric,
};
use itertools::izip;
use ndarray::{prelude::*, Zip};

/// The label value that marks a missing label unless another one is configured.
pub const MISSING_VALUE: f32 = 0.0;

/**
MaskedMeanSquaredError is the mean squared error between predictions and labels of shape (n_examples, n_channels, height, width), computed only over the positions whose label is present.

A label is missing if it is equal to `options.missing_value`, or, when an explicit `mask` is passed, if the mask is `true` at its position. Note that with the default sentinel a label that is genuinely zero cannot be told apart from a missing one. Pass a mask in that case.

Infinite or NaN predictions and labels are not treated specially and propagate into the result.
*/
#[derive(Debug, Default)]
pub struct MaskedMeanSquaredError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskedMeanSquaredErrorOptions {
	pub missing_value: f32,
}

impl Default for MaskedMeanSquaredErrorOptions {
	fn default() -> Self {
		Self {
			missing_value: MISSING_VALUE,
		}
	}
}

/// The input to [MaskedMeanSquaredError](struct.MaskedMeanSquaredError.html).
pub struct MaskedMeanSquaredErrorInput<'a> {
	/// (n_examples, n_channels, height, width)
	pub predictions: ArrayView4<'a, f32>,
	/// (n_examples, n_channels, height, width)
	pub labels: ArrayView4<'a, f32>,
	/// `true` where the label is missing. If `None`, the mask is derived from `options.missing_value`.
	pub mask: Option<ArrayView4<'a, bool>>,
	pub options: MaskedMeanSquaredErrorOptions,
}

/// The output from [masked_mean_squared_error_per_example](fn.masked_mean_squared_error_per_example.html).
#[derive(Debug, PartialEq)]
pub struct MaskedMeanSquaredErrorPerExampleOutput {
	/// The mean of `losses_per_example`.
	pub loss: f32,
	/// (n_examples)
	pub losses_per_example: Array1<f32>,
}

impl<'a> MaskedMeanSquaredErrorInput<'a> {
	pub fn new(predictions: ArrayView4<'a, f32>, labels: ArrayView4<'a, f32>) -> Self {
		Self {
			predictions,
			labels,
			mask: None,
			options: MaskedMeanSquaredErrorOptions::default(),
		}
	}

	fn check_shapes(&self) -> Result<()> {
		check_shapes(self.predictions.shape(), self.labels.shape())?;
		if let Some(mask) = self.mask {
			if mask.shape() != self.labels.shape() {
				return Err(Error::MaskShapeMismatch {
					mask: mask.shape().to_owned(),
					labels: self.labels.shape().to_owned(),
				});
			}
		}
		Ok(())
	}

	/// `true` where the label is missing.
	fn missing(&self) -> Array4<bool> {
		match self.mask {
			Some(mask) => mask.to_owned(),
			None => {
				let missing_value = self.options.missing_value;
				self.labels.mapv(|label| label == missing_value)
			}
		}
	}
}

impl<'a> Metric<'a> for MaskedMeanSquaredError {
	type Input = MaskedMeanSquaredErrorInput<'a>;
	type Output = Result<f32>;

	/// Average the squared errors over every present label in the batch. Missing labels count in neither the sum nor the number of values, so an input where every label is missing fails with `Error::EmptySelection`.
	fn compute(input: Self::Input) -> Self::Output {
		input.check_shapes()?;
		let missing = input.missing();
		let mut metric = MeanSquaredError::new();
		for (prediction, label, missing) in
			izip!(input.predictions.iter(), input.labels.iter(), missing.iter())
		{
			if !*missing {
				metric.update((*prediction, *label));
			}
		}
		log::debug!(
			"masked mean squared error over {} of {} values",
			metric.n(),
			input.labels.len(),
		);
		metric.finalize().ok_or(Error::EmptySelection)
	}
}

/// Compute the masked mean squared error of predictions and labels with shape (n_examples, n_channels, height, width), treating labels equal to [`MISSING_VALUE`](constant.MISSING_VALUE.html) as missing.
pub fn masked_mean_squared_error<'a>(
	predictions: ArrayView4<'a, f32>,
	labels: ArrayView4<'a, f32>,
) -> Result<f32> {
	MaskedMeanSquaredError::compute(MaskedMeanSquaredErrorInput::new(predictions, labels))
}

/**
Compute the masked mean squared error of each example along with the mean over all examples.

Unlike [MaskedMeanSquaredError](struct.MaskedMeanSquaredError.html), a missing label contributes a squared error of zero but still counts in the number of values of its example. An example whose labels are all missing therefore has a loss of zero instead of being undefined. The error is `Error::EmptySelection` only if there are no examples or each example has no values at all.
*/
pub fn masked_mean_squared_error_per_example(
	input: MaskedMeanSquaredErrorInput,
) -> Result<MaskedMeanSquaredErrorPerExampleOutput> {
	input.check_shapes()?;
	let missing = input.missing();
	let mut squared_errors = Array4::<f32>::zeros(input.labels.raw_dim());
	Zip::from(&mut squared_errors)
		.and(input.predictions)
		.and(input.labels)
		.and(&missing)
		.apply(|squared_error, prediction, label, missing| {
			if !*missing {
				*squared_error = (label - prediction).powi(2);
			}
		});
	let losses_per_example = squared_errors
		.axis_iter(Axis(0))
		.map(|squared_errors| squared_errors.mean().ok_or(Error::EmptySelection))
		.collect::<Result<Array1<f32>>>()?;
	let loss = losses_per_example.mean().ok_or(Error::EmptySelection)?;
	log::trace!(
		"masked mean squared error per example for {} examples",
		losses_per_example.len(),
	);
	Ok(MaskedMeanSquaredErrorPerExampleOutput {
		loss,
		losses_per_example,
	})
}

#[cfg(test)]
fn close(left: f32, right: f32) -> bool {
	f32::abs(left - right) < f32::EPSILON
}

#[test]
fn test_identical() {
	let values = arr2(&[[1.0, 2.0], [3.0, 4.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	assert_eq!(masked_mean_squared_error(values.view(), values.view()), Ok(0.0));
	let output =
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			values.view(),
			values.view(),
		))
		.unwrap();
	assert_eq!(output.loss, 0.0);
	assert_eq!(output.losses_per_example, arr1(&[0.0]));
}

#[test]
fn test_no_missing_labels() {
	let predictions = arr2(&[[1.0, 2.0], [3.0, 4.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let labels = arr2(&[[2.0, 2.0], [5.0, 1.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let loss = masked_mean_squared_error(predictions.view(), labels.view()).unwrap();
	assert!(close(loss, (1.0 + 0.0 + 4.0 + 9.0) / 4.0));
}

#[test]
fn test_one_missing_label() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = arr2(&[[0.0, 2.0], [2.0, 2.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let loss = masked_mean_squared_error(predictions.view(), labels.view()).unwrap();
	assert!(close(loss, 1.0));
	// The per example loss keeps the missing label in the number of values.
	let output =
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			predictions.view(),
			labels.view(),
		))
		.unwrap();
	assert!(close(output.loss, 0.75));
	assert_eq!(output.losses_per_example, arr1(&[0.75]));
}

#[test]
fn test_missing_predictions_are_ignored() {
	let labels = arr2(&[[0.0, 2.0], [2.0, 0.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let mut predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let before = masked_mean_squared_error(predictions.view(), labels.view()).unwrap();
	predictions[[0, 0, 0, 0]] = 1000.0;
	predictions[[0, 0, 1, 1]] = -7.5;
	let after = masked_mean_squared_error(predictions.view(), labels.view()).unwrap();
	assert_eq!(before, after);
	// Predictions equal to the labels wherever the labels are present give a loss of zero.
	predictions[[0, 0, 0, 1]] = 2.0;
	predictions[[0, 0, 1, 0]] = 2.0;
	assert_eq!(
		masked_mean_squared_error(predictions.view(), labels.view()),
		Ok(0.0)
	);
}

#[test]
fn test_all_labels_missing() {
	let predictions = arr2(&[[1.0, 2.0], [3.0, 4.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let labels = Array4::<f32>::zeros((1, 1, 2, 2));
	assert_eq!(
		masked_mean_squared_error(predictions.view(), labels.view()),
		Err(Error::EmptySelection)
	);
	let output =
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			predictions.view(),
			labels.view(),
		))
		.unwrap();
	assert_eq!(output.loss, 0.0);
	assert_eq!(output.losses_per_example, arr1(&[0.0]));
}

#[test]
fn test_per_example() {
	let predictions = Array4::<f32>::ones((2, 1, 2, 2));
	let labels = ndarray::arr3(&[[[0.0, 0.0], [0.0, 0.0]], [[2.0, 3.0], [0.0, 1.0]]])
		.into_shape((2, 1, 2, 2))
		.unwrap();
	let output =
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			predictions.view(),
			labels.view(),
		))
		.unwrap();
	assert_eq!(output.loss, output.losses_per_example.mean().unwrap());
	insta::assert_debug_snapshot!((output.loss, output.losses_per_example.to_vec()), @r###"
	(
	    0.625,
	    [
	        0.0,
	        1.25,
	    ],
	)
	"###);
}

#[test]
fn test_shape_mismatch() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = Array4::<f32>::ones((1, 1, 2, 3));
	let expected = Error::ShapeMismatch {
		predictions: vec![1, 1, 2, 2],
		labels: vec![1, 1, 2, 3],
	};
	assert_eq!(
		masked_mean_squared_error(predictions.view(), labels.view()),
		Err(expected.clone())
	);
	let error = masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
		predictions.view(),
		labels.view(),
	))
	.unwrap_err();
	assert_eq!(error, expected);
}

#[test]
fn test_explicit_mask() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	// The zero label here is a real value, not a missing one.
	let labels = arr2(&[[0.0, 9.0], [2.0, 2.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let mask = arr2(&[[false, true], [false, false]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let input = MaskedMeanSquaredErrorInput {
		mask: Some(mask.view()),
		..MaskedMeanSquaredErrorInput::new(predictions.view(), labels.view())
	};
	assert_eq!(MaskedMeanSquaredError::compute(input), Ok(1.0));
	let bad_mask = Array4::<bool>::from_elem((1, 1, 1, 2), false);
	let input = MaskedMeanSquaredErrorInput {
		mask: Some(bad_mask.view()),
		..MaskedMeanSquaredErrorInput::new(predictions.view(), labels.view())
	};
	assert_eq!(
		MaskedMeanSquaredError::compute(input),
		Err(Error::MaskShapeMismatch {
			mask: vec![1, 1, 1, 2],
			labels: vec![1, 1, 2, 2],
		})
	);
}

#[test]
fn test_custom_missing_value() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = arr2(&[[-1.0, 0.0], [1.0, 1.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let input = MaskedMeanSquaredErrorInput {
		options: MaskedMeanSquaredErrorOptions {
			missing_value: -1.0,
		},
		..MaskedMeanSquaredErrorInput::new(predictions.view(), labels.view())
	};
	assert!(close(MaskedMeanSquaredError::compute(input).unwrap(), 1.0 / 3.0));
}

#[test]
fn test_permuted_views() {
	let predictions = Array::from_shape_fn((2, 3, 2, 2), |(n, c, h, w)| {
		(n + 2 * c + 3 * h + 5 * w) as f32
	});
	let labels = Array::from_shape_fn((2, 3, 2, 2), |(n, c, h, w)| {
		if (n + c + h + w) % 3 == 0 {
			0.0
		} else {
			(n * c + h * w) as f32 + 1.0
		}
	});
	let expected = masked_mean_squared_error(predictions.view(), labels.view()).unwrap();
	let loss = masked_mean_squared_error(
		predictions.view().permuted_axes([0, 2, 3, 1]),
		labels.view().permuted_axes([0, 2, 3, 1]),
	)
	.unwrap();
	assert!(f32::abs(loss - expected) <= 1e-5 * expected);
}

#[test]
fn test_empty_batch() {
	let values = Array4::<f32>::zeros((0, 1, 2, 2));
	assert_eq!(
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			values.view(),
			values.view(),
		)),
		Err(Error::EmptySelection)
	);
}

#[test]
fn test_per_example_explicit_mask() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = arr2(&[[0.0, 9.0], [2.0, 3.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let mask = arr2(&[[false, true], [false, false]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let output = masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput {
		mask: Some(mask.view()),
		..MaskedMeanSquaredErrorInput::new(predictions.view(), labels.view())
	})
	.unwrap();
	assert!(close(output.loss, 1.5));
	assert_eq!(output.losses_per_example, arr1(&[1.5]));
	let bad_mask = Array4::<bool>::from_elem((2, 1, 2, 2), false);
	let error = masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput {
		mask: Some(bad_mask.view()),
		..MaskedMeanSquaredErrorInput::new(predictions.view(), labels.view())
	})
	.unwrap_err();
	assert_eq!(
		error,
		Error::MaskShapeMismatch {
			mask: vec![2, 1, 2, 2],
			labels: vec![1, 1, 2, 2],
		}
	);
}

#[test]
fn test_per_example_missing_predictions_are_ignored() {
	let labels = arr2(&[[0.0, 2.0], [2.0, 2.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let mut predictions = Array4::<f32>::ones((1, 1, 2, 2));
	predictions[[0, 0, 0, 0]] = f32::INFINITY;
	let output = masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
		predictions.view(),
		labels.view(),
	))
	.unwrap();
	assert_eq!(output.loss, 0.75);
	assert_eq!(output.losses_per_example, arr1(&[0.75]));
}

#[test]
fn test_empty_examples() {
	let values = Array4::<f32>::ones((2, 0, 2, 2));
	assert_eq!(
		masked_mean_squared_error(values.view(), values.view()),
		Err(Error::EmptySelection)
	);
	assert_eq!(
		masked_mean_squared_error_per_example(MaskedMeanSquaredErrorInput::new(
			values.view(),
			values.view(),
		)),
		Err(Error::EmptySelection)
	);
}

#[test]
fn test_negative_zero_label_is_missing() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = arr2(&[[-0.0, 2.0], [2.0, 2.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	assert_eq!(
		masked_mean_squared_error(predictions.view(), labels.view()),
		Ok(1.0)
	);
}
