use super::{
	error::{check_shapes, Error, Result},
	mean::Mean,
	StreamingMetric,
};
use ndarray::{prelude::*, Zip};
use num_traits::ToPrimitive;

/**
The accuracy is the proportion of examples where the prediction is within a relative tolerance of the label, that is where `|prediction - label| < |pct_close * label|`.

The comparison is strict, so a label of exactly zero is never predicted accurately.
*/
#[derive(Clone, Debug)]
pub struct Accuracy {
	pct_close: f32,
	mean: Mean,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccuracyOptions {
	/// The tolerance relative to the label.
	pub pct_close: f32,
}

impl Default for AccuracyOptions {
	fn default() -> Self {
		Self { pct_close: 0.10 }
	}
}

impl Accuracy {
	pub fn new(options: AccuracyOptions) -> Self {
		Self {
			pct_close: options.pct_close,
			mean: Mean::new(),
		}
	}
}

impl Default for Accuracy {
	fn default() -> Self {
		Self::new(AccuracyOptions::default())
	}
}

fn is_close(prediction: f32, label: f32, pct_close: f32) -> bool {
	(prediction - label).abs() < (pct_close * label).abs()
}

impl StreamingMetric<'_> for Accuracy {
	/// (prediction, label)
	type Input = (f32, f32);
	type Output = Option<f32>;

	fn update(&mut self, value: Self::Input) {
		let (prediction, label) = value;
		self.mean
			.update(if is_close(prediction, label, self.pct_close) {
				1.0
			} else {
				0.0
			})
	}

	fn merge(&mut self, other: Self) {
		self.mean.merge(other.mean)
	}

	fn finalize(self) -> Option<f32> {
		self.mean.finalize()
	}
}

/**
Compute the accuracy of a whole batch of predictions and labels with shape (n_examples, n_channels, height, width) at once.

The number of accurate values over every channel is divided by `n_examples * height * width`, so the channel axis is not counted as separate items. With a single channel this is the proportion of accurate values. With more than one channel the result can exceed one.
*/
pub fn accuracy_fast(
	predictions: ArrayView4<f32>,
	labels: ArrayView4<f32>,
	options: AccuracyOptions,
) -> Result<f32> {
	check_shapes(predictions.shape(), labels.shape())?;
	let (n_examples, _, height, width) = labels.dim();
	let n_items = n_examples * height * width;
	if n_items == 0 {
		return Err(Error::EmptySelection);
	}
	let mut n_correct = 0usize;
	Zip::from(predictions)
		.and(labels)
		.apply(|prediction, label| {
			if is_close(*prediction, *label, options.pct_close) {
				n_correct += 1;
			}
		});
	log::debug!("{} of {} items are accurate", n_correct, n_items);
	Ok((n_correct.to_f64().unwrap() / n_items.to_f64().unwrap()) as f32)
}

/**
Compute the accuracy item by item, calling `predict` on the input of every example in turn.

This is slower than [accuracy_fast](fn.accuracy_fast.html) but each inaccurate prediction is logged at the debug level along with its index and label, which helps to find out why a model is wrong.
*/
pub fn accuracy_item_by_item<I, T, F>(
	examples: I,
	mut predict: F,
	options: AccuracyOptions,
) -> Result<f32>
where
	I: IntoIterator<Item = (T, f32)>,
	F: FnMut(&T) -> f32,
{
	let mut mean = Mean::new();
	let mut n_wrong = 0;
	for (index, (input, label)) in examples.into_iter().enumerate() {
		let prediction = predict(&input);
		let correct = is_close(prediction, label, options.pct_close);
		if !correct {
			n_wrong += 1;
			log::debug!(
				"example {}: predicted {} but the label is {}",
				index,
				prediction,
				label
			);
		}
		mean.update(if correct { 1.0 } else { 0.0 });
	}
	log::debug!("{} inaccurate predictions", n_wrong);
	mean.finalize().ok_or(Error::EmptySelection)
}

#[test]
fn test_accuracy() {
	let mut accuracy = Accuracy::default();
	accuracy.update((1.05, 1.0));
	accuracy.update((1.2, 1.0));
	accuracy.update((-2.1, -2.0));
	accuracy.update((0.0, 0.0));
	assert_eq!(accuracy.finalize(), Some(0.5));
}

#[test]
fn test_accuracy_merge() {
	let mut left = Accuracy::default();
	left.update((1.0, 1.0));
	let mut right = Accuracy::default();
	right.update((5.0, 1.0));
	right.update((3.0, 3.0));
	right.update((9.0, 3.0));
	left.merge(right);
	assert_eq!(left.finalize(), Some(0.5));
}

#[test]
fn test_accuracy_fast() {
	let predictions = arr2(&[[1.05, 2.5], [3.0, 0.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let labels = arr2(&[[1.0, 2.0], [3.0, 0.0]])
		.into_shape((1, 1, 2, 2))
		.unwrap();
	let accuracy =
		accuracy_fast(predictions.view(), labels.view(), AccuracyOptions::default()).unwrap();
	assert_eq!(accuracy, 0.5);
	let accuracy = accuracy_fast(
		predictions.view(),
		labels.view(),
		AccuracyOptions { pct_close: 0.5 },
	)
	.unwrap();
	assert_eq!(accuracy, 0.75);
}

#[test]
fn test_accuracy_fast_counts_items_without_channels() {
	let labels = Array4::<f32>::ones((1, 2, 1, 1));
	let accuracy =
		accuracy_fast(labels.view(), labels.view(), AccuracyOptions::default()).unwrap();
	assert_eq!(accuracy, 2.0);
}

#[test]
fn test_accuracy_fast_errors() {
	let predictions = Array4::<f32>::ones((1, 1, 2, 2));
	let labels = Array4::<f32>::ones((2, 1, 2, 2));
	assert_eq!(
		accuracy_fast(predictions.view(), labels.view(), AccuracyOptions::default()),
		Err(Error::ShapeMismatch {
			predictions: vec![1, 1, 2, 2],
			labels: vec![2, 1, 2, 2],
		})
	);
	let empty = Array4::<f32>::ones((0, 1, 2, 2));
	assert_eq!(
		accuracy_fast(empty.view(), empty.view(), AccuracyOptions::default()),
		Err(Error::EmptySelection)
	);
}

#[test]
fn test_accuracy_item_by_item() {
	let examples = vec![(1.0, 2.0), (2.0, 4.0), (3.0, 7.0), (4.0, 0.0)];
	let accuracy = accuracy_item_by_item(examples, |x: &f32| 2.0 * x, AccuracyOptions::default());
	assert_eq!(accuracy, Ok(0.5));
	let examples: Vec<(f32, f32)> = Vec::new();
	assert_eq!(
		accuracy_item_by_item(examples, |x: &f32| *x, AccuracyOptions::default()),
		Err(Error::EmptySelection)
	);
}

#[test]
fn test_accuracy_item_by_item_predicts_each_example_once() {
	let examples = vec![(1.0, 1.0), (2.0, 2.5), (3.0, 3.0)];
	let mut n_calls = 0;
	let accuracy = accuracy_item_by_item(
		examples,
		|x: &f32| {
			n_calls += 1;
			*x
		},
		AccuracyOptions::default(),
	);
	assert_eq!(n_calls, 3);
	assert!(f32::abs(accuracy.unwrap() - 2.0 / 3.0) < f32::EPSILON);
}
