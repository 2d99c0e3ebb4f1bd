use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
	/// The prediction and label arrays (or the labels and an explicit mask) do not have the same shape. Nothing is broadcast.
	#[error("shape mismatch: predictions have shape {predictions:?} but labels have shape {labels:?}")]
	ShapeMismatch {
		predictions: Vec<usize>,
		labels: Vec<usize>,
	},
	/// An explicit mask does not have the shape of the labels.
	#[error("shape mismatch: mask has shape {mask:?} but labels have shape {labels:?}")]
	MaskShapeMismatch { mask: Vec<usize>, labels: Vec<usize> },
	/// The reduction would average over zero elements, for example because every label is missing.
	#[error("no elements left to average over")]
	EmptySelection,
}

/// Fail with `Error::ShapeMismatch` unless both shapes are identical.
pub(crate) fn check_shapes(predictions: &[usize], labels: &[usize]) -> Result<()> {
	if predictions != labels {
		return Err(Error::ShapeMismatch {
			predictions: predictions.to_owned(),
			labels: labels.to_owned(),
		});
	}
	Ok(())
}

#[test]
fn test_check_shapes() {
	assert_eq!(check_shapes(&[1, 1, 2, 2], &[1, 1, 2, 2]), Ok(()));
	let error = check_shapes(&[1, 1, 2, 2], &[1, 1, 2, 3]).unwrap_err();
	assert_eq!(
		error.to_string(),
		"shape mismatch: predictions have shape [1, 1, 2, 2] but labels have shape [1, 1, 2, 3]"
	);
}
