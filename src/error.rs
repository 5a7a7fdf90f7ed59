use crate::state::ResultState;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DensityError>;

#[derive(Error, Debug)]
pub enum DensityError {
	#[error("input buffer too small")]
	InputBufferTooSmall,

	#[error("output buffer too small")]
	OutputBufferTooSmall,

	#[error("error during processing: {0}")]
	ProcessingError(String),

	#[error("invalid context")]
	InvalidContext,

	#[error("invalid algorithm: {0}")]
	InvalidAlgorithm(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Configuration error: {0}")]
	ConfigError(String),
}

impl DensityError {
	/// Builds the error for a non-`Ok` state reported by a backend.
	pub fn from_state(state: ResultState) -> Self {
		match state {
			ResultState::InputBufferTooSmall => DensityError::InputBufferTooSmall,
			ResultState::OutputBufferTooSmall => DensityError::OutputBufferTooSmall,
			ResultState::InvalidContext => DensityError::InvalidContext,
			ResultState::InvalidAlgorithm => {
				DensityError::InvalidAlgorithm("unrecognized algorithm identifier".to_string())
			}
			ResultState::ProcessingError => {
				DensityError::ProcessingError("corrupt or foreign frame".to_string())
			}
			ResultState::Ok => {
				DensityError::ProcessingError("backend reported success as a failure".to_string())
			}
		}
	}

	/// The codec state this error carries, `None` for wrapper-level failures.
	pub fn state(&self) -> Option<ResultState> {
		match self {
			DensityError::InputBufferTooSmall => Some(ResultState::InputBufferTooSmall),
			DensityError::OutputBufferTooSmall => Some(ResultState::OutputBufferTooSmall),
			DensityError::ProcessingError(_) => Some(ResultState::ProcessingError),
			DensityError::InvalidContext => Some(ResultState::InvalidContext),
			DensityError::InvalidAlgorithm(_) => Some(ResultState::InvalidAlgorithm),
			DensityError::Io(_) | DensityError::ConfigError(_) => None,
		}
	}

	/// Fixed description of the carried state, empty for wrapper-level failures.
	pub fn description(&self) -> &'static str {
		self.state().map(ResultState::description).unwrap_or("")
	}

	/// An undersized destination is fixed by reallocating with a correctly
	/// computed size.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, DensityError::OutputBufferTooSmall)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_state_round_trip() {
		for state in [
			ResultState::InputBufferTooSmall,
			ResultState::OutputBufferTooSmall,
			ResultState::ProcessingError,
			ResultState::InvalidContext,
			ResultState::InvalidAlgorithm,
		] {
			assert_eq!(DensityError::from_state(state).state(), Some(state));
		}
	}

	#[test]
	fn test_ok_is_never_an_error_kind() {
		// A backend bug reporting Ok through the error path still fails closed.
		let err = DensityError::from_state(ResultState::Ok);
		assert_eq!(err.state(), Some(ResultState::ProcessingError));
	}

	#[test]
	fn test_processing_message_names_the_cause() {
		let message = DensityError::from_state(ResultState::ProcessingError).to_string();
		assert_eq!(message, "error during processing: corrupt or foreign frame");
		assert_eq!(message.matches("error during processing").count(), 1);
	}

	#[test]
	fn test_recoverable() {
		assert!(DensityError::OutputBufferTooSmall.is_recoverable());
		assert!(!DensityError::InvalidContext.is_recoverable());
		assert!(!DensityError::ProcessingError("corrupt".into()).is_recoverable());
	}

	#[test]
	fn test_wrapper_errors_have_no_state() {
		let err = DensityError::ConfigError("bad".into());
		assert_eq!(err.state(), None);
		assert_eq!(err.description(), "");
	}
}
