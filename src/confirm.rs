use tracing::warn;

/// Asks the user a yes/no question, blocking until answered.
pub trait Confirm {
	fn confirm(&self, message: &str) -> bool;
}

/// [`Confirm`] through `window.confirm`.
#[derive(Debug, Clone)]
pub struct WindowConfirm(pub web_sys::Window);

impl Confirm for WindowConfirm {
	fn confirm(&self, message: &str) -> bool {
		self.0.confirm_with_message(message).unwrap_or_else(|error| {
			warn!("`confirm` failed, treating it as declined: {:?}", error);
			false
		})
	}
}

impl<F: Fn(&str) -> bool> Confirm for F {
	fn confirm(&self, message: &str) -> bool {
		self(message)
	}
}
