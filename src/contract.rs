//! Names shared between the view and its markup.
//!
//! These must match the server-rendered page and the templates exactly.

/// Marks the edit form. Its `submit` events are turned into `PATCH` requests.
pub const UPDATE_FORM: &str = "[data-behavior=update-person]";
/// Marks the link that switches to the edit form.
pub const EDIT_LINK: &str = "[data-behavior=edit-person]";
/// Marks the link whose `href` is `DELETE`d.
pub const DELETE_LINK: &str = "[data-behavior=delete-person]";
/// Marks the link that leaves the edit form without saving.
pub const CANCEL_EDIT_LINK: &str = "[data-behavior=cancel-edit]";

/// Receives the rendered error list inside the edit form.
pub const ERROR_CONTAINER: &str = "[data-container=errors]";
/// A labelled input row inside the edit form.
pub const FORM_ROW: &str = ".form-row";
/// Added to each [`FORM_ROW`] whose input failed validation.
pub const FIELD_WITH_ERRORS: &str = "field-with-errors";

/// Class of the per-person container element.
pub const PERSON_CLASS: &str = "person";
/// Attribute carrying the JSON of the record a show fragment was rendered from.
pub const PERSON_DATA: &str = "data-person";

pub const CONFIRM_DELETE: &str = "Are you sure?";

/// [`FIELD_WITH_ERRORS`] as a class selector.
#[must_use]
pub fn field_with_errors_selector() -> String {
	format!(".{}", FIELD_WITH_ERRORS)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selectors_are_attribute_selectors() {
		for selector in &[UPDATE_FORM, EDIT_LINK, DELETE_LINK, CANCEL_EDIT_LINK, ERROR_CONTAINER] {
			assert!(selector.starts_with('[') && selector.ends_with(']'), "{}", selector);
		}
		assert_eq!(field_with_errors_selector(), ".field-with-errors");
	}
}
