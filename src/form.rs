//! Reading the edit form and annotating it with validation errors.

use crate::{
	contract::{field_with_errors_selector, ERROR_CONTAINER, FIELD_WITH_ERRORS, FORM_ROW},
	templates::Templates,
	Error, ValidationErrors,
};
use serde_json::{Map, Value};
use tracing::{instrument, trace, warn};
use wasm_bindgen::JsCast;

/// Collects the form's successful controls into a flat name → value object, in form order.
///
/// Later controls overwrite earlier ones of the same name (keeping the first position). File controls are skipped.
///
/// # Errors
///
/// Iff the browser refuses to build or iterate the form data.
#[instrument(skip(form))]
pub fn serialize_form(form: &web_sys::HtmlFormElement) -> Result<Map<String, Value>, Error> {
	let data = web_sys::FormData::new_with_form(form)?;
	let entries = js_sys::try_iter(&data)?.ok_or(Error::MissingElement("iterable form data"))?;

	let mut params = Map::new();
	for entry in entries {
		let entry: js_sys::Array = entry?.dyn_into()?;
		let name = match entry.get(0).as_string() {
			Some(name) => name,
			None => continue,
		};
		match entry.get(1).as_string() {
			Some(value) => {
				params.insert(name, Value::String(value));
			}
			None => trace!("Skipping non-text form entry {:?}.", name),
		}
	}
	Ok(params)
}

/// Shows `errors` in the form: renders the messages and marks the rows of the listed inputs.
///
/// Rows marked by an earlier failure are cleared first.
///
/// # Errors
///
/// Iff a DOM query or class list update fails.
#[instrument(skip(form, templates, errors), fields(fields = ?errors.fields))]
pub fn show_validation_errors(form: &web_sys::Element, templates: &dyn Templates, errors: &ValidationErrors) -> Result<(), Error> {
	match form.query_selector(ERROR_CONTAINER)? {
		Some(container) => container.set_inner_html(&templates.errors(&errors.full_messages)),
		None => warn!("The update form has no error container."),
	}
	clear_marked_rows(form)?;

	let inputs = form.query_selector_all("input")?;
	for i in 0..inputs.length() {
		let input = match inputs.item(i).and_then(|node| node.dyn_into::<web_sys::Element>().ok()) {
			Some(input) => input,
			None => continue,
		};
		let listed = input.get_attribute("name").map_or(false, |name| errors.fields.contains(&name));
		if !listed {
			continue;
		}
		match input.closest(FORM_ROW)? {
			Some(row) => row.class_list().add_1(FIELD_WITH_ERRORS)?,
			None => warn!("Input with errors is outside of any form row."),
		}
	}
	Ok(())
}

/// Empties the error container and unmarks all rows.
///
/// # Errors
///
/// Iff a DOM query or class list update fails.
pub fn clear_validation_errors(form: &web_sys::Element) -> Result<(), Error> {
	if let Some(container) = form.query_selector(ERROR_CONTAINER)? {
		container.set_inner_html("");
	}
	clear_marked_rows(form)
}

fn clear_marked_rows(form: &web_sys::Element) -> Result<(), Error> {
	let marked = form.query_selector_all(&field_with_errors_selector())?;
	for i in 0..marked.length() {
		if let Some(row) = marked.item(i).and_then(|node| node.dyn_into::<web_sys::Element>().ok()) {
			row.class_list().remove_1(FIELD_WITH_ERRORS)?;
		}
	}
	Ok(())
}
