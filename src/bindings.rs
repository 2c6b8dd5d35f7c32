//! The JavaScript entry point, for pages that construct views from script.
//!
//! ```js
//! const view = new PersonView("Ada", "Lovelace", "London", "", container, 1);
//! // …
//! view.detach();
//! ```

use crate::{router::EventRouter, view::Mode, Error, Person, PersonView, Services};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

thread_local! {
	static PAGE_ROUTER: RefCell<Option<EventRouter>> = RefCell::new(None);
}

/// The router shared by all views created through JavaScript.
fn page_router() -> Result<EventRouter, Error> {
	PAGE_ROUTER.with(|router| {
		let mut router = router.borrow_mut();
		if let Some(router) = &*router {
			return Ok(router.clone());
		}
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or(Error::MissingElement("document"))?;
		Ok(router.get_or_insert(EventRouter::new(document)).clone())
	})
}

#[wasm_bindgen(js_name = PersonView)]
#[derive(Debug)]
pub struct PersonViewHandle {
	view: Option<PersonView>,
}

#[wasm_bindgen(js_class = PersonView)]
impl PersonViewHandle {
	/// Binds a view with the browser's `fetch`, `confirm` and the built-in templates.
	///
	/// `id` may be left out if the container's edit or delete link already points at the person.
	///
	/// # Errors
	///
	/// Iff there is no `window` or `document`.
	#[wasm_bindgen(constructor)]
	pub fn new(first_name: String, last_name: String, address: String, url: String, container: web_sys::Element, id: Option<u32>) -> Result<PersonViewHandle, JsValue> {
		let person = Person::new(first_name, last_name, address, url);
		let person = match id {
			Some(id) => person.with_id(id),
			None => person,
		};
		Ok(Self {
			view: Some(PersonView::new(person, container, &page_router()?, Services::browser()?)),
		})
	}

	/// Binds a view to a container carrying its record in `data-person`.
	///
	/// # Errors
	///
	/// Iff there is no readable record, `window` or `document`.
	#[wasm_bindgen(js_name = fromContainer)]
	pub fn from_container(container: web_sys::Element) -> Result<PersonViewHandle, JsValue> {
		Ok(Self {
			view: Some(PersonView::from_container(container, &page_router()?, Services::browser()?)?),
		})
	}

	/// `"show"`, `"edit"`, `"removed"` or `"detached"`.
	#[must_use]
	pub fn mode(&self) -> String {
		match self.view.as_ref().map(PersonView::mode) {
			Some(Mode::Show) => "show",
			Some(Mode::Edit) => "edit",
			Some(Mode::Removed) => "removed",
			None => "detached",
		}
		.to_owned()
	}

	/// Stops handling events for this person. Idempotent.
	pub fn detach(&mut self) {
		if let Some(view) = self.view.take() {
			view.detach();
		}
	}
}
