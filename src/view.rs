//! The person editor view.

use crate::{
	confirm::{Confirm, WindowConfirm},
	contract::{CANCEL_EDIT_LINK, CONFIRM_DELETE, DELETE_LINK, EDIT_LINK, UPDATE_FORM},
	form::{clear_validation_errors, serialize_form, show_validation_errors},
	load::{attach_person, load_person},
	router::{EventRouter, Subscription},
	templates::{HtmlTemplates, Templates},
	transport::{FetchTransport, HttpRequest, HttpResponse, Transport},
	Error, Person, ValidationErrors,
};
use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	mem,
	rc::Rc,
};
use tracing::{debug, error, info, instrument, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

/// What the container currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// The read-only fragment.
	Show,
	/// The edit form.
	Edit,
	/// The person was deleted and the container removed. Terminal.
	Removed,
}

/// The view's collaborators.
#[derive(Clone)]
pub struct Services {
	pub transport: Rc<dyn Transport>,
	pub templates: Rc<dyn Templates>,
	pub confirm: Rc<dyn Confirm>,
}

impl Debug for Services {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Services").finish()
	}
}

impl Services {
	#[must_use]
	pub fn new(transport: impl 'static + Transport, templates: impl 'static + Templates, confirm: impl 'static + Confirm) -> Self {
		Self {
			transport: Rc::new(transport),
			templates: Rc::new(templates),
			confirm: Rc::new(confirm),
		}
	}

	/// `fetch`, the built-in templates and `window.confirm`.
	///
	/// # Errors
	///
	/// Iff there is no `window` or `document`.
	pub fn browser() -> Result<Self, Error> {
		let window = web_sys::window().ok_or(Error::MissingElement("window"))?;
		Ok(Self::new(FetchTransport::from_window()?, HtmlTemplates::default(), WindowConfirm(window)))
	}
}

/// Shows, edits and deletes one person inside its container element.
///
/// The view handles clicks on the [edit](`EDIT_LINK`), [delete](`DELETE_LINK`) and [cancel](`CANCEL_EDIT_LINK`)
/// links and submissions of the [update form](`UPDATE_FORM`) inside its container, through the given [`EventRouter`].
///
/// Dropping the view (or calling [`PersonView::detach`]) removes its routes.
/// Responses to requests it sent are ignored from then on.
pub struct PersonView {
	inner: Rc<ViewInner>,
}

struct ViewInner {
	services: Services,
	router: EventRouter,
	state: RefCell<ViewState>,
}

struct ViewState {
	mode: Mode,
	snapshot: Person,
	/// Where the built-in markup sends `PATCH` and `DELETE` requests.
	resource_url: String,
	container: web_sys::Element,
	/// Advanced by every transition that makes pending update responses irrelevant.
	generation: u64,
	subscriptions: Vec<Subscription>,
}

type Action = fn(&Rc<ViewInner>, &web_sys::Element, &web_sys::Event);

impl Debug for PersonView {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.inner.state.try_borrow() {
			Ok(state) => f
				.debug_struct("PersonView")
				.field("mode", &state.mode)
				.field("generation", &state.generation)
				.field("container", &state.container)
				.finish(),
			Err(_) => f.write_str("PersonView { <busy> }"),
		}
	}
}

impl PersonView {
	/// Binds a view to `container`, which is expected to hold the show fragment for `person`.
	///
	/// If the templates can't derive a resource URL from `person`, the `href` of the container's
	/// edit or delete link is used instead.
	#[must_use]
	#[instrument(skip(person, router, services))]
	pub fn new(person: Person, container: web_sys::Element, router: &EventRouter, services: Services) -> Self {
		if cfg!(feature = "dangerous-logging") {
			debug!(?person, "Binding person view.");
		}
		let resource_url = services.templates.resource_url(&person).or_else(|| linked_resource_url(&container)).unwrap_or_else(|| {
			warn!("No resource URL for the person: no usable id and no edit or delete link with an `href`.");
			String::new()
		});
		trace!("Resource URL: {:?}", resource_url);
		let inner = Rc::new(ViewInner {
			services,
			router: router.clone(),
			state: RefCell::new(ViewState {
				mode: Mode::Show,
				snapshot: person,
				resource_url,
				container,
				generation: 0,
				subscriptions: Vec::new(),
			}),
		});
		inner.bind();
		Self { inner }
	}

	/// Binds a view to a container whose show fragment carries its record (see [`load_person`]).
	///
	/// # Errors
	///
	/// Iff the container has no readable record.
	pub fn from_container(container: web_sys::Element, router: &EventRouter, services: Services) -> Result<Self, Error> {
		let person = load_person(&container)?;
		Ok(Self::new(person, container, router, services))
	}

	#[must_use]
	pub fn mode(&self) -> Mode {
		self.inner.state.borrow().mode
	}

	#[must_use]
	pub fn snapshot(&self) -> Person {
		self.inner.state.borrow().snapshot.clone()
	}

	/// The current container. This changes when a successful update replaces it.
	#[must_use]
	pub fn container(&self) -> web_sys::Element {
		self.inner.state.borrow().container.clone()
	}

	#[must_use]
	pub fn generation(&self) -> u64 {
		self.inner.state.borrow().generation
	}

	/// Removes the view's routes and drops it. The container is left as it is.
	pub fn detach(self) {
		let subscriptions = {
			let mut state = self.inner.state.borrow_mut();
			state.generation += 1;
			mem::take(&mut state.subscriptions)
		};
		debug!("Detaching person view ({} route(s)).", subscriptions.len());
		drop(subscriptions);
	}
}

/// The `href` of the first edit or delete link in `container`.
fn linked_resource_url(container: &web_sys::Element) -> Option<String> {
	[EDIT_LINK, DELETE_LINK]
		.iter()
		.filter_map(|selector| container.query_selector(selector).ok().flatten())
		.find_map(|link| link.get_attribute("href"))
}

impl ViewInner {
	/// (Re)subscribes all routes, scoped to the current container.
	fn bind(self: &Rc<Self>) {
		let container = self.state.borrow().container.clone();
		let routes: [(&'static str, &'static str, Action); 4] = [
			("submit", UPDATE_FORM, Self::did_submit_update_form),
			("click", EDIT_LINK, Self::did_click_edit_link),
			("click", DELETE_LINK, Self::did_click_delete_link),
			("click", CANCEL_EDIT_LINK, Self::did_click_cancel_edit_link),
		];
		let subscriptions = routes
			.iter()
			.map(|&(event, selector, action)| {
				let view = Rc::downgrade(self);
				self.router.subscribe(
					event,
					&container,
					selector,
					Rc::new(move |element: &web_sys::Element, event: &web_sys::Event| {
						if let Some(view) = view.upgrade() {
							action(&view, element, event)
						}
					}),
				)
			})
			.collect();

		let previous = mem::replace(&mut self.state.borrow_mut().subscriptions, subscriptions);
		drop(previous);
	}

	/// Makes the container reflect `state.mode`.
	fn render(&self, state: &ViewState) {
		trace!("Rendering {:?}.", state.mode);
		match state.mode {
			Mode::Show => state.container.set_inner_html(&self.services.templates.person_show(&state.snapshot, &state.resource_url)),
			Mode::Edit => state.container.set_inner_html(&self.services.templates.person_edit(&state.snapshot, &state.resource_url)),
			Mode::Removed => state.container.remove(),
		}
	}

	fn transition(&self, mode: Mode) {
		let mut state = self.state.borrow_mut();
		if state.mode == Mode::Removed {
			return warn!("Ignoring transition to {:?} of a removed person.", mode);
		}
		state.mode = mode;
		state.generation += 1;
		self.render(&state);
	}

	#[instrument(skip(self, _link, event))]
	fn did_click_edit_link(self: &Rc<Self>, _link: &web_sys::Element, event: &web_sys::Event) {
		event.prevent_default();
		self.transition(Mode::Edit);
	}

	#[instrument(skip(self, _link, event))]
	fn did_click_cancel_edit_link(self: &Rc<Self>, _link: &web_sys::Element, event: &web_sys::Event) {
		event.prevent_default();
		self.transition(Mode::Show);
	}

	#[instrument(skip(self, link, event))]
	fn did_click_delete_link(self: &Rc<Self>, link: &web_sys::Element, event: &web_sys::Event) {
		event.prevent_default();
		if self.state.borrow().mode == Mode::Removed {
			return;
		}
		if !self.services.confirm.confirm(CONFIRM_DELETE) {
			return debug!("Deletion declined.");
		}

		let url = match link.dyn_ref::<web_sys::HtmlAnchorElement>().map(web_sys::HtmlAnchorElement::href).or_else(|| link.get_attribute("href")) {
			Some(url) => url,
			None => return error!("Delete link has no `href`."),
		};
		self.state.borrow_mut().generation += 1;

		let response = self.services.transport.send(HttpRequest::delete(url.clone()));
		let view = Rc::downgrade(self);
		spawn_local(async move {
			let result = response.await;
			match view.upgrade() {
				Some(view) => view.person_was_deleted(&url, result),
				None => debug!("View was dropped before DELETE {} finished.", url),
			}
		});
	}

	/// Removes the current container on success, whatever happened to the view in the meantime.
	fn person_was_deleted(&self, url: &str, result: Result<HttpResponse, Error>) {
		match result {
			Ok(response) if response.is_success() => (),
			Ok(response) => {
				let error = Error::Status {
					status: response.status,
					url: url.to_owned(),
				};
				return warn!("DELETE failed: {}", error);
			}
			Err(error) => return error!("DELETE {} failed: {}", url, error),
		}

		let subscriptions = {
			let mut state = self.state.borrow_mut();
			if state.mode == Mode::Removed {
				return;
			}
			state.mode = Mode::Removed;
			state.generation += 1;
			self.render(&state);
			mem::take(&mut state.subscriptions)
		};
		drop(subscriptions);
		info!("Removed deleted person ({}).", url);
	}

	#[instrument(skip(self, form, event))]
	fn did_submit_update_form(self: &Rc<Self>, form: &web_sys::Element, event: &web_sys::Event) {
		event.prevent_default();
		let generation = {
			let state = self.state.borrow();
			if state.mode == Mode::Removed {
				return;
			}
			state.generation
		};

		let form = match form.dyn_ref::<web_sys::HtmlFormElement>() {
			Some(form) => form.clone(),
			None => return error!("Update marker on a non-form element <{}>.", form.tag_name()),
		};
		let body = match serialize_form(&form).and_then(|params| Ok(serde_json::to_string(&params)?)) {
			Ok(body) => body,
			Err(error) => return error!("Failed to serialize the update form: {}", error),
		};
		let url = form.action();
		if cfg!(feature = "dangerous-logging") {
			debug!(%body, "PATCH {}", url);
		}

		// Not de-duplicated: each submission is sent.
		let response = self.services.transport.send(HttpRequest::patch_json(url.clone(), body));
		let view = Rc::downgrade(self);
		spawn_local(async move {
			let result = response.await;
			match view.upgrade() {
				Some(view) => view.update_finished(generation, &form, &url, result),
				None => debug!("View was dropped before PATCH {} finished.", url),
			}
		});
	}

	fn update_finished(self: &Rc<Self>, generation: u64, form: &web_sys::HtmlFormElement, url: &str, result: Result<HttpResponse, Error>) {
		let current = self.state.borrow().generation;
		if current != generation {
			return debug!("Ignoring stale response to PATCH {} (generation {}, now {}).", url, generation, current);
		}

		let response = match result {
			Ok(response) => response,
			Err(error) => return error!("PATCH {} failed: {}", url, error),
		};
		if response.is_success() {
			match Person::from_json(&response.body) {
				Ok(person) => {
					if let Err(error) = self.person_was_updated(form, person) {
						error!("Failed to show the updated person: {}", error);
					}
				}
				Err(error) => error!("PATCH {} returned a malformed person: {}", url, error),
			}
		} else {
			match ValidationErrors::from_json(&response.body) {
				Ok(errors) => {
					debug!("PATCH {} was rejected for {:?}.", url, errors.fields);
					if let Err(error) = show_validation_errors(form, &*self.services.templates, &errors) {
						error!("Failed to show validation errors: {}", error);
					}
				}
				Err(error) => {
					let status = Error::Status {
						status: response.status,
						url: url.to_owned(),
					};
					warn!("PATCH failed without validation errors: {} ({})", status, error);
				}
			}
		}
	}

	/// Replaces the container with a fresh show fragment for `person` and rebinds to it.
	///
	/// The view's state is only changed once the new container is in the document.
	fn person_was_updated(self: &Rc<Self>, form: &web_sys::HtmlFormElement, person: Person) -> Result<(), Error> {
		clear_validation_errors(form)?;
		form.reset();

		let previous = self.state.borrow().container.clone();
		let resource_url = self.services.templates.resource_url(&person).unwrap_or_else(|| self.state.borrow().resource_url.clone());
		let fresh = previous
			.clone_node()?
			.dyn_into::<web_sys::Element>()
			.map_err(|_| Error::MissingElement("element container"))?;
		fresh.set_inner_html(&self.services.templates.person_show(&person, &resource_url));
		attach_person(&fresh, &person)?;
		previous.replace_with_with_node_1(&fresh)?;

		{
			let mut state = self.state.borrow_mut();
			state.container = fresh;
			state.snapshot = person;
			state.resource_url = resource_url;
			state.mode = Mode::Show;
			state.generation += 1;
		}

		self.bind();
		debug!("Person updated.");
		Ok(())
	}
}

