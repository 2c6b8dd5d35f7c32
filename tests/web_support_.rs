#![allow(dead_code)]

use futures::{channel::oneshot, future::LocalBoxFuture};
use person_view_dom::{
	contract::PERSON_CLASS,
	templates::{HtmlTemplates, Templates},
	transport::{HttpRequest, HttpResponse, Transport},
	Error, Person, Services,
};
use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	rc::Rc,
	sync::Once,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Document, Element, EventInit, HtmlElement, HtmlInputElement};

static LOG_INITIALIZED: Once = Once::new();

pub fn init_logging() {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);
}

/// Records requests and answers them only when told to, oldest first.
#[derive(Clone, Default)]
pub struct ScriptedTransport(Rc<RefCell<ScriptedInner>>);

#[derive(Default)]
struct ScriptedInner {
	sent: Vec<HttpRequest>,
	pending: VecDeque<oneshot::Sender<Result<HttpResponse, Error>>>,
}

impl Transport for ScriptedTransport {
	fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, Error>> {
		let (sender, receiver) = oneshot::channel();
		let mut inner = self.0.borrow_mut();
		inner.sent.push(request);
		inner.pending.push_back(sender);
		Box::pin(async move { receiver.await.unwrap_or_else(|_| Err(Error::Js("scripted transport dropped the request".to_owned()))) })
	}
}

impl ScriptedTransport {
	pub fn sent(&self) -> Vec<HttpRequest> {
		self.0.borrow().sent.clone()
	}

	pub fn in_flight(&self) -> usize {
		self.0.borrow().pending.len()
	}

	pub fn respond(&self, status: u16, body: &str) {
		self.resolve(Ok(HttpResponse::new(status, body)));
	}

	pub fn fail(&self) {
		self.resolve(Err(Error::Js("network unreachable".to_owned())));
	}

	fn resolve(&self, result: Result<HttpResponse, Error>) {
		let sender = self.0.borrow_mut().pending.pop_front().expect("No request in flight.");
		let _ = sender.send(result);
	}
}

/// A scripted confirm prompt and how often it was shown.
#[derive(Clone, Default)]
pub struct Answers {
	pub accept: Rc<Cell<bool>>,
	pub asked: Rc<Cell<usize>>,
}

pub fn services(transport: &ScriptedTransport, answers: &Answers) -> Services {
	let answers = answers.clone();
	Services {
		transport: Rc::new(transport.clone()),
		templates: Rc::new(HtmlTemplates::default()),
		confirm: Rc::new(move |message: &str| {
			assert_eq!(message, "Are you sure?");
			answers.asked.set(answers.asked.get() + 1);
			answers.accept.get()
		}),
	}
}

pub fn document() -> Document {
	window().unwrap().document().unwrap()
}

pub fn ada() -> Person {
	Person::new("Ada", "Lovelace", "London", "").with_id(1)
}

/// Where the built-in templates send requests for `person`, which must have an id.
pub fn resource_url(person: &Person) -> String {
	HtmlTemplates::default().resource_url(person).expect("The person has no id.")
}

/// A `.person` container holding the show fragment for `person`, attached to the body.
pub fn container_for(person: &Person) -> Element {
	container_at(person, &resource_url(person))
}

/// Like [`container_for`], but with links to `url` regardless of the person's id.
pub fn container_at(person: &Person, url: &str) -> Element {
	let document = document();
	let container = document.create_element("div").unwrap();
	container.set_class_name(PERSON_CLASS);
	container.set_inner_html(&HtmlTemplates::default().person_show(person, url));
	document.body().unwrap().append_child(&container).unwrap();
	container
}

pub fn is_attached(element: &Element) -> bool {
	document().body().unwrap().contains(Some(&**element))
}

pub fn find(scope: &Element, selector: &str) -> Element {
	scope.query_selector(selector).unwrap().unwrap_or_else(|| panic!("Nothing matches {:?}.", selector))
}

pub fn click(scope: &Element, selector: &str) {
	find(scope, selector).dyn_into::<HtmlElement>().unwrap().click();
}

/// Dispatches a bubbling, cancelable `submit` on the form. Returns whether the default action was suppressed.
pub fn submit(scope: &Element) -> bool {
	let form = find(scope, "[data-behavior=update-person]");
	let mut init = EventInit::new();
	init.bubbles(true).cancelable(true);
	let event = web_sys::Event::new_with_event_init_dict("submit", &init).unwrap();
	!form.dispatch_event(&event).unwrap()
}

pub fn input(scope: &Element, name: &str) -> HtmlInputElement {
	find(scope, &format!("input[name={}]", name)).dyn_into().unwrap()
}

pub fn marked_rows(scope: &Element) -> Vec<Element> {
	let rows = scope.query_selector_all(".field-with-errors").unwrap();
	(0..rows.length()).map(|i| rows.item(i).unwrap().dyn_into().unwrap()).collect()
}

/// Lets spawned continuations run.
pub async fn settle() {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		window().unwrap().set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0).unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

pub fn show_html(person: &Person) -> String {
	HtmlTemplates::default().person_show(person, &resource_url(person))
}
