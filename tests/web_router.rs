use person_view_dom::router::{EventRouter, Subscription};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

mod web_support_;
use web_support_::{document, init_logging};

fn scope(html: &str) -> Element {
	let scope = document().create_element("section").unwrap();
	scope.set_inner_html(html);
	document().body().unwrap().append_child(&scope).unwrap();
	scope
}

fn click(element: &Element) {
	element.clone().dyn_into::<HtmlElement>().unwrap().click();
}

fn counter(router: &EventRouter, scope: &Element, selector: &'static str) -> (Rc<Cell<usize>>, Subscription) {
	let count = Rc::new(Cell::new(0));
	let subscription = router.subscribe("click", scope, selector, {
		let count = count.clone();
		Rc::new(move |_: &Element, _: &web_sys::Event| count.set(count.get() + 1))
	});
	(count, subscription)
}

#[wasm_bindgen_test]
fn one_document_listener_per_event_type() {
	init_logging();
	let router = EventRouter::new(document());
	let a = scope(r#"<button data-x="1">A</button>"#);

	let (_, first) = counter(&router, &a, "[data-x]");
	let (_, second) = counter(&router, &a, "button");
	let submit = router.subscribe("submit", &a, "form", Rc::new(|_: &Element, _: &web_sys::Event| ()));
	assert_eq!(router.route_count(), 3);
	assert_eq!(router.listener_count(), 2);

	drop(first);
	assert_eq!(router.listener_count(), 2);
	drop(second);
	assert_eq!(router.listener_count(), 1);
	drop(submit);
	assert_eq!(router.listener_count(), 0);
	assert_eq!(router.route_count(), 0);
	a.remove();
}

#[wasm_bindgen_test]
fn routes_match_ancestors_within_scope_only() {
	init_logging();
	let router = EventRouter::new(document());
	let a = scope(r##"<a href="#" data-behavior="edit-person"><span>Edit</span></a>"##);
	let b = scope(r##"<a href="#" data-behavior="edit-person">Edit</a>"##);

	let matched = Rc::new(RefCell::new(Vec::new()));
	let _route = router.subscribe("click", &a, "[data-behavior=edit-person]", {
		let matched = matched.clone();
		Rc::new(move |element: &Element, event: &web_sys::Event| {
			event.prevent_default();
			matched.borrow_mut().push(element.tag_name());
		})
	});

	click(&a.query_selector("span").unwrap().unwrap());
	assert_eq!(*matched.borrow(), ["A"]);

	click(&b.query_selector("a").unwrap().unwrap());
	assert_eq!(matched.borrow().len(), 1);

	// Elements created after subscribing are covered.
	a.set_inner_html(r##"<a href="#" data-behavior="edit-person">Again</a>"##);
	click(&a.query_selector("a").unwrap().unwrap());
	assert_eq!(matched.borrow().len(), 2);

	a.remove();
	b.remove();
}

#[wasm_bindgen_test]
fn handlers_may_unsubscribe_themselves() {
	init_logging();
	let router = EventRouter::new(document());
	let a = scope("<button>Once</button>");
	let button = a.query_selector("button").unwrap().unwrap();

	let count = Rc::new(Cell::new(0));
	let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();
	let subscription = router.subscribe("click", &a, "button", {
		let count = count.clone();
		let slot = slot.clone();
		Rc::new(move |_: &Element, _: &web_sys::Event| {
			count.set(count.get() + 1);
			drop(slot.borrow_mut().take());
		})
	});
	*slot.borrow_mut() = Some(subscription);

	click(&button);
	assert_eq!(count.get(), 1);
	assert_eq!(router.listener_count(), 0);

	click(&button);
	assert_eq!(count.get(), 1);

	// Retired listeners are released on the next change.
	let (again, _route) = counter(&router, &a, "button");
	click(&button);
	assert_eq!(again.get(), 1);
	assert_eq!(count.get(), 1);
	a.remove();
}

#[wasm_bindgen_test]
fn dropping_the_router_removes_its_listeners() {
	init_logging();
	let a = scope("<button>Gone</button>");
	let button = a.query_selector("button").unwrap().unwrap();

	let router = EventRouter::new(document());
	let (count, subscription) = counter(&router, &a, "button");
	drop(router);

	click(&button);
	assert_eq!(count.get(), 0);
	drop(subscription);
	a.remove();
}
