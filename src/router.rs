//! Delegated event handling on a document.
//!
//! Each event type gets one listener on the document, shared by all [`Subscription`]s for that type.
//! Handlers are matched by selector against the event target and its ancestors, so elements created
//! after subscribing are covered too.

use crate::rc_hash_map::RcHashMap;
use hashbrown::HashMap;
use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	rc::{Rc, Weak},
};
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast};

/// Receives the element that matched the route's selector and the original event.
pub type Handler = Rc<dyn Fn(&web_sys::Element, &web_sys::Event)>;

/// Owns the document-level listeners. Cheap to clone, clones share routes.
#[derive(Clone)]
pub struct EventRouter {
	inner: Rc<RefCell<RouterInner>>,
}

struct RouterInner {
	document: web_sys::Document,
	listeners: RcHashMap<&'static str, u16, Closure<dyn Fn(web_sys::Event)>>,
	routes: HashMap<u64, Route>,
	next_route: u64,
	dispatch_depth: usize,
	/// Closures of removed listeners. JS may still be running one of them, so they are only dropped outside of dispatch.
	retired: Vec<Closure<dyn Fn(web_sys::Event)>>,
}

struct Route {
	event: &'static str,
	scope: web_sys::Element,
	selector: &'static str,
	handler: Handler,
}

impl Debug for EventRouter {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.inner.try_borrow() {
			Ok(inner) => f
				.debug_struct("EventRouter")
				.field("listeners", &inner.listeners)
				.field("routes", &inner.routes.len())
				.finish(),
			Err(_) => f.write_str("EventRouter { <dispatching> }"),
		}
	}
}

impl EventRouter {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			inner: Rc::new(RefCell::new(RouterInner {
				document,
				listeners: RcHashMap::new(),
				routes: HashMap::new(),
				next_route: 0,
				dispatch_depth: 0,
				retired: Vec::new(),
			})),
		}
	}

	/// Routes `event`s whose target is (inside) an element matching `selector` within `scope` to `handler`.
	///
	/// The route stays active until the returned [`Subscription`] is dropped.
	#[must_use = "The route is removed again when the `Subscription` is dropped."]
	#[instrument(skip(handler))]
	pub fn subscribe(&self, event: &'static str, scope: &web_sys::Element, selector: &'static str, handler: Handler) -> Subscription {
		let mut inner = self.inner.borrow_mut();
		inner.release_retired();

		let RouterInner { document, listeners, .. } = &mut *inner;
		let weak = Rc::downgrade(&self.inner);
		let result = listeners.increment_or_insert_with(event, || {
			let listener = Closure::wrap(Box::new(move |e: web_sys::Event| dispatch(&weak, event, &e)) as Box<dyn Fn(web_sys::Event)>);
			if let Err(error) = document.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
				error!("Failed to add event listener {:?}: {:?}", event, error);
			}
			trace!("Added document listener for {:?}.", event);
			listener
		});
		if result.is_err() {
			// Unreachable in practice with one route per subscription.
			error!("Too many (more than 65k) routes for {:?}", event);
		}

		let id = inner.next_route;
		inner.next_route += 1;
		inner.routes.insert(
			id,
			Route {
				event,
				scope: scope.clone(),
				selector,
				handler,
			},
		);
		Subscription {
			router: Rc::downgrade(&self.inner),
			id,
		}
	}

	/// The number of active routes.
	#[must_use]
	pub fn route_count(&self) -> usize {
		self.inner.borrow().routes.len()
	}

	/// The number of event types that currently have a document listener.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}
}

impl RouterInner {
	fn unsubscribe(&mut self, id: u64) {
		let route = match self.routes.remove(&id) {
			Some(route) => route,
			None => return warn!("Route {} was already removed.", id),
		};
		if let Err(error) = self.listeners.weak_decrement(route.event) {
			error!("Listener count underflow for {:?}: {:?}", route.event, error);
		}

		let RouterInner { document, listeners, retired, .. } = self;
		for (event, listener) in listeners.drain_weak() {
			if let Err(error) = document.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", event, error);
			}
			trace!("Removed document listener for {:?}.", event);
			retired.push(listener);
		}
		self.release_retired();
	}

	fn release_retired(&mut self) {
		if self.dispatch_depth == 0 && !self.retired.is_empty() {
			trace!("Releasing {} retired listener closure(s).", self.retired.len());
			self.retired.clear();
		}
	}
}

impl Drop for RouterInner {
	fn drop(&mut self) {
		let RouterInner { document, listeners, .. } = self;
		for (event, listener) in listeners.drain() {
			if let Err(error) = document.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", event, error);
			}
		}
	}
}

#[instrument(skip(router, event))]
fn dispatch(router: &Weak<RefCell<RouterInner>>, event_type: &'static str, event: &web_sys::Event) {
	let router = match router.upgrade() {
		Some(router) => router,
		None => return,
	};
	let target = match event.target().and_then(|target| target.dyn_into::<web_sys::Element>().ok()) {
		Some(target) => target,
		None => return trace!("Ignoring event without element target."),
	};

	// Handlers may subscribe or unsubscribe, so no borrow is held while they run.
	let matched = {
		let mut inner = router.borrow_mut();
		inner.dispatch_depth += 1;
		let mut matched = Vec::new();
		for route in inner.routes.values().filter(|route| route.event == event_type) {
			match target.closest(route.selector) {
				Ok(Some(element)) if route.scope.contains(Some(&*element)) => matched.push((element, route.handler.clone())),
				Ok(_) => (),
				Err(error) => error!("Invalid selector {:?}: {:?}", route.selector, error),
			}
		}
		matched
	};

	for (element, handler) in matched {
		let span = trace_span!("handler", selector_match = ?element.tag_name());
		let _enter = span.enter();
		handler(&element, event);
	}

	router.borrow_mut().dispatch_depth -= 1;
}

/// Keeps a route registered. Dropping it unregisters the route.
#[derive(Debug)]
pub struct Subscription {
	router: Weak<RefCell<RouterInner>>,
	id: u64,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(router) = self.router.upgrade() {
			router.borrow_mut().unsubscribe(self.id);
		}
	}
}
