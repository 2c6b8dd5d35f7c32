//! The HTTP seam.
//!
//! [`Transport::send`] starts the request immediately and returns a future for its response,
//! so a request is in flight as soon as the call returns.

use crate::Error;
use futures::future::LocalBoxFuture;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Delete,
	Patch,
}

impl Method {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Method::Delete => "DELETE",
			Method::Patch => "PATCH",
		}
	}
}

impl Display for Method {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A request with an optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub method: Method,
	pub url: String,
	pub body: Option<String>,
}

impl HttpRequest {
	#[must_use]
	pub fn delete(url: impl Into<String>) -> Self {
		Self {
			method: Method::Delete,
			url: url.into(),
			body: None,
		}
	}

	#[must_use]
	pub fn patch_json(url: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			method: Method::Patch,
			url: url.into(),
			body: Some(body.into()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub body: String,
}

impl HttpResponse {
	#[must_use]
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into() }
	}

	/// Any 2xx status.
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends requests. Implementations must not retry.
pub trait Transport {
	/// Resolves to `Err` only if no response was received at all. Error statuses are `Ok`.
	fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, Error>>;
}

/// [`Transport`] through [***fetch***](https://developer.mozilla.org/en-US/docs/Web/API/Fetch_API).
///
/// Besides the JSON headers, each request carries `X-Requested-With: XMLHttpRequest`
/// and, if known, the page's `X-CSRF-Token`, which server-rendered pages expect on non-`GET` requests.
#[derive(Debug, Clone)]
pub struct FetchTransport {
	window: web_sys::Window,
	csrf_token: Option<String>,
}

impl FetchTransport {
	#[must_use]
	pub fn new(window: web_sys::Window) -> Self {
		Self { window, csrf_token: None }
	}

	/// Uses the global `window` and picks up the CSRF token from `<meta name="csrf-token">`, if present.
	///
	/// # Errors
	///
	/// Iff there is no `window` or it has no `document`.
	#[instrument]
	pub fn from_window() -> Result<Self, Error> {
		let window = web_sys::window().ok_or(Error::MissingElement("window"))?;
		let document = window.document().ok_or(Error::MissingElement("document"))?;
		let csrf_token = document
			.query_selector("meta[name=csrf-token]")?
			.and_then(|meta| meta.get_attribute("content"));
		debug!("CSRF token present: {}", csrf_token.is_some());
		Ok(Self { window, csrf_token })
	}

	#[must_use]
	pub fn with_csrf_token(self, csrf_token: impl Into<String>) -> Self {
		Self {
			csrf_token: Some(csrf_token.into()),
			..self
		}
	}

	fn prepare(&self, request: &HttpRequest) -> Result<web_sys::Request, Error> {
		let headers = web_sys::Headers::new()?;
		headers.set("Accept", JSON)?;
		headers.set("X-Requested-With", "XMLHttpRequest")?;
		if let Some(csrf_token) = &self.csrf_token {
			headers.set("X-CSRF-Token", csrf_token)?;
		}

		let mut init = web_sys::RequestInit::new();
		init.method(request.method.as_str());
		if let Some(body) = &request.body {
			headers.set("Content-Type", JSON)?;
			init.body(Some(&JsValue::from_str(body)));
		}
		init.headers(&headers);

		Ok(web_sys::Request::new_with_str_and_init(&request.url, &init)?)
	}
}

impl Transport for FetchTransport {
	#[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
	fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, Error>> {
		let promise = self.prepare(&request).map(|prepared| self.window.fetch_with_request(&prepared));
		Box::pin(async move {
			let response: web_sys::Response = JsFuture::from(promise?).await?.dyn_into()?;
			let status = response.status();
			let body = JsFuture::from(response.text()?).await?.as_string().unwrap_or_default();
			trace!("{} {} -> {}", request.method, request.url, status);
			Ok(HttpResponse { status, body })
		})
	}
}
