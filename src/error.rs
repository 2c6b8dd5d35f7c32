use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong below the event handlers.
///
/// Handlers are the boundary: validation failures are shown in the form, everything else ends up here and is logged.
#[derive(Debug, Error)]
pub enum Error {
	#[error("JavaScript error: {0}")]
	Js(String),

	#[error("malformed JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("unexpected HTTP status {status} from {url}")]
	Status { status: u16, url: String },

	#[error("missing {0}")]
	MissingElement(&'static str),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		js_sys::Error::new(&error.to_string()).into()
	}
}
