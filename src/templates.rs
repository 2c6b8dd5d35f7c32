//! The three fragments the view renders.
//!
//! Templates are pure functions from a record to HTML. [`HtmlTemplates`] is a small built-in set that
//! follows [`contract`](crate::contract); pages with their own markup implement [`Templates`] instead.

use crate::{contract, person::FIELDS, Person};
use serde_json::Value;
use std::fmt::Write as _;

pub trait Templates {
	/// Where `person` is `PATCH`ed and `DELETE`d, if the record alone tells.
	///
	/// When it doesn't, the view keeps using the `href` of the links already in its container.
	fn resource_url(&self, person: &Person) -> Option<String>;
	/// The edit form, prefilled from `person` and submitted to `resource_url`.
	fn person_edit(&self, person: &Person, resource_url: &str) -> String;
	/// The read-only fragment placed inside the person container, linking to `resource_url`.
	fn person_show(&self, person: &Person, resource_url: &str) -> String;
	/// The list of validation messages placed in the form's error container.
	fn errors(&self, messages: &[String]) -> String;
}

/// Built-in [`Templates`]. Resource URLs are `{collection_path}/{id}` for records with a string or number id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTemplates {
	collection_path: String,
}

impl Default for HtmlTemplates {
	fn default() -> Self {
		Self::with_collection_path("/people")
	}
}

const LABELS: [&str; 4] = ["First name", "Last name", "Address", "Url"];

impl HtmlTemplates {
	#[must_use]
	pub fn with_collection_path(collection_path: impl Into<String>) -> Self {
		Self {
			collection_path: collection_path.into().trim_end_matches('/').to_owned(),
		}
	}
}

/// Strips the brackets from an attribute selector, so `[data-behavior=edit-person]` becomes `data-behavior="edit-person"`.
fn marker(selector: &str) -> String {
	let inner = selector.trim_start_matches('[').trim_end_matches(']');
	match inner.split_once('=') {
		Some((name, value)) => format!(r#"{}="{}""#, name, value),
		None => inner.to_owned(),
	}
}

impl Templates for HtmlTemplates {
	fn resource_url(&self, person: &Person) -> Option<String> {
		match person.id()? {
			Value::String(id) => Some(format!("{}/{}", self.collection_path, id)),
			Value::Number(id) => Some(format!("{}/{}", self.collection_path, id)),
			_ => None,
		}
	}

	fn person_edit(&self, person: &Person, resource_url: &str) -> String {
		let mut html = format!(
			r#"<form action="{}" method="post" {}><div {}></div>"#,
			escape(resource_url),
			marker(contract::UPDATE_FORM),
			marker(contract::ERROR_CONTAINER),
		);
		for (name, label) in FIELDS.iter().zip(&LABELS) {
			write!(
				html,
				r#"<div class="form-row"><label for="person_{name}">{label}</label><input type="text" id="person_{name}" name="{name}" value="{value}"></div>"#,
				name = name,
				label = label,
				value = escape(&person.field(name)),
			)
			.ok();
		}
		write!(html, r##"<input type="submit" value="Update"> <a href="#" {}>Cancel</a></form>"##, marker(contract::CANCEL_EDIT_LINK)).ok();
		html
	}

	fn person_show(&self, person: &Person, resource_url: &str) -> String {
		let resource_url = escape(resource_url);
		format!(
			r#"<p class="person-name">{first} {last}</p><p class="person-address">{address}</p><p class="person-url"><a href="{url}">{url}</a></p><a href="{resource}" {edit}>Edit</a> <a href="{resource}" {delete}>Delete</a>"#,
			first = escape(&person.field("first_name")),
			last = escape(&person.field("last_name")),
			address = escape(&person.field("address")),
			url = escape(&person.field("url")),
			resource = resource_url,
			edit = marker(contract::EDIT_LINK),
			delete = marker(contract::DELETE_LINK),
		)
	}

	fn errors(&self, messages: &[String]) -> String {
		let mut html = String::from(r#"<ul class="errors">"#);
		for message in messages {
			write!(html, "<li>{}</li>", escape(message)).ok();
		}
		html.push_str("</ul>");
		html
	}
}

/// Escapes text for use in HTML content and double-quoted attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}
