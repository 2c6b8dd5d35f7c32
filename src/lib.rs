#![doc(html_root_url = "https://docs.rs/person-view-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A WebAssembly editor view for one person record inside a server-rendered page.
//!
//! A [`PersonView`](`view::PersonView`) owns a container element and toggles it between a read-only
//! ***show*** fragment and an ***edit*** form. Updates are sent as JSON `PATCH` requests,
//! deletions as `DELETE` requests. See [`contract`] for the markup the view expects.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod bindings;
pub mod confirm;
pub mod contract;
mod error;
pub mod form;
pub mod load;
pub mod person;
mod rc_hash_map;
pub mod router;
pub mod templates;
pub mod transport;
pub mod view;

pub use error::Error;
pub use person::{Person, ValidationErrors};
pub use view::{Mode, PersonView, Services};
