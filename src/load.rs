//! The record cached on a rendered show fragment.

use crate::{contract::PERSON_DATA, Error, Person};

/// Reads the record a show fragment was rendered from.
///
/// # Errors
///
/// Iff `element` has no [`PERSON_DATA`] attribute or it doesn't hold a person.
pub fn load_person(element: &web_sys::Element) -> Result<Person, Error> {
	let json = element.get_attribute(PERSON_DATA).ok_or(Error::MissingElement("`data-person` attribute"))?;
	Ok(Person::from_json(&json)?)
}

/// Caches `person` on `element`, for later [`load_person`] calls.
///
/// # Errors
///
/// Iff `person` can't be serialized or the attribute can't be set.
pub fn attach_person(element: &web_sys::Element, person: &Person) -> Result<(), Error> {
	element.set_attribute(PERSON_DATA, &person.to_json()?)?;
	Ok(())
}
