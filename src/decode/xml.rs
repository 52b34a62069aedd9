//! XML bodies folded into the JSON value model.
//!
//! The root element is dropped, leaf elements become strings, elements with children become
//! objects, and repeated siblings collapse into arrays. Attributes carry nothing the handshake
//! reads and are skipped.

// crates.io
use quick_xml::{
	Reader,
	events::{BytesStart, Event},
};
use serde_json::Map;
// self
use crate::{_prelude::*, error::DecodeError};

struct Element {
	name: String,
	children: Map<String, Value>,
	text: String,
}
impl Element {
	fn new(name: String) -> Self {
		Self { name, children: Map::new(), text: String::new() }
	}

	fn into_value(self) -> (String, Value) {
		let value = if self.children.is_empty() {
			Value::String(self.text)
		} else {
			Value::Object(self.children)
		};

		(self.name, value)
	}

	fn adopt(&mut self, name: String, value: Value) {
		match self.children.get_mut(&name) {
			Some(Value::Array(items)) => items.push(value),
			Some(existing) => {
				let first = existing.take();

				*existing = Value::Array(vec![first, value]);
			},
			None => {
				self.children.insert(name, value);
			},
		}
	}
}

/// Parses `raw` and returns the value of its root element.
pub fn parse(raw: &str) -> Result<Value, DecodeError> {
	let mut reader = Reader::from_str(raw);
	let mut open = Vec::<Element>::new();
	let mut root = None;

	reader.config_mut().trim_text(true);

	loop {
		match reader.read_event().map_err(DecodeError::xml)? {
			Event::Start(start) => open.push(Element::new(element_name(&start)?)),
			Event::Empty(start) => {
				let name = element_name(&start)?;

				close(&mut open, &mut root, name, Value::String(String::new()))?;
			},
			Event::End(_) => {
				let (name, value) = open
					.pop()
					.ok_or_else(|| DecodeError::xml("closing tag without an open element"))?
					.into_value();

				close(&mut open, &mut root, name, value)?;
			},
			Event::Text(text) => {
				let text = text.unescape().map_err(DecodeError::xml)?;

				append_text(&mut open, &text)?;
			},
			Event::CData(data) => {
				let bytes = data.into_inner();
				let text = std::str::from_utf8(&bytes).map_err(DecodeError::xml)?;

				append_text(&mut open, text)?;
			},
			Event::Eof => break,
			_ => {},
		}
	}

	if let Some(element) = open.last() {
		return Err(DecodeError::xml(format_args!("element `{}` is never closed", element.name)));
	}

	root.ok_or_else(|| DecodeError::xml("document has no root element"))
}

fn element_name(start: &BytesStart) -> Result<String, DecodeError> {
	std::str::from_utf8(start.local_name().as_ref()).map(str::to_owned).map_err(DecodeError::xml)
}

fn close(
	open: &mut [Element],
	root: &mut Option<Value>,
	name: String,
	value: Value,
) -> Result<(), DecodeError> {
	match open.last_mut() {
		Some(parent) => {
			parent.adopt(name, value);

			Ok(())
		},
		None if root.is_none() => {
			*root = Some(value);

			Ok(())
		},
		None => Err(DecodeError::xml("document has more than one root element")),
	}
}

fn append_text(open: &mut [Element], text: &str) -> Result<(), DecodeError> {
	match open.last_mut() {
		Some(element) => {
			element.text.push_str(text);

			Ok(())
		},
		None => Err(DecodeError::xml("text outside the root element")),
	}
}
