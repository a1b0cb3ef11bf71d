//! Outgoing message model
//!
//! A [`Message`] carries exactly one body variant. Setting a body replaces
//! whatever was there before, which is how the delivery contract's
//! precedence rule is enforced: engines apply the text body first and the
//! HTML body second, so HTML wins whenever both are supplied.

/// The single body variant of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
	Text(String),
	Html(String),
}

impl Body {
	/// Get the body content.
	pub fn content(&self) -> &str {
		match self {
			Self::Text(text) => text,
			Self::Html(html) => html,
		}
	}

	/// Get the MIME content type for this body.
	pub fn content_type(&self) -> &str {
		match self {
			Self::Text(_) => "text/plain",
			Self::Html(_) => "text/html",
		}
	}
}

/// An outgoing email message.
///
/// Fields are private; construction goes through [`Message::new`] or
/// [`Message::simple`] and read access through the getters, mirroring how
/// a delivery engine consumes it.
///
/// # Examples
///
/// ```
/// use mailtemplate::{Body, Message};
///
/// let mut message = Message::new(
///     "noreply@example.com",
///     vec!["user@example.com".to_string()],
///     "Welcome",
/// );
/// message.set_text_body("plain");
/// message.set_html_body("<p>rich</p>");
///
/// // The later body replaced the earlier one.
/// assert_eq!(message.body(), Some(&Body::Html("<p>rich</p>".to_string())));
/// ```
#[derive(Debug, Clone)]
pub struct Message {
	from_address: String,
	to_addresses: Vec<String>,
	subject: String,
	body: Option<Body>,
}

impl Message {
	/// Create a message without a body.
	pub fn new(
		from_address: impl Into<String>,
		to_addresses: Vec<String>,
		subject: impl Into<String>,
	) -> Self {
		Self {
			from_address: from_address.into(),
			to_addresses,
			subject: subject.into(),
			body: None,
		}
	}

	/// Build a message from the `send_simple_message` arguments.
	///
	/// Applies the text body first and the HTML body second; with both
	/// supplied, the HTML body is the one that ends up on the message.
	pub fn simple(
		from_address: &str,
		to_addresses: &[String],
		subject: &str,
		text_body: Option<&str>,
		html_body: Option<&str>,
	) -> Self {
		let mut message = Self::new(from_address, to_addresses.to_vec(), subject);
		if let Some(text) = text_body {
			message.set_text_body(text);
		}
		if let Some(html) = html_body {
			message.set_html_body(html);
		}
		message
	}

	/// Set a plain text body, replacing any existing body.
	///
	/// The content is trimmed of surrounding whitespace.
	pub fn set_text_body(&mut self, text: impl AsRef<str>) -> &mut Self {
		self.body = Some(Body::Text(text.as_ref().trim().to_string()));
		self
	}

	/// Set an HTML body, replacing any existing body.
	///
	/// The content is trimmed of surrounding whitespace.
	pub fn set_html_body(&mut self, html: impl AsRef<str>) -> &mut Self {
		self.body = Some(Body::Html(html.as_ref().trim().to_string()));
		self
	}

	/// Get the sender address.
	pub fn from_address(&self) -> &str {
		&self.from_address
	}

	/// Get the recipient addresses, in the order supplied.
	pub fn to_addresses(&self) -> &[String] {
		&self.to_addresses
	}

	/// Get the subject.
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// Get the body, if one was set.
	pub fn body(&self) -> Option<&Body> {
		self.body.as_ref()
	}
}
