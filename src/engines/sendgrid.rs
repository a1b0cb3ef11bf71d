//! SendGrid delivery engine
//!
//! Reference HTTP provider: posts a v3 mail-send payload to the SendGrid
//! API with a bearer API key. The wire protocol beyond the payload shape is
//! treated as opaque; any non-2xx answer maps to
//! [`DeliveryError::NotMade`] with the raw response preserved.
//!
//! # Examples
//!
//! ```no_run
//! use mailtemplate::DeliveryEngine;
//! use mailtemplate::engines::SendGridEngine;
//!
//! let engine = SendGridEngine::new("SG.api-key".to_string());
//!
//! engine
//!     .send_simple_message(
//!         "noreply@example.com",
//!         &["user@example.com".to_string()],
//!         "Welcome",
//!         None,
//!         Some("<h1>Welcome</h1>"),
//!     )
//!     .unwrap();
//! ```

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::message::Message;
use crate::{Delivery, DeliveryEngine, DeliveryError, EngineResponse};

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid email address
#[derive(Debug, Clone, Serialize)]
struct SendGridAddress {
	email: String,
}

/// SendGrid email content
#[derive(Debug, Clone, Serialize)]
struct SendGridContent {
	#[serde(rename = "type")]
	content_type: String,
	value: String,
}

/// SendGrid personalization
#[derive(Debug, Clone, Serialize)]
struct SendGridPersonalization {
	to: Vec<SendGridAddress>,
	subject: String,
}

/// SendGrid API request
#[derive(Debug, Clone, Serialize)]
struct SendGridRequest {
	personalizations: Vec<SendGridPersonalization>,
	from: SendGridAddress,
	subject: String,
	content: Vec<SendGridContent>,
}

/// SendGrid-backed [`DeliveryEngine`].
///
/// Holds only the API key, endpoint and HTTP client; concurrent sends are
/// independent.
pub struct SendGridEngine {
	api_key: String,
	api_url: String,
	client: Client,
}

impl SendGridEngine {
	/// Create an engine against the production SendGrid endpoint.
	pub fn new(api_key: String) -> Self {
		Self::with_api_url(api_key, SENDGRID_API_URL.to_string())
	}

	/// Create an engine against a custom endpoint.
	///
	/// Used for tests and for proxied deployments.
	pub fn with_api_url(api_key: String, api_url: String) -> Self {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.expect("Failed to create HTTP client");

		Self {
			api_key,
			api_url,
			client,
		}
	}

	/// Create an engine with a custom HTTP client.
	pub fn with_client(api_key: String, api_url: String, client: Client) -> Self {
		Self {
			api_key,
			api_url,
			client,
		}
	}

	fn build_request(&self, message: &Message) -> SendGridRequest {
		let to = message
			.to_addresses()
			.iter()
			.map(|address| SendGridAddress {
				email: address.clone(),
			})
			.collect();

		// Exactly one body variant survives message construction, so the
		// content list has at most one entry.
		let content = message
			.body()
			.map(|body| {
				vec![SendGridContent {
					content_type: body.content_type().to_string(),
					value: body.content().to_string(),
				}]
			})
			.unwrap_or_default();

		SendGridRequest {
			personalizations: vec![SendGridPersonalization {
				to,
				subject: message.subject().to_string(),
			}],
			from: SendGridAddress {
				email: message.from_address().to_string(),
			},
			subject: message.subject().to_string(),
			content,
		}
	}
}

impl DeliveryEngine for SendGridEngine {
	fn send_simple_message(
		&self,
		from_address: &str,
		to_addresses: &[String],
		subject: &str,
		text_body: Option<&str>,
		html_body: Option<&str>,
	) -> Result<Delivery, DeliveryError> {
		let message = Message::simple(from_address, to_addresses, subject, text_body, html_body);
		let request = self.build_request(&message);

		let response = self
			.client
			.post(&self.api_url)
			.bearer_auth(&self.api_key)
			.json(&request)
			.send()
			.map_err(|e| {
				tracing::error!(error = %e, "sendgrid transport failure");
				DeliveryError::Transport(e)
			})?;

		let status = response.status();
		if !status.is_success() {
			let body = response
				.text()
				.unwrap_or_else(|_| "Unknown error".to_string());
			return Err(DeliveryError::NotMade {
				details: format!("Got unexpected status from sendgrid: {}", status.as_u16()),
				response: Some(EngineResponse {
					status: status.as_u16(),
					body,
				}),
			});
		}

		tracing::debug!(status = status.as_u16(), "sendgrid accepted message");
		Ok(Delivery {
			status: status.as_u16(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn engine_for(server: &mockito::ServerGuard) -> SendGridEngine {
		SendGridEngine::with_api_url("test-key".to_string(), server.url())
	}

	/// Test: request payload carries sender, recipients and subject
	#[rstest]
	fn test_build_request_basic() {
		// Arrange
		let engine = SendGridEngine::new("test-key".to_string());
		let message = Message::simple(
			"sender@example.com",
			&["recipient@example.com".to_string()],
			"Test",
			Some("Hello!"),
			None,
		);

		// Act
		let request = engine.build_request(&message);

		// Assert
		assert_eq!(request.from.email, "sender@example.com");
		assert_eq!(
			request.personalizations[0].to[0].email,
			"recipient@example.com"
		);
		assert_eq!(request.personalizations[0].subject, "Test");
		assert_eq!(request.content[0].content_type, "text/plain");
		assert_eq!(request.content[0].value, "Hello!");
	}

	/// Test: with both bodies supplied, the transmitted content is the HTML body
	#[rstest]
	fn test_build_request_html_wins() {
		// Arrange
		let engine = SendGridEngine::new("test-key".to_string());
		let message = Message::simple(
			"a@x.com",
			&["b@x.com".to_string()],
			"s",
			Some("TEXT"),
			Some("<p>HTML</p>"),
		);

		// Act
		let request = engine.build_request(&message);

		// Assert
		assert_eq!(request.content.len(), 1);
		assert_eq!(request.content[0].content_type, "text/html");
		assert_eq!(request.content[0].value, "<p>HTML</p>");
	}

	/// Test: no body yields an empty content list
	#[rstest]
	fn test_build_request_no_body() {
		// Arrange
		let engine = SendGridEngine::new("test-key".to_string());
		let message = Message::simple("a@x.com", &["b@x.com".to_string()], "s", None, None);

		// Act
		let request = engine.build_request(&message);

		// Assert
		assert!(request.content.is_empty());
	}

	/// Test: a 2xx answer returns an explicit success carrying the status
	#[rstest]
	fn test_send_success_returns_delivery() {
		// Arrange
		let mut server = mockito::Server::new();
		let mock = server
			.mock("POST", "/")
			.match_header("authorization", "Bearer test-key")
			.with_status(202)
			.create();
		let engine = engine_for(&server);

		// Act
		let delivery = engine
			.send_simple_message(
				"a@x.com",
				&["b@x.com".to_string()],
				"s",
				Some("body"),
				None,
			)
			.unwrap();

		// Assert
		mock.assert();
		assert_eq!(delivery, Delivery { status: 202 });
	}

	/// Test: a 429 answer raises NotMade naming the status and preserving the response
	#[rstest]
	fn test_send_maps_429_to_not_made() {
		// Arrange
		let mut server = mockito::Server::new();
		let _mock = server
			.mock("POST", "/")
			.with_status(429)
			.with_body("rate limited")
			.create();
		let engine = engine_for(&server);

		// Act
		let result = engine.send_simple_message(
			"a@x.com",
			&["b@x.com".to_string()],
			"s",
			Some("body"),
			None,
		);

		// Assert
		match result {
			Err(DeliveryError::NotMade { details, response }) => {
				assert!(details.contains("429"), "details must name the status: {details}");
				assert_eq!(
					response,
					Some(EngineResponse {
						status: 429,
						body: "rate limited".to_string(),
					})
				);
			}
			other => panic!("expected NotMade, got {other:?}"),
		}
	}

	/// Test: the transmitted JSON applies the HTML body, not the text body
	#[rstest]
	fn test_send_transmits_html_content() {
		// Arrange
		let mut server = mockito::Server::new();
		let mock = server
			.mock("POST", "/")
			.match_body(mockito::Matcher::PartialJson(serde_json::json!({
				"content": [{"type": "text/html", "value": "<p>HTML</p>"}]
			})))
			.with_status(202)
			.create();
		let engine = engine_for(&server);

		// Act
		engine
			.send_simple_message(
				"a@x.com",
				&["b@x.com".to_string()],
				"s",
				Some("TEXT"),
				Some("<p>HTML</p>"),
			)
			.unwrap();

		// Assert
		mock.assert();
	}

	/// Test: an unreachable endpoint surfaces as a transport fault, not NotMade
	#[rstest]
	fn test_send_transport_error_propagates() {
		// Arrange
		let engine = SendGridEngine::with_api_url(
			"test-key".to_string(),
			// Nothing listens on port 1; the connection is refused outright.
			"http://127.0.0.1:1/v3/mail/send".to_string(),
		);

		// Act
		let result = engine.send_simple_message(
			"a@x.com",
			&["b@x.com".to_string()],
			"s",
			Some("body"),
			None,
		);

		// Assert
		assert!(matches!(result, Err(DeliveryError::Transport(_))));
	}
}
