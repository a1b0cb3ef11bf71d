//! In-memory delivery engine for testing
//!
//! Records messages instead of sending them, so tests can assert on what a
//! transport would have transmitted.
//!
//! # Examples
//!
//! ```
//! use mailtemplate::DeliveryEngine;
//! use mailtemplate::engines::MemoryEngine;
//!
//! let engine = MemoryEngine::new();
//!
//! engine
//!     .send_simple_message(
//!         "sender@example.com",
//!         &["recipient@example.com".to_string()],
//!         "Test",
//!         Some("Hello!"),
//!         None,
//!     )
//!     .unwrap();
//!
//! let sent = engine.sent_messages();
//! assert_eq!(sent.len(), 1);
//! assert_eq!(sent[0].subject(), "Test");
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::message::Message;
use crate::{Delivery, DeliveryEngine, DeliveryError};

/// Recording [`DeliveryEngine`]. Always succeeds.
#[derive(Clone, Default)]
pub struct MemoryEngine {
	sent: Arc<RwLock<Vec<Message>>>,
}

impl MemoryEngine {
	/// Create a new memory engine with an empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Get a snapshot of everything sent so far, in send order.
	pub fn sent_messages(&self) -> Vec<Message> {
		self.sent.read().clone()
	}

	/// Clear the record.
	pub fn clear(&self) {
		self.sent.write().clear();
	}
}

impl DeliveryEngine for MemoryEngine {
	fn send_simple_message(
		&self,
		from_address: &str,
		to_addresses: &[String],
		subject: &str,
		text_body: Option<&str>,
		html_body: Option<&str>,
	) -> Result<Delivery, DeliveryError> {
		let message = Message::simple(from_address, to_addresses, subject, text_body, html_body);
		self.sent.write().push(message);
		Ok(Delivery { status: 200 })
	}
}
