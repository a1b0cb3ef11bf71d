//! Delivery engines
//!
//! A delivery engine is the pluggable transport that hands a composed
//! message to an outbound mail-sending channel. Callers program against the
//! [`DeliveryEngine`] trait only; which concrete engine runs is decided at
//! construction time by whoever wires the application together.

pub mod memory;
pub mod sendgrid;

pub use memory::MemoryEngine;
pub use sendgrid::SendGridEngine;

use crate::DeliveryError;

/// Explicit success indicator for a completed delivery.
///
/// Returned instead of a bare `Ok(())` so callers can log what the provider
/// actually answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
	/// Status the provider reported for the accepted message
	/// (e.g. 202 for the SendGrid API).
	pub status: u16,
}

/// Raw provider response preserved on [`DeliveryError::NotMade`] for
/// diagnostics. Opaque to the core: nothing in this crate interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
	pub status: u16,
	pub body: String,
}

/// Capability contract every concrete mail transport satisfies.
///
/// One blocking outbound call per invocation, no internal retry or
/// queueing; failures propagate synchronously to the caller.
pub trait DeliveryEngine: Send + Sync {
	/// Send a single message.
	///
	/// `to_addresses` is a non-empty ordered list; duplicate recipients and
	/// address-syntax validity are the provider's concern. At least one of
	/// `text_body`/`html_body` should be supplied — an engine receiving
	/// neither sends an empty-content message under its own rules.
	///
	/// When both bodies are supplied, the HTML body is the one transmitted:
	/// implementations build the outgoing message by applying the text body
	/// first and the HTML body second (see [`crate::Message::simple`]).
	/// Both bodies are trimmed of surrounding whitespace before
	/// transmission.
	///
	/// # Errors
	///
	/// - [`DeliveryError::NotMade`] when the provider answers outside its
	///   success status range; carries a detail string naming the status
	///   and the raw response.
	/// - [`DeliveryError::Transport`] for client-level faults, re-raised
	///   unchanged after being logged.
	fn send_simple_message(
		&self,
		from_address: &str,
		to_addresses: &[String],
		subject: &str,
		text_body: Option<&str>,
		html_body: Option<&str>,
	) -> Result<Delivery, DeliveryError>;
}
