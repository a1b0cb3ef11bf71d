//! # mailtemplate
//!
//! Template-based email rendering with pluggable delivery engines.
//!
//! The crate is split into two independent halves that a caller composes:
//!
//! - **[`MailTemplate`]**: resolves a `(layout, template name)` pair against
//!   an ordered set of template root directories, renders the template with
//!   strict-undefined semantics, optionally inlines CSS, and returns the
//!   trimmed result.
//! - **[`DeliveryEngine`]**: the capability contract every concrete mail
//!   transport satisfies. The crate ships a SendGrid-backed reference
//!   provider ([`SendGridEngine`](engines::SendGridEngine)) and an in-memory
//!   engine for tests ([`MemoryEngine`](engines::MemoryEngine)).
//!
//! ## Template layout on disk
//!
//! Each template root must contain a `<layout>/<name>/content.html.jinja`
//! subtree. Roots are searched in declaration order and the first match
//! wins. Renaming the content file or flattening the two-level nesting is a
//! breaking change for template trees in the wild.
//!
//! ## Rendering
//!
//! ```rust,no_run
//! use mailtemplate::{MailTemplate, TemplateContext};
//! use minijinja::Value;
//!
//! # fn main() -> Result<(), mailtemplate::RenderError> {
//! let mailer = MailTemplate::new(vec!["./templates".into()])?;
//!
//! let mut variables = TemplateContext::new();
//! variables.insert("username".to_string(), Value::from("alice"));
//!
//! // Renders ./templates/basic/welcome/content.html.jinja
//! let html = mailer.render("welcome", &variables)?;
//! # Ok(())
//! # }
//! ```
//!
//! Rendering is strict: a template referencing a variable absent from the
//! supplied map fails with [`RenderError::UndefinedVariable`] instead of
//! silently substituting an empty string.
//!
//! ## Delivery
//!
//! ```rust,no_run
//! use mailtemplate::engines::SendGridEngine;
//! use mailtemplate::DeliveryEngine;
//!
//! # fn main() -> Result<(), mailtemplate::DeliveryError> {
//! let engine = SendGridEngine::new("SG.api-key".to_string());
//!
//! let delivery = engine.send_simple_message(
//!     "noreply@example.com",
//!     &["user@example.com".to_string()],
//!     "Welcome!",
//!     Some("Welcome aboard."),
//!     Some("<h1>Welcome aboard.</h1>"),
//! )?;
//! assert!(delivery.status < 300);
//! # Ok(())
//! # }
//! ```
//!
//! When both a text and an HTML body are supplied, the HTML body is the one
//! transmitted: engines apply the text body first and the HTML body second,
//! and a [`Message`] holds exactly one body variant.
//!
//! ## Concurrency
//!
//! Everything is synchronous and blocking. A [`MailTemplate`] is read-only
//! after construction and safe to share across threads; engines hold only
//! immutable credentials. `send_simple_message` performs one blocking
//! outbound call with no internal retry — timeout and cancellation policy
//! beyond the provider client's own timeout belongs to the caller.

pub mod engines;
pub mod message;
pub mod template;

use std::path::PathBuf;

use thiserror::Error;

pub use engines::{Delivery, DeliveryEngine, EngineResponse};
pub use message::{Body, Message};
pub use template::{MailTemplate, RenderOptions, TemplateContext, DEFAULT_LAYOUT};

/// Errors surfaced by the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
	/// A configured template root does not exist or is not a directory.
	/// Raised at construction time, before any render is attempted.
	#[error("template root is not a directory: {}", path.display())]
	InvalidTemplateRoot { path: PathBuf },

	/// No configured root contains the resolved template path.
	#[error("template not found: {name}")]
	TemplateNotFound { name: String },

	/// The template referenced a variable absent from the supplied map.
	#[error("undefined template variable: {0}")]
	UndefinedVariable(#[source] minijinja::Error),

	/// CSS inlining failed. Inlining fails closed: the render fails rather
	/// than returning the un-inlined HTML.
	#[error("CSS inlining failed: {0}")]
	CssInline(#[from] css_inline::InlineError),

	/// Any other template engine fault (syntax errors, bad includes, ...),
	/// propagated unchanged.
	#[error("template error: {0}")]
	Template(#[source] minijinja::Error),
}

/// Errors surfaced by the delivery side.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Delivery was requested but no engine is configured.
	#[error("no delivery engine installed")]
	EngineNotInstalled,

	/// The provider answered outside its success status range. Carries the
	/// raw provider response for diagnostics.
	#[error("delivery not made: {details}")]
	NotMade {
		details: String,
		response: Option<EngineResponse>,
	},

	/// A transport-level fault from the HTTP client, re-raised unchanged
	/// after being logged.
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),
}
