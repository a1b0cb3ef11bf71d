//! Template resolution and rendering
//!
//! [`MailTemplate`] turns a `(layout, template name)` pair into finished,
//! whitespace-trimmed email body text. Templates live on disk under an
//! ordered list of root directories, each containing a
//! `<layout>/<name>/content.html.jinja` subtree; roots are searched in
//! declaration order and the first match wins.
//!
//! Rendering uses strict-undefined semantics: referencing a variable that
//! was not supplied fails the render instead of substituting a blank. When
//! the merged options request it (the default), the rendered HTML is passed
//! through the CSS inliner with network access disabled before trimming.

use std::collections::HashMap;
use std::path::PathBuf;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use crate::engines::DeliveryEngine;
use crate::{DeliveryError, RenderError};

/// Fixed content-file name under the two-level `<layout>/<name>` nesting.
///
/// Part of the on-disk compatibility surface; renaming it breaks existing
/// template trees.
pub const CONTENT_FILE_NAME: &str = "content.html.jinja";

/// Layout used when the caller does not name one.
pub const DEFAULT_LAYOUT: &str = "basic";

const DEFAULT_THEME: &str = "light";

/// Variables handed to the template engine, keyed by name.
pub type TemplateContext = HashMap<String, minijinja::Value>;

/// Caller-supplied render options, merged over the defaults per key.
///
/// Recognized keys are `theme` (default `"light"`, not validated — theme
/// name validation is an explicit non-goal) and `inline_css` (default
/// `true`). Unrecognized keys ride along in `extra` without validation.
///
/// # Examples
///
/// ```
/// use mailtemplate::RenderOptions;
///
/// let options = RenderOptions {
///     theme: Some("dark".to_string()),
///     ..RenderOptions::default()
/// };
///
/// let resolved = options.resolve();
/// assert_eq!(resolved.theme, "dark");
/// assert!(resolved.inline_css); // untouched default
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
	pub theme: Option<String>,
	pub inline_css: Option<bool>,
	pub extra: HashMap<String, serde_json::Value>,
}

impl RenderOptions {
	/// Merge these options over the defaults. Caller-supplied keys win
	/// individually; absent keys fall back to the defaults.
	pub fn resolve(self) -> ResolvedRenderOptions {
		ResolvedRenderOptions {
			theme: self.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
			inline_css: self.inline_css.unwrap_or(true),
			extra: self.extra,
		}
	}
}

/// Fully merged render options.
#[derive(Debug, Clone)]
pub struct ResolvedRenderOptions {
	pub theme: String,
	pub inline_css: bool,
	pub extra: HashMap<String, serde_json::Value>,
}

/// Template-driven email renderer.
///
/// Owns an ordered set of template roots and a strict-undefined template
/// environment built over them. Read-only after construction, so sharing
/// one instance across threads for concurrent renders is safe.
///
/// An optional [`DeliveryEngine`] can be installed at construction; the
/// renderer stores it for the caller's delivery step but never invokes it
/// during rendering.
pub struct MailTemplate {
	roots: Vec<PathBuf>,
	env: Environment<'static>,
	engine: Option<Box<dyn DeliveryEngine>>,
}

impl MailTemplate {
	/// Create a renderer over the given template root directories.
	///
	/// # Errors
	///
	/// Returns [`RenderError::InvalidTemplateRoot`] if any root does not
	/// exist or is not a directory. This is a configuration precondition:
	/// it fails here, before any render is attempted.
	pub fn new(template_dirs: Vec<PathBuf>) -> Result<Self, RenderError> {
		Self::build(template_dirs, None)
	}

	/// Create a renderer with a delivery engine installed.
	///
	/// The engine is selected by the caller and injected here; it is only
	/// reachable through [`MailTemplate::delivery_engine`], never invoked
	/// by [`MailTemplate::render`].
	pub fn with_engine(
		template_dirs: Vec<PathBuf>,
		engine: Box<dyn DeliveryEngine>,
	) -> Result<Self, RenderError> {
		Self::build(template_dirs, Some(engine))
	}

	fn build(
		template_dirs: Vec<PathBuf>,
		engine: Option<Box<dyn DeliveryEngine>>,
	) -> Result<Self, RenderError> {
		for path in &template_dirs {
			if !path.is_dir() {
				return Err(RenderError::InvalidTemplateRoot { path: path.clone() });
			}
		}

		let mut env = Environment::new();
		env.set_undefined_behavior(UndefinedBehavior::Strict);
		env.set_loader(multi_root_loader(template_dirs.clone()));

		tracing::debug!(roots = template_dirs.len(), "template environment ready");

		Ok(Self {
			roots: template_dirs,
			env,
			engine,
		})
	}

	/// Render a template under the default `"basic"` layout with default
	/// options.
	pub fn render(
		&self,
		template_name: &str,
		variables: &TemplateContext,
	) -> Result<String, RenderError> {
		self.render_with(
			template_name,
			DEFAULT_LAYOUT,
			RenderOptions::default(),
			variables,
		)
	}

	/// Render a template, choosing the layout and options.
	///
	/// The template source is resolved as
	/// `<layout>/<template_name>/content.html.jinja` against the roots in
	/// declaration order; the first root containing the file wins. After
	/// rendering, CSS is inlined unless the merged options disable it, and
	/// the result is trimmed of surrounding whitespace.
	///
	/// # Errors
	///
	/// - [`RenderError::TemplateNotFound`] if no root contains the path.
	/// - [`RenderError::UndefinedVariable`] if the template references a
	///   variable absent from `variables`.
	/// - [`RenderError::CssInline`] if the inlining step fails (inlining
	///   fails closed).
	/// - [`RenderError::Template`] for any other engine fault.
	pub fn render_with(
		&self,
		template_name: &str,
		template_layout: &str,
		options: RenderOptions,
		variables: &TemplateContext,
	) -> Result<String, RenderError> {
		let template_path = format!("{template_layout}/{template_name}/{CONTENT_FILE_NAME}");
		tracing::debug!(template = %template_path, "rendering template");

		let template = self
			.env
			.get_template(&template_path)
			.map_err(|e| classify(&template_path, e))?;
		let content = template
			.render(variables)
			.map_err(|e| classify(&template_path, e))?;

		let resolved = options.resolve();
		let content = if resolved.inline_css {
			inline_css(&content)?
		} else {
			content
		};

		Ok(content.trim().to_string())
	}

	/// Get the installed delivery engine.
	///
	/// # Errors
	///
	/// Returns [`DeliveryError::EngineNotInstalled`] when the renderer was
	/// constructed without one.
	pub fn delivery_engine(&self) -> Result<&dyn DeliveryEngine, DeliveryError> {
		self.engine
			.as_deref()
			.ok_or(DeliveryError::EngineNotInstalled)
	}

	/// Get the template roots, in search order.
	pub fn template_dirs(&self) -> &[PathBuf] {
		&self.roots
	}
}

/// First-match-wins loader over an ordered list of root directories.
fn multi_root_loader(
	roots: Vec<PathBuf>,
) -> impl Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync + 'static {
	move |name| {
		// Relative, descending paths only; anything else is not found.
		if name.starts_with('/') || name.split('/').any(|segment| segment == "..") {
			return Ok(None);
		}

		for root in &roots {
			let path = root.join(name);
			if path.is_file() {
				return std::fs::read_to_string(&path)
					.map(Some)
					.map_err(|e| {
						minijinja::Error::new(
							ErrorKind::InvalidOperation,
							format!("failed to read template {}", path.display()),
						)
						.with_source(e)
					});
			}
		}

		Ok(None)
	}
}

/// Map engine faults onto the crate's render error kinds.
fn classify(template_path: &str, err: minijinja::Error) -> RenderError {
	match err.kind() {
		ErrorKind::TemplateNotFound => RenderError::TemplateNotFound {
			name: template_path.to_string(),
		},
		ErrorKind::UndefinedError => RenderError::UndefinedVariable(err),
		_ => RenderError::Template(err),
	}
}

/// Inline `<style>`-block CSS into per-element `style` attributes.
///
/// Remote stylesheet loading is disabled: the inliner never performs
/// network I/O, and failures propagate as render failures.
fn inline_css(html: &str) -> Result<String, RenderError> {
	let inliner = css_inline::CSSInliner::options()
		.load_remote_stylesheets(false)
		.build();
	Ok(inliner.inline(html)?)
}

impl std::fmt::Debug for MailTemplate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MailTemplate")
			.field("roots", &self.roots)
			.field("engine_installed", &self.engine.is_some())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	/// Test: defaults apply when no options are supplied
	#[rstest]
	fn test_options_resolve_defaults() {
		// Arrange & Act
		let resolved = RenderOptions::default().resolve();

		// Assert
		assert_eq!(resolved.theme, "light");
		assert!(resolved.inline_css);
		assert!(resolved.extra.is_empty());
	}

	/// Test: caller-supplied keys win individually over defaults
	#[rstest]
	fn test_options_resolve_partial_override() {
		// Arrange
		let options = RenderOptions {
			theme: Some("dark".to_string()),
			..RenderOptions::default()
		};

		// Act
		let resolved = options.resolve();

		// Assert
		assert_eq!(resolved.theme, "dark");
		assert!(resolved.inline_css, "inline_css default must survive a theme override");
	}

	/// Test: unrecognized keys pass through the merge untouched
	#[rstest]
	fn test_options_resolve_extra_passthrough() {
		// Arrange
		let mut extra = HashMap::new();
		extra.insert("footer".to_string(), serde_json::json!("compact"));
		let options = RenderOptions {
			inline_css: Some(false),
			extra,
			..RenderOptions::default()
		};

		// Act
		let resolved = options.resolve();

		// Assert
		assert!(!resolved.inline_css);
		assert_eq!(resolved.extra["footer"], serde_json::json!("compact"));
	}

	/// Test: missing template root fails construction
	#[rstest]
	fn test_new_rejects_missing_root() {
		// Arrange
		let missing = PathBuf::from("/definitely/not/a/real/template/root");

		// Act
		let result = MailTemplate::new(vec![missing.clone()]);

		// Assert
		match result {
			Err(RenderError::InvalidTemplateRoot { path }) => assert_eq!(path, missing),
			other => panic!("expected InvalidTemplateRoot, got {other:?}"),
		}
	}

	/// Test: a root that is a file, not a directory, fails construction
	#[rstest]
	fn test_new_rejects_file_root() {
		// Arrange
		let file = tempfile::NamedTempFile::new().unwrap();

		// Act
		let result = MailTemplate::new(vec![file.path().to_path_buf()]);

		// Assert
		assert!(matches!(
			result,
			Err(RenderError::InvalidTemplateRoot { .. })
		));
	}

	/// Test: the loader refuses absolute and escaping template names
	#[rstest]
	#[case::absolute("/etc/passwd")]
	#[case::traversal("basic/../../../etc/passwd")]
	fn test_loader_rejects_unsafe_names(#[case] name: &str) {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		let loader = multi_root_loader(vec![dir.path().to_path_buf()]);

		// Act
		let loaded = loader(name).unwrap();

		// Assert
		assert!(loaded.is_none());
	}
}
