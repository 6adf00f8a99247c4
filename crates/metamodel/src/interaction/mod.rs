//! Request-time evaluation of facets.
//!
//! # Role
//!
//! Evaluators answer three questions about a member for a caller and a live
//! target: may it be seen ([`is_visible`]), may it be used ([`is_usable`]), and
//! is a proposed value or argument list acceptable ([`validate_property`],
//! [`validate_arguments`]). Visibility and usability short-circuit on the
//! first veto; validity collects every objection.
//!
//! Facets that delegate to supporting methods call [`DomainObject::invoke`].
//! A failing call is a veto, never an error: evaluation fails closed.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`CallerContext`] | Who is asking (user and roles). |
//! | [`InteractionContext`] | Caller, target instance and rendering location. |
//! | [`Consent`] | Allowed, or vetoed with a [`Veto`]. |

mod choices;
mod invoke;
mod usability;
mod validity;
mod visibility;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub use choices::{auto_complete, choices, default_value};
pub use invoke::{invoke_action, modify_property, read_property, title};
pub use usability::is_usable;
pub use validity::{validate_arguments, validate_property};
pub use visibility::{is_class_visible, is_visible};

use crate::ident::FeatureIdentifier;
use crate::introspect::{DomainObject, Value, Where};

/// Identity of the caller. Treated as plain data; only role facets inspect it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
	user: Arc<str>,
	roles: BTreeSet<Arc<str>>,
}

impl CallerContext {
	pub fn new(user: impl Into<Arc<str>>) -> Self {
		Self {
			user: user.into(),
			roles: BTreeSet::new(),
		}
	}

	pub fn with_role(mut self, role: impl Into<Arc<str>>) -> Self {
		self.roles.insert(role.into());
		self
	}

	pub fn user(&self) -> &str {
		&self.user
	}

	pub fn roles(&self) -> impl Iterator<Item = &str> + '_ {
		self.roles.iter().map(|r| &**r)
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.contains(role)
	}
}

/// Everything an evaluator needs about one request.
#[derive(Clone, Copy)]
pub struct InteractionContext<'a> {
	pub caller: &'a CallerContext,
	pub target: &'a dyn DomainObject,
	/// Where the member is about to be rendered.
	pub location: Where,
}

impl<'a> InteractionContext<'a> {
	pub fn new(caller: &'a CallerContext, target: &'a dyn DomainObject) -> Self {
		Self {
			caller,
			target,
			location: Where::Anywhere,
		}
	}

	pub fn at(mut self, location: Where) -> Self {
		self.location = location;
		self
	}
}

impl fmt::Debug for InteractionContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InteractionContext")
			.field("caller", &self.caller)
			.field("target", &self.target.class_name())
			.field("location", &self.location)
			.finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VetoKind {
	Hidden,
	Disabled,
	Invalid,
}

impl fmt::Display for VetoKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Hidden => f.write_str("hidden"),
			Self::Disabled => f.write_str("disabled"),
			Self::Invalid => f.write_str("invalid"),
		}
	}
}

/// A reason to refuse an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
	pub kind: VetoKind,
	pub feature: FeatureIdentifier,
	pub reason: String,
}

impl Veto {
	pub fn new(kind: VetoKind, feature: &FeatureIdentifier, reason: impl Into<String>) -> Self {
		Self {
			kind,
			feature: feature.clone(),
			reason: reason.into(),
		}
	}
}

impl fmt::Display for Veto {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}: {}", self.feature, self.kind, self.reason)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consent {
	Allowed,
	Vetoed(Veto),
}

impl Consent {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allowed)
	}

	pub fn is_vetoed(&self) -> bool {
		!self.is_allowed()
	}

	pub fn veto(&self) -> Option<&Veto> {
		match self {
			Self::Allowed => None,
			Self::Vetoed(veto) => Some(veto),
		}
	}

	pub fn reason(&self) -> Option<&str> {
		self.veto().map(|v| v.reason.as_str())
	}

	pub fn into_result(self) -> Result<(), Veto> {
		match self {
			Self::Allowed => Ok(()),
			Self::Vetoed(veto) => Err(veto),
		}
	}
}

impl From<Option<Veto>> for Consent {
	fn from(veto: Option<Veto>) -> Self {
		veto.map_or(Self::Allowed, Self::Vetoed)
	}
}

/// Invokes a supporting method; a failure becomes a veto of `kind`.
fn call_supporting(
	cx: &InteractionContext<'_>,
	kind: VetoKind,
	feature: &FeatureIdentifier,
	method: &str,
	args: &[Value],
) -> Result<Value, Veto> {
	cx.target.invoke(method, args).map_err(|err| {
		tracing::warn!(
			domain = "interaction",
			feature = %feature,
			method,
			error = %err,
			"supporting method failed"
		);
		Veto::new(kind, feature, err.to_string())
	})
}

/// Interprets a `hide*`/`hidden` result: `true` hides.
fn hides(
	cx: &InteractionContext<'_>,
	feature: &FeatureIdentifier,
	method: &str,
) -> Option<Veto> {
	match call_supporting(cx, VetoKind::Hidden, feature, method, &[]) {
		Ok(Value::Bool(false)) => None,
		Ok(Value::Bool(true)) => Some(Veto::new(
			VetoKind::Hidden,
			feature,
			format!("hidden by {method}"),
		)),
		Ok(other) => Some(unexpected(VetoKind::Hidden, feature, method, "bool", &other)),
		Err(veto) => Some(veto),
	}
}

/// Interprets a reason-returning method: null or empty text means no objection.
fn objects(
	cx: &InteractionContext<'_>,
	kind: VetoKind,
	feature: &FeatureIdentifier,
	method: &str,
	args: &[Value],
) -> Option<Veto> {
	match call_supporting(cx, kind, feature, method, args) {
		Ok(Value::Null) => None,
		Ok(Value::Text(reason)) if reason.is_empty() => None,
		Ok(Value::Text(reason)) => Some(Veto::new(kind, feature, reason)),
		Ok(other) => Some(unexpected(kind, feature, method, "text", &other)),
		Err(veto) => Some(veto),
	}
}

fn unexpected(
	kind: VetoKind,
	feature: &FeatureIdentifier,
	method: &str,
	expected: &str,
	got: &Value,
) -> Veto {
	tracing::warn!(
		domain = "interaction",
		feature = %feature,
		method,
		expected,
		got = got.type_name(),
		"supporting method returned unexpected type"
	);
	Veto::new(
		kind,
		feature,
		format!("{method} returned {} instead of {expected}", got.type_name()),
	)
}
