//! Error and violation types.
//!
//! Only [`SubstitutionError`] and [`LoadError`] abort anything, and only for one
//! class. Everything that goes wrong for a single feature is a [`Violation`]
//! accumulated on the owning specification.

use std::fmt;
use std::sync::Arc;

use crate::ident::{ClassId, FeatureIdentifier};
use crate::interaction::Veto;
use crate::introspect::InvokeError;
use crate::spec::ObjectSpecification;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid metamodel configuration: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid value for {key}: {message}")]
	Invalid { key: &'static str, message: String },
}

/// A class could not be normalized to its logical domain class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
	#[error("unknown class {0}")]
	UnknownClass(Arc<str>),
	#[error("enhanced class {class} has no superclass to substitute")]
	MissingSuperclass { class: Arc<str> },
	#[error("substitution cycle: {}", .chain.join(" -> "))]
	Cycle { chain: Vec<Arc<str>> },
}

/// Error returned by a facet factory for one feature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
	#[error("supporting method {method}: {message}")]
	SupportingMethod { method: Arc<str>, message: String },
	#[error("annotation {annotation}: {message}")]
	Annotation {
		annotation: &'static str,
		message: String,
	},
	#[error("{0}")]
	Other(String),
}

impl FactoryError {
	pub fn supporting_method(method: &Arc<str>, message: impl Into<String>) -> Self {
		Self::SupportingMethod {
			method: method.clone(),
			message: message.into(),
		}
	}
}

/// Where a violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationSource {
	/// Structural enumeration of the class.
	Introspection,
	/// A facet factory failed while contributing.
	Factory(&'static str),
	/// Two mutually exclusive facets ended up on one feature.
	Exclusivity,
	/// A supporting method matched no member.
	Orphan,
	/// A referenced type could not be resolved.
	Reference,
}

impl fmt::Display for ViolationSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Introspection => f.write_str("introspection"),
			Self::Factory(name) => write!(f, "factory {name}"),
			Self::Exclusivity => f.write_str("exclusivity"),
			Self::Orphan => f.write_str("orphan"),
			Self::Reference => f.write_str("reference"),
		}
	}
}

/// A metamodel validation violation attached to one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
	pub feature: FeatureIdentifier,
	pub source: ViolationSource,
	pub message: String,
}

impl Violation {
	pub fn new(
		feature: FeatureIdentifier,
		source: ViolationSource,
		message: impl Into<String>,
	) -> Self {
		Self {
			feature,
			source,
			message: message.into(),
		}
	}
}

impl fmt::Display for Violation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} [{}]: {}", self.feature, self.source, self.message)
	}
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
	#[error(transparent)]
	Substitution(#[from] SubstitutionError),
	#[error("unknown class {name}{}", did_you_mean(.suggestion))]
	UnknownClass {
		name: Arc<str>,
		suggestion: Option<Arc<str>>,
	},
	/// The calling thread is itself building this class.
	#[error("specification for {0} is under construction by the calling thread")]
	UnderConstruction(ClassId),
	/// Built with violations; the specification is still available for diagnostics.
	#[error(
		"specification for {} has {} violation(s)",
		.spec.class_id(),
		.spec.violations().len()
	)]
	Invalid { spec: Arc<ObjectSpecification> },
	#[error("type {0} does not refer to a domain class")]
	NotAClass(String),
}

impl LoadError {
	/// The partially valid specification carried by [`LoadError::Invalid`].
	pub fn specification(&self) -> Option<&Arc<ObjectSpecification>> {
		match self {
			Self::Invalid { spec } => Some(spec),
			_ => None,
		}
	}
}

/// Refusal or failure of a gated domain interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
	#[error("{class} has no member {name}{}", did_you_mean(.suggestion))]
	NoSuchMember {
		class: ClassId,
		name: String,
		suggestion: Option<Arc<str>>,
	},
	#[error("{0} is not an action")]
	NotAnAction(FeatureIdentifier),
	#[error("{0} is not a property")]
	NotAProperty(FeatureIdentifier),
	#[error("{0} has no setter")]
	ReadOnly(FeatureIdentifier),
	/// Hidden or disabled.
	#[error("{0}")]
	Vetoed(Veto),
	/// At least one validity objection; all of them are carried.
	#[error("{} objection(s): {}", .0.len(), reasons(.0))]
	Invalid(Vec<Veto>),
	#[error("{feature}: {source}")]
	Failed {
		feature: FeatureIdentifier,
		#[source]
		source: InvokeError,
	},
}

fn did_you_mean(suggestion: &Option<Arc<str>>) -> String {
	suggestion
		.as_ref()
		.map(|s| format!(" (did you mean {s}?)"))
		.unwrap_or_default()
}

fn reasons(vetoes: &[Veto]) -> String {
	vetoes.iter().map(|v| v.reason.as_str()).collect::<Vec<_>>().join("; ")
}
