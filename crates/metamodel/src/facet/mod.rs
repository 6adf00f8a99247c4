//! Facets: immutable, kind-tagged behavioural contributions.
//!
//! # Mental Model
//!
//! A [`Facet`] is one closed sum type; its discriminant is the [`FacetKind`].
//! Adding behaviour means adding a kind, never adding open-ended trait objects.
//! A [`FacetHolder`] keeps at most one live facet per kind, chosen by
//! [`Precedence`].
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Facet`] | Kind-specific payload. |
//! | [`FacetKind`] | Closed enumeration of kinds; keys the holder. |
//! | [`FacetHolder`] | Per-feature kind -> facet map. |
//! | [`Precedence`] | Total order between competing factories. |

mod holder;
mod precedence;

use std::fmt;
use std::sync::Arc;

pub use holder::{FacetHolder, HeldFacet, PutOutcome};
pub use precedence::{Contribution, FacetCollision, Precedence, Resolution, resolve};
use regex::Regex;

use crate::introspect::{Semantics, TypeRef, ValueType, When, Where};

/// Whether a value must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optionality {
	Mandatory,
	Optional,
}

#[derive(Debug, Clone)]
pub enum Facet {
	// Visibility.
	Hidden {
		location: Where,
	},
	HiddenForRoles {
		roles: Arc<[Arc<str>]>,
	},
	HideMethod {
		method: Arc<str>,
	},
	/// Class-level `hidden()` supporting method.
	HiddenObject {
		method: Arc<str>,
	},

	// Usability.
	Disabled {
		when: When,
		reason: Option<Arc<str>>,
	},
	DisableMethod {
		method: Arc<str>,
	},
	/// Class-level: properties and collections may not be edited.
	Immutable {
		reason: Option<Arc<str>>,
	},
	/// Class-level `disabled()` supporting method.
	DisabledObject {
		method: Arc<str>,
	},

	// Validity.
	Mandatory(Optionality),
	MaxLength(u32),
	RegEx {
		pattern: Regex,
	},
	ValidateMethod {
		method: Arc<str>,
	},
	ValueEncoding(ValueType),

	// Choice provision.
	ChoicesMethod {
		method: Arc<str>,
	},
	AutoCompleteMethod {
		method: Arc<str>,
		min_length: u16,
	},
	DefaultMethod {
		method: Arc<str>,
	},

	// Presentation and ordering.
	Named(Arc<str>),
	DescribedAs(Arc<str>),
	Plural(Arc<str>),
	MemberOrder {
		sequence: Arc<str>,
	},
	TypicalLength(u32),
	MultiLine {
		lines: u16,
	},
	Title {
		method: Arc<str>,
	},

	// Behaviour.
	ActionSemantics(Semantics),
	PropertyAccessor {
		method: Arc<str>,
	},
	PropertySetter {
		method: Arc<str>,
	},
	CollectionAccessor {
		method: Arc<str>,
	},
	ActionInvocation {
		method: Arc<str>,
		returns: TypeRef,
	},
}

/// Discriminant of [`Facet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKind {
	Hidden,
	HiddenForRoles,
	HideMethod,
	HiddenObject,
	Disabled,
	DisableMethod,
	Immutable,
	DisabledObject,
	Mandatory,
	MaxLength,
	RegEx,
	ValidateMethod,
	ValueEncoding,
	ChoicesMethod,
	AutoCompleteMethod,
	DefaultMethod,
	Named,
	DescribedAs,
	Plural,
	MemberOrder,
	TypicalLength,
	MultiLine,
	Title,
	ActionSemantics,
	PropertyAccessor,
	PropertySetter,
	CollectionAccessor,
	ActionInvocation,
}

/// Pairs of kinds that must never be live on the same holder.
const EXCLUSIVE: &[(FacetKind, FacetKind)] =
	&[(FacetKind::ChoicesMethod, FacetKind::AutoCompleteMethod)];

impl FacetKind {
	pub fn name(self) -> &'static str {
		match self {
			Self::Hidden => "Hidden",
			Self::HiddenForRoles => "HiddenForRoles",
			Self::HideMethod => "HideMethod",
			Self::HiddenObject => "HiddenObject",
			Self::Disabled => "Disabled",
			Self::DisableMethod => "DisableMethod",
			Self::Immutable => "Immutable",
			Self::DisabledObject => "DisabledObject",
			Self::Mandatory => "Mandatory",
			Self::MaxLength => "MaxLength",
			Self::RegEx => "RegEx",
			Self::ValidateMethod => "ValidateMethod",
			Self::ValueEncoding => "ValueEncoding",
			Self::ChoicesMethod => "ChoicesMethod",
			Self::AutoCompleteMethod => "AutoCompleteMethod",
			Self::DefaultMethod => "DefaultMethod",
			Self::Named => "Named",
			Self::DescribedAs => "DescribedAs",
			Self::Plural => "Plural",
			Self::MemberOrder => "MemberOrder",
			Self::TypicalLength => "TypicalLength",
			Self::MultiLine => "MultiLine",
			Self::Title => "Title",
			Self::ActionSemantics => "ActionSemantics",
			Self::PropertyAccessor => "PropertyAccessor",
			Self::PropertySetter => "PropertySetter",
			Self::CollectionAccessor => "CollectionAccessor",
			Self::ActionInvocation => "ActionInvocation",
		}
	}

	/// Kinds that may not coexist with `self` on one holder.
	pub fn exclusive_with(self) -> impl Iterator<Item = FacetKind> {
		EXCLUSIVE.iter().filter_map(move |&(a, b)| {
			if a == self {
				Some(b)
			} else if b == self {
				Some(a)
			} else {
				None
			}
		})
	}

	pub(crate) fn exclusive_pairs() -> &'static [(FacetKind, FacetKind)] {
		EXCLUSIVE
	}
}

impl fmt::Display for FacetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl Facet {
	pub fn kind(&self) -> FacetKind {
		match self {
			Self::Hidden { .. } => FacetKind::Hidden,
			Self::HiddenForRoles { .. } => FacetKind::HiddenForRoles,
			Self::HideMethod { .. } => FacetKind::HideMethod,
			Self::HiddenObject { .. } => FacetKind::HiddenObject,
			Self::Disabled { .. } => FacetKind::Disabled,
			Self::DisableMethod { .. } => FacetKind::DisableMethod,
			Self::Immutable { .. } => FacetKind::Immutable,
			Self::DisabledObject { .. } => FacetKind::DisabledObject,
			Self::Mandatory(_) => FacetKind::Mandatory,
			Self::MaxLength(_) => FacetKind::MaxLength,
			Self::RegEx { .. } => FacetKind::RegEx,
			Self::ValidateMethod { .. } => FacetKind::ValidateMethod,
			Self::ValueEncoding(_) => FacetKind::ValueEncoding,
			Self::ChoicesMethod { .. } => FacetKind::ChoicesMethod,
			Self::AutoCompleteMethod { .. } => FacetKind::AutoCompleteMethod,
			Self::DefaultMethod { .. } => FacetKind::DefaultMethod,
			Self::Named(_) => FacetKind::Named,
			Self::DescribedAs(_) => FacetKind::DescribedAs,
			Self::Plural(_) => FacetKind::Plural,
			Self::MemberOrder { .. } => FacetKind::MemberOrder,
			Self::TypicalLength(_) => FacetKind::TypicalLength,
			Self::MultiLine { .. } => FacetKind::MultiLine,
			Self::Title { .. } => FacetKind::Title,
			Self::ActionSemantics(_) => FacetKind::ActionSemantics,
			Self::PropertyAccessor { .. } => FacetKind::PropertyAccessor,
			Self::PropertySetter { .. } => FacetKind::PropertySetter,
			Self::CollectionAccessor { .. } => FacetKind::CollectionAccessor,
			Self::ActionInvocation { .. } => FacetKind::ActionInvocation,
		}
	}

	/// The supporting or accessor method this facet delegates to, if any.
	pub fn method(&self) -> Option<&Arc<str>> {
		match self {
			Self::HideMethod { method }
			| Self::HiddenObject { method }
			| Self::DisableMethod { method }
			| Self::DisabledObject { method }
			| Self::ValidateMethod { method }
			| Self::ChoicesMethod { method }
			| Self::AutoCompleteMethod { method, .. }
			| Self::DefaultMethod { method }
			| Self::Title { method }
			| Self::PropertyAccessor { method }
			| Self::PropertySetter { method }
			| Self::CollectionAccessor { method }
			| Self::ActionInvocation { method, .. } => Some(method),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_matches_variant() {
		assert_eq!(Facet::MaxLength(6).kind(), FacetKind::MaxLength);
		assert_eq!(
			Facet::Hidden {
				location: Where::Anywhere
			}
			.kind(),
			FacetKind::Hidden
		);
	}

	#[test]
	fn exclusivity_is_symmetric() {
		let a: Vec<_> = FacetKind::ChoicesMethod.exclusive_with().collect();
		let b: Vec<_> = FacetKind::AutoCompleteMethod.exclusive_with().collect();
		assert_eq!(a, [FacetKind::AutoCompleteMethod]);
		assert_eq!(b, [FacetKind::ChoicesMethod]);
		assert_eq!(FacetKind::MaxLength.exclusive_with().count(), 0);
	}

	#[test]
	fn delegating_facets_expose_method() {
		let facet = Facet::HideMethod {
			method: "hideTotal".into(),
		};
		assert_eq!(facet.method().map(|m| &**m), Some("hideTotal"));
		assert!(Facet::MaxLength(1).method().is_none());
	}
}
