//! Feature identity.
//!
//! # Role
//!
//! Every introspectable feature (a class, one of its properties, collections or
//! actions, or an action parameter) has a [`FeatureIdentifier`]. Identifiers are
//! immutable and cheap to clone, and they key every map in the engine.

use std::fmt;
use std::sync::Arc;

/// Logical (normalized) class name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(Arc<str>);

impl ClassId {
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub(crate) fn as_arc(&self) -> &Arc<str> {
		&self.0
	}
}

impl fmt::Display for ClassId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ClassId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

/// The closed set of feature kinds a facet factory can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
	Class,
	Property,
	Collection,
	Action,
	ActionParameter,
}

impl FeatureKind {
	pub const ALL: [FeatureKind; 5] = [
		Self::Class,
		Self::Property,
		Self::Collection,
		Self::Action,
		Self::ActionParameter,
	];

	/// Returns the bitflag for this kind.
	pub const fn as_set(self) -> FeatureKinds {
		match self {
			Self::Class => FeatureKinds::CLASS,
			Self::Property => FeatureKinds::PROPERTY,
			Self::Collection => FeatureKinds::COLLECTION,
			Self::Action => FeatureKinds::ACTION,
			Self::ActionParameter => FeatureKinds::ACTION_PARAMETER,
		}
	}

	pub(crate) const fn index(self) -> usize {
		self as usize
	}

	/// Returns true for properties, collections and actions.
	pub const fn is_member(self) -> bool {
		matches!(self, Self::Property | Self::Collection | Self::Action)
	}
}

impl fmt::Display for FeatureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class => write!(f, "class"),
			Self::Property => write!(f, "property"),
			Self::Collection => write!(f, "collection"),
			Self::Action => write!(f, "action"),
			Self::ActionParameter => write!(f, "parameter"),
		}
	}
}

bitflags::bitflags! {
	/// A set of feature kinds.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct FeatureKinds: u8 {
		const CLASS = 1 << 0;
		const PROPERTY = 1 << 1;
		const COLLECTION = 1 << 2;
		const ACTION = 1 << 3;
		const ACTION_PARAMETER = 1 << 4;

		/// Properties, collections and actions.
		const MEMBERS = Self::PROPERTY.bits() | Self::COLLECTION.bits() | Self::ACTION.bits();
		/// Properties and action parameters, the features that accept a proposed value.
		const VALUE_HOLDERS = Self::PROPERTY.bits() | Self::ACTION_PARAMETER.bits();
	}
}

impl FeatureKinds {
	pub fn applies_to(self, kind: FeatureKind) -> bool {
		self.contains(kind.as_set())
	}
}

impl FromIterator<FeatureKind> for FeatureKinds {
	fn from_iter<I: IntoIterator<Item = FeatureKind>>(iter: I) -> Self {
		iter.into_iter()
			.fold(FeatureKinds::empty(), |set, kind| set | kind.as_set())
	}
}

/// Stable identity of one feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIdentifier {
	class: ClassId,
	kind: FeatureKind,
	member: Option<Arc<str>>,
	param: Option<u16>,
}

impl FeatureIdentifier {
	pub fn class(class: ClassId) -> Self {
		Self {
			class,
			kind: FeatureKind::Class,
			member: None,
			param: None,
		}
	}

	/// Identifier for a property, collection or action.
	///
	/// # Panics
	///
	/// Panics if `kind` is not a member kind.
	pub fn member(class: ClassId, kind: FeatureKind, name: impl Into<Arc<str>>) -> Self {
		assert!(kind.is_member(), "{kind} is not a member kind");
		Self {
			class,
			kind,
			member: Some(name.into()),
			param: None,
		}
	}

	pub fn parameter(class: ClassId, action: impl Into<Arc<str>>, index: u16) -> Self {
		Self {
			class,
			kind: FeatureKind::ActionParameter,
			member: Some(action.into()),
			param: Some(index),
		}
	}

	pub fn class_id(&self) -> &ClassId {
		&self.class
	}

	pub fn kind(&self) -> FeatureKind {
		self.kind
	}

	/// Member name; for parameters this is the owning action.
	pub fn member_name(&self) -> Option<&str> {
		self.member.as_deref()
	}

	pub fn param_index(&self) -> Option<u16> {
		self.param
	}
}

impl fmt::Display for FeatureIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.class)?;
		if let Some(member) = &self.member {
			write!(f, "#{member}")?;
		}
		if let Some(param) = self.param {
			write!(f, "({param})")?;
		}
		Ok(())
	}
}
