//! Declarative metadata attached to classes, methods and parameters.

use std::fmt;

use crate::introspect::Lifecycle;

/// Rendering location a hide rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Where {
	/// Everywhere. As a query location, "no particular place".
	#[default]
	Anywhere,
	ObjectForms,
	/// Both parented and standalone tables.
	AllTables,
	ParentedTables,
	StandaloneTables,
	Nowhere,
}

impl Where {
	/// Returns true if a rule declared for `self` applies when rendering at `location`.
	pub fn includes(self, location: Where) -> bool {
		match self {
			Self::Anywhere => true,
			Self::Nowhere => false,
			Self::AllTables => matches!(
				location,
				Self::AllTables | Self::ParentedTables | Self::StandaloneTables
			),
			other => other == location,
		}
	}
}

impl fmt::Display for Where {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Anywhere => "anywhere",
			Self::ObjectForms => "object forms",
			Self::AllTables => "all tables",
			Self::ParentedTables => "parented tables",
			Self::StandaloneTables => "standalone tables",
			Self::Nowhere => "nowhere",
		};
		f.write_str(s)
	}
}

/// Lifecycle window a disable rule applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum When {
	#[default]
	Always,
	Never,
	UntilPersisted,
	OncePersisted,
}

impl When {
	pub fn applies(self, lifecycle: Lifecycle) -> bool {
		match self {
			Self::Always => true,
			Self::Never => false,
			Self::UntilPersisted => lifecycle == Lifecycle::Transient,
			Self::OncePersisted => lifecycle == Lifecycle::Persistent,
		}
	}
}

/// Side-effect semantics of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Semantics {
	Safe,
	Idempotent,
	#[default]
	NonIdempotent,
}

/// Closed set of recognised declarative metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
	Hidden(Where),
	Disabled { when: When, reason: Option<String> },
	MaxLength(u32),
	Optional,
	Mandatory,
	RegEx { pattern: String, case_insensitive: bool },
	Named(String),
	DescribedAs(String),
	Plural(String),
	MemberOrder(String),
	TypicalLength(u32),
	MultiLine(u16),
	/// Member is visible only to callers holding one of these roles.
	RequiresRole(Vec<String>),
	/// Class instances may not be edited.
	Immutable,
	ActionSemantics(Semantics),
	/// Method is not part of the metamodel.
	Programmatic,
}

impl Annotation {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Hidden(_) => "Hidden",
			Self::Disabled { .. } => "Disabled",
			Self::MaxLength(_) => "MaxLength",
			Self::Optional => "Optional",
			Self::Mandatory => "Mandatory",
			Self::RegEx { .. } => "RegEx",
			Self::Named(_) => "Named",
			Self::DescribedAs(_) => "DescribedAs",
			Self::Plural(_) => "Plural",
			Self::MemberOrder(_) => "MemberOrder",
			Self::TypicalLength(_) => "TypicalLength",
			Self::MultiLine(_) => "MultiLine",
			Self::RequiresRole(_) => "RequiresRole",
			Self::Immutable => "Immutable",
			Self::ActionSemantics(_) => "ActionSemantics",
			Self::Programmatic => "Programmatic",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn where_inclusion() {
		assert!(Where::Anywhere.includes(Where::ObjectForms));
		assert!(Where::AllTables.includes(Where::ParentedTables));
		assert!(!Where::AllTables.includes(Where::ObjectForms));
		assert!(!Where::ObjectForms.includes(Where::Anywhere));
		assert!(!Where::Nowhere.includes(Where::Nowhere));
	}

	#[test]
	fn when_by_lifecycle() {
		assert!(When::UntilPersisted.applies(Lifecycle::Transient));
		assert!(!When::UntilPersisted.applies(Lifecycle::Persistent));
		assert!(When::OncePersisted.applies(Lifecycle::Persistent));
		assert!(!When::Never.applies(Lifecycle::Transient));
	}
}
