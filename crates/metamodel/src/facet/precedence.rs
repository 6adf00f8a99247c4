//! Precedence rules for competing facet contributions.
//!
//! # Role
//!
//! Every factory is registered with a [`Precedence`]. When two factories
//! contribute a facet of the same kind to one holder, the contribution with
//! strictly higher precedence survives. On a tie the existing contribution is
//! kept, so the first factory registered at a given precedence wins.
//!
//! Precedence is a total order fixed at registration time; it is never
//! computed from the facets themselves.

use std::fmt;

use super::FacetKind;
use crate::ident::FeatureIdentifier;

/// Total order used to decide which of several contributions survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(i16);

impl Precedence {
	/// Last-resort defaults.
	pub const FALLBACK: Self = Self(-100);
	/// Naming and typing conventions.
	pub const CONVENTION: Self = Self(0);
	/// Inferred from structure (e.g. a property without a setter).
	pub const INFERRED: Self = Self(50);
	/// Supporting methods written by the application.
	pub const SUPPORTING_METHOD: Self = Self(80);
	/// Explicit declarative annotations.
	pub const ANNOTATION: Self = Self(100);
	/// Application-level overrides registered on top of the builtins.
	pub const OVERRIDE: Self = Self(200);

	pub const fn new(value: i16) -> Self {
		Self(value)
	}

	pub const fn value(self) -> i16 {
		self.0
	}
}

impl fmt::Display for Precedence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match *self {
			Self::FALLBACK => "fallback",
			Self::CONVENTION => "convention",
			Self::INFERRED => "inferred",
			Self::SUPPORTING_METHOD => "supporting-method",
			Self::ANNOTATION => "annotation",
			Self::OVERRIDE => "override",
			_ => return write!(f, "{}", self.0),
		};
		f.write_str(name)
	}
}

/// One side of a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
	/// Name of the contributing factory.
	pub origin: &'static str,
	pub precedence: Precedence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	/// Existing facet kept; incoming dropped.
	KeptExisting,
	/// Existing facet replaced by incoming.
	ReplacedExisting,
}

/// Decides a collision between an existing and an incoming contribution.
pub fn resolve(existing: &Contribution, incoming: &Contribution) -> Resolution {
	if incoming.precedence > existing.precedence {
		Resolution::ReplacedExisting
	} else {
		Resolution::KeptExisting
	}
}

/// Diagnostic record of two contributions competing for one facet kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCollision {
	pub feature: FeatureIdentifier,
	pub kind: FacetKind,
	pub existing: Contribution,
	pub incoming: Contribution,
	pub resolution: Resolution,
}

impl FacetCollision {
	pub fn winner(&self) -> &Contribution {
		match self.resolution {
			Resolution::KeptExisting => &self.existing,
			Resolution::ReplacedExisting => &self.incoming,
		}
	}
}
