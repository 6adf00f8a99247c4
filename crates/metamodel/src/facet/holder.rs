//! Per-feature facet container.
//!
//! # Invariants
//!
//! - At most one live facet per kind.
//!   - Enforced in: [`FacetHolder::put`] (single map slot per [`FacetKind`]).
//!   - Tested by: `tests::one_live_facet_per_kind`.
//! - Holders are only mutated while their feature is being processed; once
//!   the owning specification is published they are read-only.

use rustc_hash::FxHashMap;

use super::precedence::{Contribution, FacetCollision, Precedence, Resolution, resolve};
use super::{Facet, FacetKind};
use crate::ident::FeatureIdentifier;

/// A live facet together with the contribution that placed it.
#[derive(Debug, Clone)]
pub struct HeldFacet {
	pub facet: Facet,
	pub precedence: Precedence,
	/// Name of the contributing factory.
	pub origin: &'static str,
}

impl HeldFacet {
	fn contribution(&self) -> Contribution {
		Contribution {
			origin: self.origin,
			precedence: self.precedence,
		}
	}
}

/// Result of [`FacetHolder::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
	Inserted,
	Collided(FacetCollision),
}

#[derive(Debug, Clone)]
pub struct FacetHolder {
	feature: FeatureIdentifier,
	facets: FxHashMap<FacetKind, HeldFacet>,
}

impl FacetHolder {
	pub(crate) fn new(feature: FeatureIdentifier) -> Self {
		Self {
			feature,
			facets: FxHashMap::default(),
		}
	}

	pub fn feature(&self) -> &FeatureIdentifier {
		&self.feature
	}

	pub fn get(&self, kind: FacetKind) -> Option<&Facet> {
		self.facets.get(&kind).map(|held| &held.facet)
	}

	pub fn get_held(&self, kind: FacetKind) -> Option<&HeldFacet> {
		self.facets.get(&kind)
	}

	pub fn has(&self, kind: FacetKind) -> bool {
		self.facets.contains_key(&kind)
	}

	pub fn len(&self) -> usize {
		self.facets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.facets.is_empty()
	}

	/// Live kinds in [`FacetKind`] order.
	pub fn kinds(&self) -> Vec<FacetKind> {
		let mut kinds: Vec<_> = self.facets.keys().copied().collect();
		kinds.sort_unstable();
		kinds
	}

	/// Live facets in [`FacetKind`] order.
	pub fn iter(&self) -> impl Iterator<Item = &HeldFacet> + '_ {
		self.kinds().into_iter().filter_map(|k| self.facets.get(&k))
	}

	/// Places `facet` unless a facet of the same kind with equal or higher
	/// precedence is already live.
	pub(crate) fn put(
		&mut self,
		facet: Facet,
		precedence: Precedence,
		origin: &'static str,
	) -> PutOutcome {
		let kind = facet.kind();
		let incoming = HeldFacet {
			facet,
			precedence,
			origin,
		};
		let Some(existing) = self.facets.get_mut(&kind) else {
			self.facets.insert(kind, incoming);
			return PutOutcome::Inserted;
		};

		let collision = FacetCollision {
			feature: self.feature.clone(),
			kind,
			existing: existing.contribution(),
			incoming: incoming.contribution(),
			resolution: resolve(&existing.contribution(), &incoming.contribution()),
		};
		if collision.resolution == Resolution::ReplacedExisting {
			*existing = incoming;
		}
		PutOutcome::Collided(collision)
	}

	pub fn max_length(&self) -> Option<u32> {
		match self.get(FacetKind::MaxLength)? {
			Facet::MaxLength(n) => Some(*n),
			_ => None,
		}
	}

	/// Display name from a `Named` facet.
	pub fn named(&self) -> Option<&str> {
		match self.get(FacetKind::Named)? {
			Facet::Named(name) => Some(name),
			_ => None,
		}
	}

	pub fn member_order(&self) -> Option<&str> {
		match self.get(FacetKind::MemberOrder)? {
			Facet::MemberOrder { sequence } => Some(sequence),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ident::{ClassId, FeatureKind};

	fn holder() -> FacetHolder {
		FacetHolder::new(FeatureIdentifier::member(
			ClassId::from("Order"),
			FeatureKind::Property,
			"total",
		))
	}

	#[test]
	fn one_live_facet_per_kind() {
		let mut h = holder();
		assert_eq!(
			h.put(Facet::MaxLength(10), Precedence::CONVENTION, "convention"),
			PutOutcome::Inserted
		);
		let outcome = h.put(Facet::MaxLength(6), Precedence::ANNOTATION, "annotation");
		let PutOutcome::Collided(collision) = outcome else {
			panic!("expected collision");
		};
		assert_eq!(collision.resolution, Resolution::ReplacedExisting);
		assert_eq!(collision.winner().origin, "annotation");
		assert_eq!(h.len(), 1);
		assert_eq!(h.max_length(), Some(6));
	}

	#[test]
	fn lower_precedence_is_dropped() {
		let mut h = holder();
		h.put(Facet::MaxLength(6), Precedence::ANNOTATION, "annotation");
		h.put(Facet::MaxLength(10), Precedence::CONVENTION, "convention");
		assert_eq!(h.max_length(), Some(6));
		assert_eq!(h.get_held(FacetKind::MaxLength).unwrap().origin, "annotation");
	}

	#[test]
	fn equal_precedence_keeps_first() {
		let mut h = holder();
		h.put(Facet::Named("First".into()), Precedence::ANNOTATION, "a");
		h.put(Facet::Named("Second".into()), Precedence::ANNOTATION, "b");
		assert_eq!(h.named(), Some("First"));
	}

	#[test]
	fn kinds_are_sorted() {
		let mut h = holder();
		h.put(Facet::MaxLength(1), Precedence::CONVENTION, "x");
		h.put(
			Facet::Hidden {
				location: crate::introspect::Where::Anywhere,
			},
			Precedence::CONVENTION,
			"x",
		);
		assert_eq!(h.kinds(), [FacetKind::Hidden, FacetKind::MaxLength]);
		assert_eq!(h.iter().count(), 2);
		assert!(h.has(FacetKind::Hidden));
		assert!(!h.has(FacetKind::Disabled));
	}
}
