//! Object specifications.
//!
//! # Role
//!
//! An [`ObjectSpecification`] is the immutable metamodel of one logical domain
//! class: the class-level [`FacetHolder`] plus an ordered list of
//! [`ObjectMember`]s, each with its own holder and (for actions) its
//! parameters. Specifications are built once by the
//! [`SpecificationLoader`](crate::loader::SpecificationLoader) and shared as
//! `Arc<ObjectSpecification>`.
//!
//! # Invariants
//!
//! - Member names are unique within a specification.
//!   - Enforced in: `FeatureTraverser` (duplicates become violations, not members).
//! - Members are ordered properties, collections, actions, each in traversal order.
//! - A published specification is never mutated.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ObjectSpecification`] | Per-class metamodel. |
//! | [`ObjectMember`] | Property, collection or action. |
//! | [`ObjectActionParameter`] | One action parameter. |

mod member;

use std::cmp::Ordering;
use std::sync::Arc;

pub use member::{ObjectActionParameter, ObjectMember};
use rustc_hash::FxHashMap;

use crate::error::Violation;
use crate::facet::{FacetCollision, FacetHolder};
use crate::factory::ProcessedClass;
use crate::ident::{ClassId, FeatureIdentifier, FeatureKind};
use crate::introspect::{TypeRef, suggest};
use crate::traverse::TraversedClass;

#[derive(Debug)]
pub struct ObjectSpecification {
	identifier: FeatureIdentifier,
	holder: FacetHolder,
	members: Vec<ObjectMember>,
	by_name: FxHashMap<Arc<str>, usize>,
	superclass: Option<Arc<str>>,
	is_abstract: bool,
	violations: Vec<Violation>,
	collisions: Vec<FacetCollision>,
	epoch: u64,
}

impl ObjectSpecification {
	/// Combines traversal and facet processing output.
	pub(crate) fn assemble(class: TraversedClass, processed: ProcessedClass, epoch: u64) -> Self {
		let ProcessedClass {
			class: holder,
			properties,
			collections,
			actions,
			violations,
			collisions,
		} = processed;
		let id = class.id.clone();
		let mut members = Vec::with_capacity(properties.len() + collections.len() + actions.len());

		for (property, holder) in class.properties.into_iter().zip(properties) {
			members.push(ObjectMember {
				identifier: holder.feature().clone(),
				name: property.name,
				holder,
				value_type: property.ty,
				params: Box::default(),
			});
		}
		for (collection, holder) in class.collections.into_iter().zip(collections) {
			members.push(ObjectMember {
				identifier: holder.feature().clone(),
				name: collection.name,
				holder,
				value_type: TypeRef::collection_of(collection.element),
				params: Box::default(),
			});
		}
		for (action, (holder, param_holders)) in class.actions.into_iter().zip(actions) {
			let params = action
				.method
				.params
				.into_iter()
				.zip(param_holders)
				.enumerate()
				.map(|(index, (param, holder))| ObjectActionParameter {
					identifier: holder.feature().clone(),
					index: index as u16,
					name: param.name,
					ty: param.ty,
					holder,
				})
				.collect();
			members.push(ObjectMember {
				identifier: holder.feature().clone(),
				name: action.name,
				holder,
				value_type: action.method.returns,
				params,
			});
		}

		let by_name = members
			.iter()
			.enumerate()
			.map(|(i, m)| (m.name.clone(), i))
			.collect();

		Self {
			identifier: FeatureIdentifier::class(id),
			holder,
			members,
			by_name,
			superclass: class.descriptor.superclass.clone(),
			is_abstract: class.descriptor.is_abstract,
			violations,
			collisions,
			epoch,
		}
	}

	pub fn identifier(&self) -> &FeatureIdentifier {
		&self.identifier
	}

	pub fn class_id(&self) -> &ClassId {
		self.identifier.class_id()
	}

	/// Class-level facets.
	pub fn holder(&self) -> &FacetHolder {
		&self.holder
	}

	/// `Named` facet if present, otherwise the class name.
	pub fn display_name(&self) -> &str {
		self.holder
			.named()
			.unwrap_or_else(|| self.class_id().as_str())
	}

	pub fn superclass(&self) -> Option<&str> {
		self.superclass.as_deref()
	}

	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	/// All members: properties, collections, then actions.
	pub fn members(&self) -> &[ObjectMember] {
		&self.members
	}

	pub fn lookup_member(&self, name: &str) -> Option<&ObjectMember> {
		self.by_name.get(name).map(|&i| &self.members[i])
	}

	/// Closest member name to `name`, for "did you mean" diagnostics.
	pub fn suggest_member(&self, name: &str) -> Option<Arc<str>> {
		suggest(name, self.by_name.keys())
	}

	pub fn properties(&self) -> impl Iterator<Item = &ObjectMember> + '_ {
		self.members_of(FeatureKind::Property)
	}

	pub fn collections(&self) -> impl Iterator<Item = &ObjectMember> + '_ {
		self.members_of(FeatureKind::Collection)
	}

	pub fn actions(&self) -> impl Iterator<Item = &ObjectMember> + '_ {
		self.members_of(FeatureKind::Action)
	}

	fn members_of(&self, kind: FeatureKind) -> impl Iterator<Item = &ObjectMember> + '_ {
		self.members.iter().filter(move |m| m.kind() == kind)
	}

	/// Members sorted by `MemberOrder` sequence; unsequenced members follow in
	/// their natural order.
	pub fn members_in_display_order(&self) -> Vec<&ObjectMember> {
		let (mut sequenced, unsequenced): (Vec<_>, Vec<_>) = self
			.members
			.iter()
			.partition(|m| m.holder().member_order().is_some());
		sequenced.sort_by(|a, b| {
			compare_sequence(
				a.holder().member_order().unwrap_or_default(),
				b.holder().member_order().unwrap_or_default(),
			)
		});
		sequenced.extend(unsequenced);
		sequenced
	}

	/// Metamodel violations found while building this specification.
	pub fn violations(&self) -> &[Violation] {
		&self.violations
	}

	pub fn is_valid(&self) -> bool {
		self.violations.is_empty()
	}

	/// Facet collisions resolved by precedence, for diagnostics.
	pub fn collisions(&self) -> &[FacetCollision] {
		&self.collisions
	}

	/// Loader generation this specification was built in.
	pub fn epoch(&self) -> u64 {
		self.epoch
	}
}

/// Orders dotted sequences component-wise numerically: `1.2 < 1.10 < 2`.
fn compare_sequence(a: &str, b: &str) -> Ordering {
	let parts = |s: &str| -> Vec<u64> {
		s.split('.')
			.map(|p| p.parse().unwrap_or(u64::MAX))
			.collect()
	};
	parts(a).cmp(&parts(b))
}
