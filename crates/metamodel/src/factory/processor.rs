//! Running the programming model over traversed features.
//!
//! # Role
//!
//! For each feature the processor invokes the applicable factories in
//! registration order. Contributions are buffered per call and only committed
//! to the [`FacetHolder`] when the factory returns `Ok`. After all features of a
//! class are processed, reserved-name methods nobody consumed are reported as
//! orphans.
//!
//! # Invariants
//!
//! - A failing factory leaves no facets behind for that call.
//!   - Tested by: `tests::failed_factory_contributes_nothing`.
//! - A panicking factory is contained: it becomes a violation on the feature
//!   and the remaining factories still run.
//!   - Tested by: `tests::panicking_factory_is_a_violation`.
//! - Mutually exclusive facet kinds on one holder become a violation, never a
//!   silent pick.
//!   - Tested by: `tests::exclusive_kinds_are_reported`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::ProgrammingModel;
use crate::error::{Violation, ViolationSource};
use crate::facet::{Facet, FacetCollision, FacetHolder, FacetKind, PutOutcome};
use crate::ident::{FeatureIdentifier, FeatureKind};
use crate::introspect::{Annotation, MethodDescriptor, ParamDescriptor, TypeRef};
use crate::traverse::{ActionFeature, CollectionFeature, PropertyFeature, TraversedClass};

/// Borrowed view of one feature being processed.
#[derive(Debug, Clone, Copy)]
pub enum Feature<'a> {
	Class {
		class: &'a TraversedClass,
	},
	Property {
		class: &'a TraversedClass,
		property: &'a PropertyFeature,
	},
	Collection {
		class: &'a TraversedClass,
		collection: &'a CollectionFeature,
	},
	Action {
		class: &'a TraversedClass,
		action: &'a ActionFeature,
	},
	Parameter {
		class: &'a TraversedClass,
		action: &'a ActionFeature,
		index: u16,
		param: &'a ParamDescriptor,
	},
}

impl<'a> Feature<'a> {
	pub fn kind(&self) -> FeatureKind {
		match self {
			Self::Class { .. } => FeatureKind::Class,
			Self::Property { .. } => FeatureKind::Property,
			Self::Collection { .. } => FeatureKind::Collection,
			Self::Action { .. } => FeatureKind::Action,
			Self::Parameter { .. } => FeatureKind::ActionParameter,
		}
	}

	pub fn class(&self) -> &'a TraversedClass {
		match *self {
			Self::Class { class }
			| Self::Property { class, .. }
			| Self::Collection { class, .. }
			| Self::Action { class, .. }
			| Self::Parameter { class, .. } => class,
		}
	}

	/// Member name; for parameters, the owning action's name.
	pub fn member_name(&self) -> Option<&'a Arc<str>> {
		match *self {
			Self::Class { .. } => None,
			Self::Property { property, .. } => Some(&property.name),
			Self::Collection { collection, .. } => Some(&collection.name),
			Self::Action { action, .. } | Self::Parameter { action, .. } => Some(&action.name),
		}
	}

	pub fn identifier(&self) -> FeatureIdentifier {
		let id = self.class().id.clone();
		match *self {
			Self::Class { .. } => FeatureIdentifier::class(id),
			Self::Property { property, .. } => {
				FeatureIdentifier::member(id, FeatureKind::Property, property.name.clone())
			}
			Self::Collection { collection, .. } => {
				FeatureIdentifier::member(id, FeatureKind::Collection, collection.name.clone())
			}
			Self::Action { action, .. } => {
				FeatureIdentifier::member(id, FeatureKind::Action, action.name.clone())
			}
			Self::Parameter { action, index, .. } => {
				FeatureIdentifier::parameter(id, action.name.clone(), index)
			}
		}
	}

	/// Declarative metadata attached to the feature.
	///
	/// Property and collection annotations live on the getter.
	pub fn annotations(&self) -> &'a [Annotation] {
		match *self {
			Self::Class { class } => &class.descriptor.annotations,
			Self::Property { property, .. } => &property.getter.annotations,
			Self::Collection { collection, .. } => &collection.getter.annotations,
			Self::Action { action, .. } => &action.method.annotations,
			Self::Parameter { param, .. } => &param.annotations,
		}
	}

	/// Type of the value this feature holds or accepts.
	///
	/// Collections report their element type and actions their return type.
	pub fn value_type(&self) -> Option<&'a TypeRef> {
		match *self {
			Self::Class { .. } => None,
			Self::Property { property, .. } => Some(&property.ty),
			Self::Collection { collection, .. } => Some(&collection.element),
			Self::Action { action, .. } => Some(&action.method.returns),
			Self::Parameter { param, .. } => Some(&param.ty),
		}
	}
}

/// Per-call handle a factory contributes through.
pub struct ProcessContext<'a> {
	feature: Feature<'a>,
	pending: Vec<Facet>,
	consumed: Vec<Arc<str>>,
}

impl<'a> ProcessContext<'a> {
	fn new(feature: Feature<'a>) -> Self {
		Self {
			feature,
			pending: Vec::new(),
			consumed: Vec::new(),
		}
	}

	pub fn feature(&self) -> Feature<'a> {
		self.feature
	}

	/// Queues `facet`; it is placed on the holder if the factory returns `Ok`.
	pub fn add(&mut self, facet: Facet) {
		self.pending.push(facet);
	}

	/// Looks up an effective method by name and marks it as consumed.
	pub fn supporting_method(&mut self, name: &str) -> Option<&'a MethodDescriptor> {
		let method = self.feature.class().method(name)?;
		self.consumed.push(method.name.clone());
		Some(method)
	}
}

/// Result of processing one feature.
#[derive(Debug)]
pub struct ProcessedFeature {
	pub holder: FacetHolder,
	pub violations: Vec<Violation>,
	pub collisions: Vec<FacetCollision>,
	/// Supporting methods claimed by any factory.
	pub consumed: Vec<Arc<str>>,
}

/// Result of processing every feature of one class.
///
/// Holder vectors are parallel to the corresponding [`TraversedClass`] lists.
#[derive(Debug)]
pub struct ProcessedClass {
	pub class: FacetHolder,
	pub properties: Vec<FacetHolder>,
	pub collections: Vec<FacetHolder>,
	/// Action holder with its parameter holders.
	pub actions: Vec<(FacetHolder, Vec<FacetHolder>)>,
	pub violations: Vec<Violation>,
	pub collisions: Vec<FacetCollision>,
}

impl ProgrammingModel {
	/// Runs every factory applicable to `feature`.
	pub fn process(&self, feature: Feature<'_>) -> ProcessedFeature {
		let identifier = feature.identifier();
		let mut out = ProcessedFeature {
			holder: FacetHolder::new(identifier.clone()),
			violations: Vec::new(),
			collisions: Vec::new(),
			consumed: Vec::new(),
		};

		for reg in self.factories_for(feature.kind()) {
			let name = reg.factory.name();
			let mut cx = ProcessContext::new(feature);
			let result = panic::catch_unwind(AssertUnwindSafe(|| reg.factory.process(&mut cx)));
			out.consumed.append(&mut cx.consumed);
			let failure = match result {
				Ok(Ok(())) => {
					for facet in cx.pending {
						if let PutOutcome::Collided(collision) =
							out.holder.put(facet, reg.precedence, name)
						{
							tracing::trace!(
								domain = "factory",
								feature = %identifier,
								kind = %collision.kind,
								winner = collision.winner().origin,
								"facet collision"
							);
							out.collisions.push(collision);
						}
					}
					continue;
				}
				Ok(Err(err)) => err.to_string(),
				Err(payload) => format!("panicked: {}", panic_message(&*payload)),
			};
			tracing::warn!(
				domain = "factory",
				feature = %identifier,
				factory = name,
				error = %failure,
				"facet factory failed"
			);
			out.violations.push(Violation::new(
				identifier.clone(),
				ViolationSource::Factory(name),
				failure,
			));
		}

		for &(a, b) in FacetKind::exclusive_pairs() {
			if out.holder.has(a) && out.holder.has(b) {
				out.violations.push(Violation::new(
					identifier.clone(),
					ViolationSource::Exclusivity,
					format!("{a} and {b} are mutually exclusive"),
				));
			}
		}
		out
	}

	/// Processes the class feature and every member and parameter of `class`.
	pub fn process_class(&self, class: &TraversedClass) -> ProcessedClass {
		let mut violations = class.violations.clone();
		let mut collisions = Vec::new();
		let mut consumed: FxHashSet<Arc<str>> = FxHashSet::default();
		let mut run = |feature: Feature<'_>| {
			let processed = self.process(feature);
			violations.extend(processed.violations);
			collisions.extend(processed.collisions);
			consumed.extend(processed.consumed);
			processed.holder
		};

		let class_holder = run(Feature::Class { class });
		let properties = class
			.properties
			.iter()
			.map(|property| run(Feature::Property { class, property }))
			.collect();
		let collections = class
			.collections
			.iter()
			.map(|collection| run(Feature::Collection { class, collection }))
			.collect();
		let actions = class
			.actions
			.iter()
			.map(|action| {
				let holder = run(Feature::Action { class, action });
				let params = action
					.method
					.params
					.iter()
					.enumerate()
					.map(|(index, param)| {
						run(Feature::Parameter {
							class,
							action,
							index: index as u16,
							param,
						})
					})
					.collect();
				(holder, params)
			})
			.collect();

		for method in &class.methods {
			if self.reserved.is_reserved(&method.name) && !consumed.contains(&method.name) {
				violations.push(Violation::new(
					FeatureIdentifier::class(class.id.clone()),
					ViolationSource::Orphan,
					format!("supporting method {} matches no member", method.name),
				));
			}
		}

		ProcessedClass {
			class: class_holder,
			properties,
			collections,
			actions,
			violations,
			collisions,
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message
	} else {
		"unknown panic payload"
	}
}
