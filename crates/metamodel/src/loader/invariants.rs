use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::generation::{Claim, Generation};
use super::*;
use crate::error::{FactoryError, ViolationSource};
use crate::facet::Precedence;
use crate::factory::{FacetFactory, ProcessContext};
use crate::ident::FeatureKinds;
use crate::introspect::{ClassDescriptor, TypeRef};

fn catalog() -> Arc<ClassCatalog> {
	Arc::new(
		ClassCatalog::builder()
			.add(
				ClassDescriptor::builder("Order")
					.property("customer", TypeRef::class("Customer"))
					.getter("lines", TypeRef::collection_of(TypeRef::class("Line")))
					.build(),
			)
			.add(
				ClassDescriptor::builder("Customer")
					.getter("orders", TypeRef::collection_of(TypeRef::class("Order")))
					.build(),
			)
			.add(
				ClassDescriptor::builder("Line")
					.property("quantity", TypeRef::int())
					.build(),
			)
			.add(
				ClassDescriptor::builder("Standalone")
					.property("name", TypeRef::text())
					.build(),
			)
			.add(
				ClassDescriptor::builder("Dangling")
					.property("ghost", TypeRef::class("Ghost"))
					.build(),
			)
			.build(),
	)
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn new_loader() -> SpecificationLoader {
	SpecificationLoader::from_config(catalog(), &MetamodelConfig::default())
}

fn eager_loader() -> SpecificationLoader {
	new_loader().with_eager_references(true)
}

/// Panics while processing the class feature of one class.
struct PanicOn {
	class: &'static str,
}

impl FacetFactory for PanicOn {
	fn name(&self) -> &'static str {
		"panic-on"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::CLASS
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		if cx.feature().class().id.as_str() == self.class {
			panic!("factory exploded on {}", self.class);
		}
		Ok(())
	}
}

/// Blocks the first class build until released.
struct Gate {
	armed: AtomicBool,
	entered: Arc<Barrier>,
	release: Arc<Barrier>,
}

impl FacetFactory for Gate {
	fn name(&self) -> &'static str {
		"gate"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::CLASS
	}

	fn process(&self, _: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		if self.armed.swap(false, Ordering::SeqCst) {
			self.entered.wait();
			self.release.wait();
		}
		Ok(())
	}
}

/// Must return the identical specification for repeated lookups in one generation.
///
/// * Enforced in: `Generation::claim`
/// * Failure symptom: facets evaluated against stale or duplicated metamodels.
#[cfg_attr(test, test)]
pub(crate) fn test_idempotent_lookup() {
	let loader = new_loader();
	let a = loader.specification_for("Standalone").unwrap();
	let b = loader.specification_for("Standalone").unwrap();
	assert!(Arc::ptr_eq(&a, &b));
	assert_eq!(loader.stats().builds, 1);
	assert!(Arc::ptr_eq(&loader.cached("Standalone").unwrap(), &a));
}

/// Must build a class exactly once under concurrent first access.
///
/// * Enforced in: `Generation::claim` (waiters park on the condvar)
/// * Failure symptom: two different specifications for one class in one generation.
#[cfg_attr(test, test)]
pub(crate) fn test_concurrent_build_once() {
	let loader = new_loader();
	let threads = 8;
	let barrier = Barrier::new(threads);
	let specs: Vec<_> = thread::scope(|s| {
		let handles: Vec<_> = (0..threads)
			.map(|_| {
				s.spawn(|| {
					barrier.wait();
					loader.specification_for("Standalone").unwrap()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});
	assert!(specs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
	assert_eq!(loader.stats().builds, 1);
}

/// Must terminate on reference cycles, whichever side is requested first.
///
/// * Enforced in: `Generation::try_claim`
/// * Failure symptom: unbounded recursion or a deadlock between two builders.
#[cfg_attr(test, test)]
pub(crate) fn test_cycle_terminates() {
	let loader = eager_loader();
	let order = loader.specification_for("Order").unwrap();
	let customer = loader.cached("Customer").expect("referenced class built eagerly");
	assert!(loader.cached("Line").is_some());
	assert_eq!(loader.stats().builds, 3);
	assert!(Arc::ptr_eq(&loader.specification_for("Customer").unwrap(), &customer));
	assert!(order.lookup_member("customer").is_some());

	let loader = eager_loader();
	let barrier = Barrier::new(2);
	thread::scope(|s| {
		let a = s.spawn(|| {
			barrier.wait();
			loader.specification_for("Order").unwrap()
		});
		let b = s.spawn(|| {
			barrier.wait();
			loader.specification_for("Customer").unwrap()
		});
		a.join().unwrap();
		b.join().unwrap();
	});
	assert_eq!(loader.stats().cached, 3);
}

/// Must not build referenced classes unless eager references are enabled.
///
/// * Enforced in: `SpecificationLoader::ensure_references`
/// * Failure symptom: one lookup materialises the whole reachable type graph.
#[cfg_attr(test, test)]
pub(crate) fn test_lazy_references_build_on_demand() {
	let loader = new_loader();
	let order = loader.specification_for("Order").unwrap();
	assert_eq!(loader.stats().builds, 1);
	assert!(loader.cached("Customer").is_none());

	let customer_type = order.lookup_member("customer").unwrap().value_type().clone();
	let customer = loader.specification_for_type(&customer_type).unwrap();
	assert_eq!(customer.class_id().as_str(), "Customer");
	assert_eq!(loader.stats().builds, 2);
}

/// Must reject a same-thread re-entrant top-level request instead of deadlocking.
///
/// * Enforced in: `Generation::claim`
/// * Failure symptom: a thread waits on its own in-progress build forever.
#[cfg_attr(test, test)]
pub(crate) fn test_reentrant_claim_is_rejected() {
	let model = Arc::new(ProgrammingModel::builder().build());
	let generation = Generation::new(0, model);
	let id = ClassId::from("Order");
	let Claim::Build(guard) = generation.claim(&id) else {
		panic!("first claim must build");
	};
	assert!(matches!(generation.claim(&id), Claim::Reentrant));
	assert!(generation.try_claim(&id).is_none());
	drop(guard);
	assert!(matches!(generation.claim(&id), Claim::Build(_)));
}

/// Must remove the placeholder when a build panics so a later lookup can retry.
///
/// * Enforced in: `BuildGuard::drop`
/// * Failure symptom: every later lookup of the class blocks forever.
#[cfg_attr(test, test)]
pub(crate) fn test_panicking_build_is_retried() {
	let model = Arc::new(ProgrammingModel::builder().build());
	let generation = Generation::new(0, model);
	let id = ClassId::from("Standalone");
	let Claim::Build(guard) = generation.claim(&id) else {
		panic!("first claim must build");
	};
	let first = catch_unwind(AssertUnwindSafe(move || {
		let _guard = guard;
		panic!("build exploded");
	}));
	assert!(first.is_err());
	assert!(generation.get(&id).is_none());
	assert!(matches!(generation.claim(&id), Claim::Build(_)));
}

/// Must turn a panicking factory into a violation on the class it was
/// processing, without aborting the lookup or any class that refers to it.
///
/// * Enforced in: `ProgrammingModel::process`
/// * Failure symptom: one bad factory on a referenced class unwinds out of
///   `specification_for` for every class that reaches it.
#[cfg_attr(test, test)]
pub(crate) fn test_panicking_factory_is_contained() {
	init_tracing();
	let model = ProgrammingModel::builtin_builder(&MetamodelConfig::default())
		.register(PanicOn { class: "Customer" }, Precedence::FALLBACK)
		.build();
	let loader = SpecificationLoader::new(catalog(), model, ClassSubstitutor::default())
		.with_eager_references(true);

	let order = loader.specification_for("Order").unwrap();
	assert!(order.violations().is_empty());
	assert_eq!(loader.stats().builds, 3);

	let err = loader.specification_for("Customer").unwrap_err();
	let customer = err.specification().expect("invalid spec is returned for diagnostics");
	assert_eq!(customer.violations().len(), 1);
	let violation = &customer.violations()[0];
	assert_eq!(violation.source, ViolationSource::Factory("panic-on"));
	assert_eq!(violation.message, "panicked: factory exploded on Customer");
	assert_eq!(loader.stats().builds, 3);
}

/// Must hand out fresh specifications after invalidation while letting an
/// in-flight build complete into its original generation.
///
/// * Enforced in: `SpecificationLoader::swap_generation`
/// * Failure symptom: stale specifications survive a model change, or an
///   in-flight caller receives nothing.
#[cfg_attr(test, test)]
pub(crate) fn test_invalidation_yields_new_identity() {
	let loader = new_loader();
	let before = loader.specification_for("Standalone").unwrap();
	loader.invalidate_all();
	let after = loader.specification_for("Standalone").unwrap();
	assert!(!Arc::ptr_eq(&before, &after));
	assert_eq!(before.epoch(), 0);
	assert_eq!(after.epoch(), 1);
	assert_eq!(loader.stats().epoch, 1);

	let entered = Arc::new(Barrier::new(2));
	let release = Arc::new(Barrier::new(2));
	let model = ProgrammingModel::builder()
		.register(
			Gate {
				armed: AtomicBool::new(true),
				entered: entered.clone(),
				release: release.clone(),
			},
			Precedence::CONVENTION,
		)
		.build();
	let loader = SpecificationLoader::new(catalog(), model, ClassSubstitutor::default());
	thread::scope(|s| {
		let in_flight = s.spawn(|| loader.specification_for("Standalone").unwrap());
		entered.wait();
		loader.invalidate_all();
		release.wait();
		let old = in_flight.join().unwrap();
		assert_eq!(old.epoch(), 0);
		let fresh = loader.specification_for("Standalone").unwrap();
		assert_eq!(fresh.epoch(), 1);
		assert!(!Arc::ptr_eq(&old, &fresh));
	});
}

/// Must report unresolvable member types as violations on the referring feature.
///
/// * Enforced in: `SpecificationLoader::ensure_references`
/// * Failure symptom: a member silently points at a class no one can load.
#[cfg_attr(test, test)]
pub(crate) fn test_dangling_reference_is_a_violation() {
	init_tracing();
	let loader = new_loader();
	let err = loader.specification_for("Dangling").unwrap_err();
	let spec = err.specification().expect("invalid spec is returned for diagnostics");
	assert_eq!(spec.violations().len(), 1);
	let violation = &spec.violations()[0];
	assert_eq!(violation.source, ViolationSource::Reference);
	assert_eq!(violation.feature.to_string(), "Dangling#ghost");
	assert!(matches!(
		loader.specification_for("Dangling"),
		Err(LoadError::Invalid { .. })
	));
	assert_eq!(loader.stats().builds, 1);
}

/// Must suggest a close class name for unknown classes.
#[cfg_attr(test, test)]
pub(crate) fn test_unknown_class_suggestion() {
	let loader = new_loader();
	let err = loader.specification_for("Ordr").unwrap_err();
	assert_eq!(err.to_string(), "unknown class Ordr (did you mean Order?)");
	let LoadError::UnknownClass { name, suggestion } = err else {
		panic!("expected unknown class, got {err:?}");
	};
	assert_eq!(&*name, "Ordr");
	assert_eq!(suggestion.as_deref(), Some("Order"));
	assert!(matches!(
		loader.specification_for_type(&TypeRef::int()),
		Err(LoadError::NotAClass(_))
	));
}
