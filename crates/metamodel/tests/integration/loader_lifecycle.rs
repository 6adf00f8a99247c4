use std::sync::{Arc, Barrier};
use std::thread;

use ferrule_metamodel::factory::{Feature, ProcessContext};
use ferrule_metamodel::{
	Facet, FacetFactory, FacetKind, FactoryError, FeatureKinds, MetamodelConfig, Precedence,
	ProgrammingModel,
};
use pretty_assertions::assert_eq;

use crate::common::{init_tracing, order_loader};

#[test]
fn concurrent_lookups_across_a_cycle_build_each_class_once() {
	init_tracing();
	let loader = order_loader();
	let names = ["Order", "Customer", "Line", "Order$$EnhancerByCGLIB$$1f2e"];
	let barrier = Barrier::new(16);
	let results: Vec<_> = thread::scope(|s| {
		let handles: Vec<_> = (0..16)
			.map(|i| {
				let loader = &loader;
				let barrier = &barrier;
				s.spawn(move || {
					barrier.wait();
					let name = names[i % names.len()];
					(name, loader.specification_for(name).unwrap())
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(loader.stats().builds, 3);
	assert_eq!(loader.stats().cached, 3);
	for (name, spec) in &results {
		let cached = loader.cached(name).unwrap();
		assert!(Arc::ptr_eq(spec, &cached), "{name}");
	}
}

#[test]
fn invalidation_hands_out_new_specifications() {
	init_tracing();
	let loader = order_loader();
	let before = loader.specification_for("Order").unwrap();
	loader.invalidate_all();
	assert_eq!(loader.stats().cached, 0);

	let after = loader.specification_for("Order").unwrap();
	assert!(!Arc::ptr_eq(&before, &after));
	assert_eq!((before.epoch(), after.epoch()), (0, 1));
	// Old specifications stay usable by whoever still holds them.
	assert!(before.lookup_member("total").is_some());
}

/// Describes every property as "audited".
struct Audited;

impl FacetFactory for Audited {
	fn name(&self) -> &'static str {
		"audited"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::PROPERTY
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		if let Feature::Property { .. } = cx.feature() {
			cx.add(Facet::DescribedAs("audited".into()));
		}
		Ok(())
	}
}

#[test]
fn replacing_the_model_rebuilds_with_new_factories() {
	init_tracing();
	let loader = order_loader();
	let before = loader.specification_for("Order").unwrap();
	let total = before.lookup_member("total").unwrap();
	assert!(!total.has_facet(FacetKind::DescribedAs));

	let mut config = MetamodelConfig::default();
	config.factories.convention_max_length = Some(10);
	loader.replace_model(
		ProgrammingModel::builtin_builder(&config)
			.register(Audited, Precedence::CONVENTION)
			.build(),
	);
	assert!(loader.model().factory_names().any(|n| n == "audited"));

	let after = loader.specification_for("Order").unwrap();
	let total = after.lookup_member("total").unwrap();
	assert!(matches!(
		total.holder().get(FacetKind::DescribedAs),
		Some(Facet::DescribedAs(text)) if &**text == "audited"
	));
	assert_eq!(after.epoch(), 1);
}
