use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::error::ViolationSource;
use crate::facet::{Facet, FacetKind};
use crate::introspect::{
	Annotation, ClassCatalog, ClassDescriptor, MethodDescriptor, ParamDescriptor, TypeRef,
};
use crate::traverse::{TraversedClass, traverse};

struct Fixed {
	name: &'static str,
	max: u32,
}

impl FacetFactory for Fixed {
	fn name(&self) -> &'static str {
		self.name
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::PROPERTY
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		cx.add(Facet::MaxLength(self.max));
		Ok(())
	}
}

struct Failing;

impl FacetFactory for Failing {
	fn name(&self) -> &'static str {
		"failing"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::PROPERTY
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		cx.add(Facet::TypicalLength(3));
		Err(FactoryError::Other("boom".to_string()))
	}
}

/// Adds a facet, then panics with an indexing bug.
struct Exploding;

impl FacetFactory for Exploding {
	fn name(&self) -> &'static str {
		"exploding"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::PROPERTY
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		cx.add(Facet::TypicalLength(3));
		let lengths: Vec<u32> = Vec::new();
		let index = cx.feature().class().properties.len();
		cx.add(Facet::MaxLength(lengths[index]));
		Ok(())
	}
}

fn traversed(model: &ProgrammingModel, desc: ClassDescriptor) -> TraversedClass {
	let catalog = ClassCatalog::builder().add(desc).build();
	let name = catalog.names()[0].clone();
	let desc = catalog.get(&name).unwrap().clone();
	traverse(&catalog, &desc, model.reserved_names())
}

fn order() -> ClassDescriptor {
	ClassDescriptor::builder("Order")
		.property("total", TypeRef::text())
		.build()
}

#[rstest]
#[case::low_first(false)]
#[case::high_first(true)]
fn precedence_decides_regardless_of_order(#[case] high_first: bool) {
	let low = Fixed {
		name: "low",
		max: 10,
	};
	let high = Fixed {
		name: "high",
		max: 6,
	};
	let builder = ProgrammingModel::builder();
	let builder = if high_first {
		builder
			.register(high, Precedence::ANNOTATION)
			.register(low, Precedence::CONVENTION)
	} else {
		builder
			.register(low, Precedence::CONVENTION)
			.register(high, Precedence::ANNOTATION)
	};
	let model = builder.build();
	let class = traversed(&model, order());
	let processed = model.process_class(&class);
	let holder = &processed.properties[0];
	assert_eq!(holder.max_length(), Some(6));
	assert_eq!(holder.get_held(FacetKind::MaxLength).unwrap().origin, "high");
	assert_eq!(processed.collisions.len(), 1);
}

#[test]
fn registration_order_breaks_ties() {
	let model = ProgrammingModel::builder()
		.register(Fixed { name: "first", max: 1 }, Precedence::ANNOTATION)
		.register(Fixed { name: "second", max: 2 }, Precedence::ANNOTATION)
		.build();
	assert_eq!(model.factory_names().collect::<Vec<_>>(), ["first", "second"]);
	let class = traversed(&model, order());
	let processed = model.process_class(&class);
	assert_eq!(processed.properties[0].max_length(), Some(1));
}

#[test]
fn failed_factory_contributes_nothing() {
	let model = ProgrammingModel::builder()
		.register(Failing, Precedence::ANNOTATION)
		.register(Fixed { name: "ok", max: 4 }, Precedence::CONVENTION)
		.build();
	let class = traversed(&model, order());
	let processed = model.process_class(&class);
	let holder = &processed.properties[0];
	assert!(!holder.has(FacetKind::TypicalLength));
	assert_eq!(holder.max_length(), Some(4));
	assert_eq!(processed.violations.len(), 1);
	assert_eq!(
		processed.violations[0].source,
		ViolationSource::Factory("failing")
	);
	assert_eq!(processed.violations[0].message, "boom");
}

#[test]
fn panicking_factory_is_a_violation() {
	let model = ProgrammingModel::builder()
		.register(Exploding, Precedence::ANNOTATION)
		.register(Fixed { name: "ok", max: 4 }, Precedence::CONVENTION)
		.build();
	let class = traversed(&model, order());
	let processed = model.process_class(&class);
	let holder = &processed.properties[0];
	assert!(!holder.has(FacetKind::TypicalLength));
	assert_eq!(holder.max_length(), Some(4));
	assert_eq!(processed.violations.len(), 1);
	let violation = &processed.violations[0];
	assert_eq!(violation.source, ViolationSource::Factory("exploding"));
	assert!(violation.message.starts_with("panicked: index out of bounds"));
}

#[test]
fn factories_only_see_declared_kinds() {
	let model = ProgrammingModel::builder()
		.register(Fixed { name: "p", max: 4 }, Precedence::CONVENTION)
		.build();
	let desc = ClassDescriptor::builder("Order")
		.method(MethodDescriptor::new("place", TypeRef::Void))
		.build();
	let class = traversed(&model, desc);
	let processed = model.process_class(&class);
	assert!(processed.class.is_empty());
	assert!(processed.actions[0].0.is_empty());
}

mod builtin {
	use pretty_assertions::assert_eq;

	use super::*;

	fn model() -> ProgrammingModel {
		ProgrammingModel::builtin(&MetamodelConfig::default())
	}

	fn find_property<'a>(
		class: &TraversedClass,
		processed: &'a ProcessedClass,
		name: &str,
	) -> &'a crate::facet::FacetHolder {
		let index = class
			.properties
			.iter()
			.position(|p| &*p.name == name)
			.unwrap();
		&processed.properties[index]
	}

	#[test]
	fn registers_in_ordinal_order() {
		let names: Vec<_> = model().factory_names().collect();
		assert_eq!(names.first(), Some(&"accessors"));
		let annotations = names.iter().position(|n| *n == "annotations").unwrap();
		let hide = names.iter().position(|n| *n == "hide-method").unwrap();
		assert!(annotations < hide);
		assert!(!names.contains(&"max-length-convention"));
	}

	#[test]
	fn toggles_filter_factories() {
		let config = MetamodelConfig::from_toml_str(
			"[factories]\nsupporting_methods = false\nconvention_max_length = 10",
		)
		.unwrap();
		let model = ProgrammingModel::builtin(&config);
		let names: Vec<_> = model.factory_names().collect();
		assert!(names.contains(&"max-length-convention"));
		assert!(!names.contains(&"hide-method"));
		assert!(!model.reserved_names().is_reserved("hideTotal"));
	}

	#[test]
	fn annotation_beats_convention() {
		let config =
			MetamodelConfig::from_toml_str("[factories]\nconvention_max_length = 10").unwrap();
		let model = ProgrammingModel::builtin(&config);
		let desc = ClassDescriptor::builder("Order")
			.method(
				MethodDescriptor::new("getTotal", TypeRef::text())
					.annotate(Annotation::MaxLength(6)),
			)
			.setter("total", TypeRef::text())
			.getter("note", TypeRef::text())
			.build();
		let class = traversed(&model, desc);
		let processed = model.process_class(&class);
		assert_eq!(find_property(&class, &processed, "total").max_length(), Some(6));
		assert_eq!(find_property(&class, &processed, "note").max_length(), Some(10));
		assert!(find_property(&class, &processed, "note").has(FacetKind::Disabled));
		assert!(!find_property(&class, &processed, "total").has(FacetKind::Disabled));
	}

	#[test]
	fn supporting_methods_bind_by_name() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.property("total", TypeRef::text())
			.method(MethodDescriptor::new("hideTotal", TypeRef::bool()))
			.method(
				MethodDescriptor::new("validateTotal", TypeRef::text())
					.param(ParamDescriptor::new("v", TypeRef::text())),
			)
			.method(
				MethodDescriptor::new("place", TypeRef::Void)
					.param(ParamDescriptor::new("qty", TypeRef::int())),
			)
			.method(MethodDescriptor::new(
				"choices0Place",
				TypeRef::collection_of(TypeRef::int()),
			))
			.method(MethodDescriptor::new("title", TypeRef::text()))
			.build();
		let class = traversed(&model, desc);
		assert_eq!(class.actions.len(), 1);
		let processed = model.process_class(&class);
		assert!(processed.violations.is_empty(), "{:?}", processed.violations);
		let total = find_property(&class, &processed, "total");
		assert!(total.has(FacetKind::HideMethod));
		assert!(total.has(FacetKind::ValidateMethod));
		assert!(processed.actions[0].1[0].has(FacetKind::ChoicesMethod));
		assert!(processed.class.has(FacetKind::Title));
	}

	#[test]
	fn wrong_signature_is_a_violation() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.property("total", TypeRef::text())
			.method(MethodDescriptor::new("hideTotal", TypeRef::text()))
			.build();
		let class = traversed(&model, desc);
		let processed = model.process_class(&class);
		assert_eq!(processed.violations.len(), 1);
		let violation = &processed.violations[0];
		assert_eq!(violation.source, ViolationSource::Factory("hide-method"));
		assert!(violation.message.contains("hideTotal"));
		assert!(!find_property(&class, &processed, "total").has(FacetKind::HideMethod));
	}

	#[test]
	fn orphaned_supporting_method_is_reported() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.property("total", TypeRef::text())
			.method(MethodDescriptor::new("hideTotl", TypeRef::bool()))
			.build();
		let class = traversed(&model, desc);
		assert!(class.actions.is_empty());
		let processed = model.process_class(&class);
		assert_eq!(processed.violations.len(), 1);
		assert_eq!(processed.violations[0].source, ViolationSource::Orphan);
		assert!(processed.violations[0].message.contains("hideTotl"));
	}

	#[test]
	fn exclusive_kinds_are_reported() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.property("total", TypeRef::text())
			.method(MethodDescriptor::new(
				"choicesTotal",
				TypeRef::collection_of(TypeRef::text()),
			))
			.method(
				MethodDescriptor::new("autoCompleteTotal", TypeRef::collection_of(TypeRef::text()))
					.param(ParamDescriptor::new("search", TypeRef::text())),
			)
			.build();
		let class = traversed(&model, desc);
		let processed = model.process_class(&class);
		assert_eq!(processed.violations.len(), 1);
		assert_eq!(processed.violations[0].source, ViolationSource::Exclusivity);
	}

	#[test]
	fn misplaced_annotation_is_a_violation() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.method(
				MethodDescriptor::new("place", TypeRef::Void).annotate(Annotation::MaxLength(3)),
			)
			.build();
		let class = traversed(&model, desc);
		let processed = model.process_class(&class);
		assert_eq!(processed.violations.len(), 1);
		assert_eq!(
			processed.violations[0].source,
			ViolationSource::Factory("annotations")
		);
	}

	#[test]
	fn required_roles_merge() {
		let model = model();
		let desc = ClassDescriptor::builder("Order")
			.method(
				MethodDescriptor::new("getTotal", TypeRef::text())
					.annotate(Annotation::RequiresRole(vec!["clerk".into()]))
					.annotate(Annotation::RequiresRole(vec!["admin".into(), "clerk".into()])),
			)
			.build();
		let class = traversed(&model, desc);
		let processed = model.process_class(&class);
		let Some(Facet::HiddenForRoles { roles }) =
			processed.properties[0].get(FacetKind::HiddenForRoles)
		else {
			panic!("expected role facet");
		};
		let roles: Vec<&str> = roles.iter().map(|r| &**r).collect();
		assert_eq!(roles, ["admin", "clerk"]);
	}
}
