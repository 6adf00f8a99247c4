use ferrule_metamodel::interaction::{is_usable, is_visible, validate_property};
use ferrule_metamodel::{
	CallerContext, Consent, DomainObject, Facet, FacetKind, InteractionContext, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{Target, init_tracing, order_loader};

fn accept_all() -> Target {
	Target::default().on("validateTotal", |_| Ok(Value::Null))
}

#[test]
fn annotated_max_length_overrides_convention() {
	init_tracing();
	let loader = order_loader();
	let order = loader.specification_for("Order").unwrap();
	let total = order.lookup_member("total").unwrap();

	assert!(matches!(total.holder().get(FacetKind::MaxLength), Some(Facet::MaxLength(6))));
	let collision = order
		.collisions()
		.iter()
		.find(|c| c.kind == FacetKind::MaxLength && c.feature == *total.identifier())
		.expect("convention and annotation collide on total");
	assert!(collision.incoming.precedence > collision.existing.precedence);

	let caller = CallerContext::new("clerk");
	let target = accept_all();
	let cx = InteractionContext::new(&caller, &target);
	let vetoes = validate_property(total, &cx, &Value::text("12345678"));
	let reasons: Vec<_> = vetoes.iter().map(|v| v.reason.as_str()).collect();
	assert_eq!(reasons, ["exceeds maximum length of 6"]);
}

#[test]
fn two_independent_objections_are_both_reported() {
	init_tracing();
	let loader = order_loader();
	let order = loader.specification_for("Order").unwrap();
	let total = order.lookup_member("total").unwrap();

	let caller = CallerContext::new("clerk");
	let target = Target::default().on("validateTotal", |args| {
		Ok(match args.first().and_then(Value::as_str) {
			Some(s) if s.contains('-') => Value::text("must not be negative"),
			_ => Value::Null,
		})
	});
	let cx = InteractionContext::new(&caller, &target);
	let vetoes = validate_property(total, &cx, &Value::text("-1234567"));
	let reasons: Vec<_> = vetoes.iter().map(|v| v.reason.as_str()).collect();
	assert_eq!(reasons, ["exceeds maximum length of 6", "must not be negative"]);
	assert_eq!(target.calls(), ["validateTotal"]);
}

#[test]
fn plain_members_are_visible_and_usable() {
	init_tracing();
	let loader = order_loader();
	let order = loader.specification_for("Order").unwrap();
	let caller = CallerContext::new("clerk");
	let target = accept_all();
	let cx = InteractionContext::new(&caller, &target);

	let total = order.lookup_member("total").unwrap();
	let consent = is_visible(&order, total, &cx);
	assert_eq!(consent, Consent::Allowed);
	assert_eq!(consent.reason(), None);
	assert!(is_usable(&order, total, &cx).is_allowed());

	let lines = order.lookup_member("lines").unwrap();
	assert!(is_visible(&order, lines, &cx).is_allowed());
	assert!(is_usable(&order, lines, &cx).is_allowed());
}

#[test]
fn enhanced_runtime_class_resolves_to_its_domain_class() {
	init_tracing();
	let loader = order_loader();
	let target = accept_all();
	let via_proxy = loader.specification_for(target.class_name()).unwrap();
	let direct = loader.specification_for("Order").unwrap();
	assert!(std::sync::Arc::ptr_eq(&via_proxy, &direct));
	assert_eq!(loader.stats().builds, 3);
}

#[test]
fn boot_validation_of_the_whole_catalog() {
	init_tracing();
	let report = order_loader().validate_catalog();
	assert!(report.is_ok(), "{report}");
	assert_eq!(report.checked(), 4);
}
