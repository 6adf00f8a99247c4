//! Validity: is a proposed value or argument list acceptable.
//!
//! Unlike visibility and usability, every objection is collected. The order is
//! stable: encoding, mandatory, max length, pattern, then the custom
//! `validate*` supporting method.

use super::{InteractionContext, Veto, VetoKind, objects};
use crate::facet::{Facet, FacetHolder, FacetKind, Optionality};
use crate::introspect::Value;
use crate::spec::ObjectMember;

/// Objections to assigning `value` to a property. Empty means valid.
pub fn validate_property(
	member: &ObjectMember,
	cx: &InteractionContext<'_>,
	value: &Value,
) -> Vec<Veto> {
	let mut vetoes = Vec::new();
	value_rules(member.holder(), value, &mut vetoes);
	custom_rule(member.holder(), cx, std::slice::from_ref(value), &mut vetoes);
	log_objections(&vetoes);
	vetoes
}

/// Objections to invoking an action with `args`. Empty means valid.
///
/// A wrong argument count is the only objection reported; parameter rules
/// cannot be matched up without it.
pub fn validate_arguments(
	action: &ObjectMember,
	cx: &InteractionContext<'_>,
	args: &[Value],
) -> Vec<Veto> {
	let params = action.params();
	if args.len() != params.len() {
		return vec![Veto::new(
			VetoKind::Invalid,
			action.identifier(),
			format!("expected {} arguments, got {}", params.len(), args.len()),
		)];
	}
	let mut vetoes = Vec::new();
	for (param, arg) in params.iter().zip(args) {
		value_rules(param.holder(), arg, &mut vetoes);
		custom_rule(param.holder(), cx, std::slice::from_ref(arg), &mut vetoes);
	}
	custom_rule(action.holder(), cx, args, &mut vetoes);
	log_objections(&vetoes);
	vetoes
}

fn value_rules(holder: &FacetHolder, value: &Value, out: &mut Vec<Veto>) {
	let feature = holder.feature();
	let mut object = |reason: String| out.push(Veto::new(VetoKind::Invalid, feature, reason));

	if let Some(Facet::ValueEncoding(ty)) = holder.get(FacetKind::ValueEncoding)
		&& !value.is_null()
		&& !value.conforms_to(*ty)
	{
		object(format!("expected {ty}, got {}", value.type_name()));
	}
	if let Some(Facet::Mandatory(Optionality::Mandatory)) = holder.get(FacetKind::Mandatory)
		&& value.is_null()
	{
		object("required".to_owned());
	}
	if let (Some(max), Value::Text(text)) = (holder.max_length(), value)
		&& text.chars().count() > max as usize
	{
		object(format!("exceeds maximum length of {max}"));
	}
	if let (Some(Facet::RegEx { pattern }), Value::Text(text)) =
		(holder.get(FacetKind::RegEx), value)
		&& !pattern.is_match(text)
	{
		object(format!("does not match pattern {}", pattern.as_str()));
	}
}

fn custom_rule(
	holder: &FacetHolder,
	cx: &InteractionContext<'_>,
	args: &[Value],
	out: &mut Vec<Veto>,
) {
	if let Some(Facet::ValidateMethod { method }) = holder.get(FacetKind::ValidateMethod) {
		out.extend(objects(cx, VetoKind::Invalid, holder.feature(), method, args));
	}
}

fn log_objections(vetoes: &[Veto]) {
	for veto in vetoes {
		tracing::trace!(domain = "interaction", %veto, "invalid");
	}
}
