//! Visibility: may the caller see a member at all.

use super::{Consent, InteractionContext, Veto, VetoKind, hides};
use crate::facet::{Facet, FacetHolder, FacetKind};
use crate::spec::{ObjectMember, ObjectSpecification};

/// Class-level visibility: the `hidden()` supporting method only.
pub fn is_class_visible(spec: &ObjectSpecification, cx: &InteractionContext<'_>) -> Consent {
	class_veto(spec.holder(), cx).into()
}

/// Evaluates, in order, the class `HiddenObject`, member `Hidden`,
/// `HiddenForRoles` and `HideMethod` facets. The first objection wins.
pub fn is_visible(
	spec: &ObjectSpecification,
	member: &ObjectMember,
	cx: &InteractionContext<'_>,
) -> Consent {
	let consent: Consent = class_veto(spec.holder(), cx)
		.or_else(|| member_veto(member.holder(), cx))
		.into();
	if let Consent::Vetoed(veto) = &consent {
		tracing::trace!(domain = "interaction", %veto, "member hidden");
	}
	consent
}

fn class_veto(holder: &FacetHolder, cx: &InteractionContext<'_>) -> Option<Veto> {
	match holder.get(FacetKind::HiddenObject)? {
		Facet::HiddenObject { method } => hides(cx, holder.feature(), method),
		_ => None,
	}
}

fn member_veto(holder: &FacetHolder, cx: &InteractionContext<'_>) -> Option<Veto> {
	let feature = holder.feature();
	if let Some(Facet::Hidden { location }) = holder.get(FacetKind::Hidden)
		&& location.includes(cx.location)
	{
		return Some(Veto::new(VetoKind::Hidden, feature, "hidden"));
	}
	if let Some(Facet::HiddenForRoles { roles }) = holder.get(FacetKind::HiddenForRoles)
		&& !roles.iter().any(|role| cx.caller.has_role(role))
	{
		let required = roles.iter().map(|r| &**r).collect::<Vec<_>>().join(", ");
		return Some(Veto::new(
			VetoKind::Hidden,
			feature,
			format!("requires role {required}"),
		));
	}
	match holder.get(FacetKind::HideMethod) {
		Some(Facet::HideMethod { method }) => hides(cx, feature, method),
		_ => None,
	}
}
