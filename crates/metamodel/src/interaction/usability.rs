//! Usability: may the caller edit or invoke a visible member.
//!
//! Callers check visibility first; a hidden member is never asked about here.

use super::{Consent, InteractionContext, Veto, VetoKind, objects};
use crate::facet::{Facet, FacetHolder, FacetKind};
use crate::spec::{ObjectMember, ObjectSpecification};

/// Evaluates, in order, the class `Immutable` (skipped for actions) and
/// `DisabledObject` facets, then member `Disabled` and `DisableMethod`.
pub fn is_usable(
	spec: &ObjectSpecification,
	member: &ObjectMember,
	cx: &InteractionContext<'_>,
) -> Consent {
	let consent: Consent = class_veto(spec.holder(), member, cx)
		.or_else(|| member_veto(member.holder(), cx))
		.into();
	if let Consent::Vetoed(veto) = &consent {
		tracing::trace!(domain = "interaction", %veto, "member disabled");
	}
	consent
}

fn class_veto(
	holder: &FacetHolder,
	member: &ObjectMember,
	cx: &InteractionContext<'_>,
) -> Option<Veto> {
	if !member.is_action()
		&& let Some(Facet::Immutable { reason }) = holder.get(FacetKind::Immutable)
	{
		let reason = reason.as_deref().unwrap_or("immutable");
		return Some(Veto::new(VetoKind::Disabled, member.identifier(), reason));
	}
	match holder.get(FacetKind::DisabledObject)? {
		Facet::DisabledObject { method } => {
			objects(cx, VetoKind::Disabled, member.identifier(), method, &[])
		}
		_ => None,
	}
}

fn member_veto(holder: &FacetHolder, cx: &InteractionContext<'_>) -> Option<Veto> {
	let feature = holder.feature();
	if let Some(Facet::Disabled { when, reason }) = holder.get(FacetKind::Disabled)
		&& when.applies(cx.target.lifecycle())
	{
		let reason = reason.as_deref().unwrap_or("disabled");
		return Some(Veto::new(VetoKind::Disabled, feature, reason));
	}
	match holder.get(FacetKind::DisableMethod) {
		Some(Facet::DisableMethod { method }) => {
			objects(cx, VetoKind::Disabled, feature, method, &[])
		}
		_ => None,
	}
}
