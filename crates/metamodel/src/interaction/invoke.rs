//! Gated interactions: read, modify and invoke through the metamodel.
//!
//! Each operation checks visibility, then usability, then validity, and only
//! then calls the domain method. The first gate to refuse decides the error.

use super::{InteractionContext, is_usable, is_visible, validate_arguments, validate_property};
use crate::error::InteractionError;
use crate::facet::{Facet, FacetKind};
use crate::ident::FeatureIdentifier;
use crate::introspect::Value;
use crate::spec::{ObjectMember, ObjectSpecification};

/// Reads a property or collection through its accessor.
pub fn read_property(
	spec: &ObjectSpecification,
	name: &str,
	cx: &InteractionContext<'_>,
) -> Result<Value, InteractionError> {
	let member = lookup(spec, name)?;
	let method = match member.holder().get(accessor_kind(member)?) {
		Some(Facet::PropertyAccessor { method } | Facet::CollectionAccessor { method }) => {
			method.clone()
		}
		_ => return Err(InteractionError::NotAProperty(member.identifier().clone())),
	};
	is_visible(spec, member, cx)
		.into_result()
		.map_err(InteractionError::Vetoed)?;
	call(cx, member.identifier(), &method, &[])
}

/// Assigns `value` to a property through its setter.
pub fn modify_property(
	spec: &ObjectSpecification,
	name: &str,
	cx: &InteractionContext<'_>,
	value: Value,
) -> Result<(), InteractionError> {
	let member = lookup(spec, name)?;
	if !member.is_property() {
		return Err(InteractionError::NotAProperty(member.identifier().clone()));
	}
	let Some(Facet::PropertySetter { method }) = member.holder().get(FacetKind::PropertySetter)
	else {
		return Err(InteractionError::ReadOnly(member.identifier().clone()));
	};
	gate(spec, member, cx)?;
	let vetoes = validate_property(member, cx, &value);
	if !vetoes.is_empty() {
		return Err(InteractionError::Invalid(vetoes));
	}
	call(cx, member.identifier(), method, std::slice::from_ref(&value))?;
	tracing::debug!(domain = "interaction", feature = %member.identifier(), "property modified");
	Ok(())
}

/// Invokes an action with `args` and returns its result.
pub fn invoke_action(
	spec: &ObjectSpecification,
	name: &str,
	cx: &InteractionContext<'_>,
	args: &[Value],
) -> Result<Value, InteractionError> {
	let member = lookup(spec, name)?;
	let Some(Facet::ActionInvocation { method, .. }) =
		member.holder().get(FacetKind::ActionInvocation)
	else {
		return Err(InteractionError::NotAnAction(member.identifier().clone()));
	};
	gate(spec, member, cx)?;
	let vetoes = validate_arguments(member, cx, args);
	if !vetoes.is_empty() {
		return Err(InteractionError::Invalid(vetoes));
	}
	let result = call(cx, member.identifier(), method, args)?;
	tracing::debug!(domain = "interaction", feature = %member.identifier(), "action invoked");
	Ok(result)
}

/// The target's title from its `title()` method, if the class has one.
///
/// A failing or non-text `title()` yields `None`.
pub fn title(spec: &ObjectSpecification, cx: &InteractionContext<'_>) -> Option<String> {
	let Facet::Title { method } = spec.holder().get(FacetKind::Title)? else {
		return None;
	};
	match cx.target.invoke(method, &[]) {
		Ok(Value::Text(title)) => Some(title),
		Ok(other) => {
			tracing::warn!(
				domain = "interaction",
				class = %spec.class_id(),
				got = other.type_name(),
				"title() did not return text"
			);
			None
		}
		Err(err) => {
			tracing::warn!(
				domain = "interaction",
				class = %spec.class_id(),
				error = %err,
				"title() failed"
			);
			None
		}
	}
}

fn lookup<'s>(
	spec: &'s ObjectSpecification,
	name: &str,
) -> Result<&'s ObjectMember, InteractionError> {
	spec.lookup_member(name)
		.ok_or_else(|| InteractionError::NoSuchMember {
			class: spec.class_id().clone(),
			name: name.to_owned(),
			suggestion: spec.suggest_member(name),
		})
}

fn accessor_kind(member: &ObjectMember) -> Result<FacetKind, InteractionError> {
	if member.is_property() {
		Ok(FacetKind::PropertyAccessor)
	} else if member.is_collection() {
		Ok(FacetKind::CollectionAccessor)
	} else {
		Err(InteractionError::NotAProperty(member.identifier().clone()))
	}
}

fn gate(
	spec: &ObjectSpecification,
	member: &ObjectMember,
	cx: &InteractionContext<'_>,
) -> Result<(), InteractionError> {
	is_visible(spec, member, cx)
		.into_result()
		.and_then(|()| is_usable(spec, member, cx).into_result())
		.map_err(InteractionError::Vetoed)
}

fn call(
	cx: &InteractionContext<'_>,
	feature: &FeatureIdentifier,
	method: &str,
	args: &[Value],
) -> Result<Value, InteractionError> {
	cx.target.invoke(method, args).map_err(|source| {
		tracing::warn!(domain = "interaction", %feature, error = %source, "domain method failed");
		InteractionError::Failed {
			feature: feature.clone(),
			source,
		}
	})
}
