//! Choice provision for properties and action parameters.
//!
//! These return `None` when the holder has no relevant facet. A failing
//! supporting method yields an empty result and a warning; it is never an error.

use super::{InteractionContext, VetoKind, call_supporting, unexpected};
use crate::facet::{Facet, FacetHolder, FacetKind};
use crate::introspect::Value;

/// The full list of admissible values from a `choices*` method.
///
/// # Panics
///
/// If the holder carries both `ChoicesMethod` and `AutoCompleteMethod`. The
/// loader reports that combination as a violation, so reaching it means an
/// invalid specification was used for evaluation.
pub fn choices(holder: &FacetHolder, cx: &InteractionContext<'_>) -> Option<Vec<Value>> {
	assert_exclusive(holder);
	let Facet::ChoicesMethod { method } = holder.get(FacetKind::ChoicesMethod)? else {
		return None;
	};
	Some(list(holder, cx, method, &[]))
}

/// Candidates matching `search` from an `autoComplete*` method.
///
/// Searches shorter than the facet's minimum length return an empty list
/// without calling the domain.
///
/// # Panics
///
/// As [`choices`].
pub fn auto_complete(
	holder: &FacetHolder,
	cx: &InteractionContext<'_>,
	search: &str,
) -> Option<Vec<Value>> {
	assert_exclusive(holder);
	let Facet::AutoCompleteMethod { method, min_length } =
		holder.get(FacetKind::AutoCompleteMethod)?
	else {
		return None;
	};
	if search.chars().count() < usize::from(*min_length) {
		return Some(Vec::new());
	}
	Some(list(holder, cx, method, &[Value::text(search)]))
}

/// The proposed initial value from a `default*` method.
///
/// # Panics
///
/// As [`choices`].
pub fn default_value(holder: &FacetHolder, cx: &InteractionContext<'_>) -> Option<Value> {
	assert_exclusive(holder);
	let Facet::DefaultMethod { method } = holder.get(FacetKind::DefaultMethod)? else {
		return None;
	};
	match call_supporting(cx, VetoKind::Invalid, holder.feature(), method, &[]) {
		Ok(value) => Some(value),
		Err(_) => Some(Value::Null),
	}
}

fn list(
	holder: &FacetHolder,
	cx: &InteractionContext<'_>,
	method: &str,
	args: &[Value],
) -> Vec<Value> {
	match call_supporting(cx, VetoKind::Invalid, holder.feature(), method, args) {
		Ok(Value::List(items)) => items,
		Ok(Value::Null) | Err(_) => Vec::new(),
		Ok(other) => {
			unexpected(VetoKind::Invalid, holder.feature(), method, "list", &other);
			Vec::new()
		}
	}
}

fn assert_exclusive(holder: &FacetHolder) {
	for &(a, b) in FacetKind::exclusive_pairs() {
		assert!(
			!(holder.has(a) && holder.has(b)),
			"{}: {a} and {b} are mutually exclusive; the programming model registered both",
			holder.feature()
		);
	}
}
