//! Builtin facet factories.
//!
//! | Ordinal | Factory | Precedence | Toggle |
//! |---------|---------|------------|--------|
//! | 0 | `accessors` | convention | always |
//! | 10 | `max-length-convention` | convention | `convention_max_length` |
//! | 11 | `disabled-without-setter` | inferred | `infer_disabled_from_missing_setter` |
//! | 20 | `annotations` | annotation | always |
//! | 21 | `regex` | annotation | `regex_validation` |
//! | 22 | `required-roles` | annotation | `role_based_hiding` |
//! | 30.. | supporting-method factories | supporting-method | `supporting_methods` |

mod annotations;
mod conventions;
mod supporting;

use crate::error::FactoryError;
use crate::ident::{FeatureKind, FeatureKinds};
use crate::introspect::Annotation;

/// Rejects `annotation` on feature kinds outside `allowed`.
fn require_kind(
	annotation: &Annotation,
	kind: FeatureKind,
	allowed: FeatureKinds,
) -> Result<(), FactoryError> {
	if allowed.applies_to(kind) {
		Ok(())
	} else {
		Err(FactoryError::Annotation {
			annotation: annotation.name(),
			message: format!("not applicable to a {kind}"),
		})
	}
}
