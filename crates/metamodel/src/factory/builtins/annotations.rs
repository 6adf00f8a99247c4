//! Facets declared with annotations.

use std::sync::Arc;

use regex::RegexBuilder;

use super::require_kind;
use crate::config::{FactoryToggles, MetamodelConfig};
use crate::error::FactoryError;
use crate::facet::{Facet, Optionality, Precedence};
use crate::factory::{FacetFactory, FacetFactoryReg, ProcessContext, always};
use crate::ident::FeatureKinds;
use crate::introspect::Annotation;

/// Maps plain declarative annotations one-to-one onto facets.
struct Annotations;

impl FacetFactory for Annotations {
	fn name(&self) -> &'static str {
		"annotations"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::all()
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		let feature = cx.feature();
		let kind = feature.kind();
		for annotation in feature.annotations() {
			let facet = match annotation {
				Annotation::Hidden(location) => {
					require_kind(annotation, kind, FeatureKinds::MEMBERS)?;
					Facet::Hidden {
						location: *location,
					}
				}
				Annotation::Disabled { when, reason } => {
					require_kind(annotation, kind, FeatureKinds::MEMBERS)?;
					Facet::Disabled {
						when: *when,
						reason: reason.as_deref().map(Arc::from),
					}
				}
				Annotation::MaxLength(max) => {
					require_kind(annotation, kind, FeatureKinds::VALUE_HOLDERS)?;
					if *max == 0 {
						return Err(FactoryError::Annotation {
							annotation: annotation.name(),
							message: "maximum length must be at least 1".to_string(),
						});
					}
					Facet::MaxLength(*max)
				}
				Annotation::Optional => {
					require_kind(annotation, kind, FeatureKinds::VALUE_HOLDERS)?;
					Facet::Mandatory(Optionality::Optional)
				}
				Annotation::Mandatory => {
					require_kind(annotation, kind, FeatureKinds::VALUE_HOLDERS)?;
					Facet::Mandatory(Optionality::Mandatory)
				}
				Annotation::Named(name) => Facet::Named(Arc::from(name.as_str())),
				Annotation::DescribedAs(text) => Facet::DescribedAs(Arc::from(text.as_str())),
				Annotation::Plural(plural) => {
					require_kind(annotation, kind, FeatureKinds::CLASS | FeatureKinds::COLLECTION)?;
					Facet::Plural(Arc::from(plural.as_str()))
				}
				Annotation::MemberOrder(sequence) => {
					require_kind(annotation, kind, FeatureKinds::MEMBERS)?;
					if !is_dewey(sequence) {
						return Err(FactoryError::Annotation {
							annotation: annotation.name(),
							message: format!("'{sequence}' is not a dotted sequence like 1.2.3"),
						});
					}
					Facet::MemberOrder {
						sequence: Arc::from(sequence.as_str()),
					}
				}
				Annotation::TypicalLength(len) => {
					require_kind(annotation, kind, FeatureKinds::VALUE_HOLDERS)?;
					Facet::TypicalLength(*len)
				}
				Annotation::MultiLine(lines) => {
					require_kind(annotation, kind, FeatureKinds::VALUE_HOLDERS)?;
					Facet::MultiLine { lines: *lines }
				}
				Annotation::Immutable => {
					require_kind(annotation, kind, FeatureKinds::CLASS)?;
					Facet::Immutable { reason: None }
				}
				Annotation::ActionSemantics(semantics) => {
					require_kind(annotation, kind, FeatureKinds::ACTION)?;
					Facet::ActionSemantics(*semantics)
				}
				Annotation::RegEx { .. }
				| Annotation::RequiresRole(_)
				| Annotation::Programmatic => continue,
			};
			cx.add(facet);
		}
		Ok(())
	}
}

/// `1`, `1.2`, `10.3.1`: non-empty dot-separated decimal components.
pub(crate) fn is_dewey(sequence: &str) -> bool {
	!sequence.is_empty()
		&& sequence
			.split('.')
			.all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Compiles `RegEx` annotations on text value holders.
struct RegexPatterns;

impl FacetFactory for RegexPatterns {
	fn name(&self) -> &'static str {
		"regex"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::VALUE_HOLDERS
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		for annotation in cx.feature().annotations() {
			let Annotation::RegEx {
				pattern,
				case_insensitive,
			} = annotation
			else {
				continue;
			};
			let compiled = RegexBuilder::new(&anchored(pattern))
				.case_insensitive(*case_insensitive)
				.build()
				.map_err(|err| FactoryError::Annotation {
					annotation: annotation.name(),
					message: err.to_string(),
				})?;
			cx.add(Facet::RegEx { pattern: compiled });
		}
		Ok(())
	}
}

/// Whole-value match, the way pattern annotations are conventionally read.
fn anchored(pattern: &str) -> String {
	format!("^(?:{pattern})$")
}

/// Hides members from callers lacking every listed role.
struct RequiredRoles;

impl FacetFactory for RequiredRoles {
	fn name(&self) -> &'static str {
		"required-roles"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::MEMBERS
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		let mut roles: Vec<Arc<str>> = Vec::new();
		for annotation in cx.feature().annotations() {
			if let Annotation::RequiresRole(listed) = annotation {
				if listed.is_empty() {
					return Err(FactoryError::Annotation {
						annotation: annotation.name(),
						message: "at least one role is required".to_string(),
					});
				}
				roles.extend(listed.iter().map(|r| Arc::from(r.as_str())));
			}
		}
		if !roles.is_empty() {
			roles.sort();
			roles.dedup();
			cx.add(Facet::HiddenForRoles {
				roles: roles.into(),
			});
		}
		Ok(())
	}
}

fn make_annotations(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(Annotations)
}

fn regex_enabled(toggles: &FactoryToggles) -> bool {
	toggles.regex_validation
}

fn make_regex(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(RegexPatterns)
}

fn roles_enabled(toggles: &FactoryToggles) -> bool {
	toggles.role_based_hiding
}

fn make_roles(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(RequiredRoles)
}

inventory::submit!(FacetFactoryReg {
	name: "annotations",
	ordinal: 20,
	precedence: Precedence::ANNOTATION,
	enabled: always,
	make: make_annotations,
});

inventory::submit!(FacetFactoryReg {
	name: "regex",
	ordinal: 21,
	precedence: Precedence::ANNOTATION,
	enabled: regex_enabled,
	make: make_regex,
});

inventory::submit!(FacetFactoryReg {
	name: "required-roles",
	ordinal: 22,
	precedence: Precedence::ANNOTATION,
	enabled: roles_enabled,
	make: make_roles,
});
