//! Structural conventions: accessors, value encodings, inferred defaults.

use crate::config::{FactoryToggles, MetamodelConfig};
use crate::error::FactoryError;
use crate::facet::{Facet, Optionality, Precedence};
use crate::factory::{FacetFactory, FacetFactoryReg, Feature, ProcessContext, always};
use crate::ident::FeatureKinds;
use crate::introspect::{TypeRef, ValueType, When};

/// Binds each feature to the method that implements it, records value
/// encodings, and marks value holders mandatory.
struct Accessors;

impl FacetFactory for Accessors {
	fn name(&self) -> &'static str {
		"accessors"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::MEMBERS | FeatureKinds::ACTION_PARAMETER
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		match cx.feature() {
			Feature::Property { property, .. } => {
				cx.add(Facet::PropertyAccessor {
					method: property.getter.name.clone(),
				});
				if let Some(setter) = &property.setter {
					cx.add(Facet::PropertySetter {
						method: setter.name.clone(),
					});
				}
				value_holder(cx, &property.ty);
			}
			Feature::Collection { collection, .. } => cx.add(Facet::CollectionAccessor {
				method: collection.getter.name.clone(),
			}),
			Feature::Action { action, .. } => cx.add(Facet::ActionInvocation {
				method: action.method.name.clone(),
				returns: action.method.returns.clone(),
			}),
			Feature::Parameter { param, .. } => value_holder(cx, &param.ty),
			Feature::Class { .. } => {}
		}
		Ok(())
	}
}

fn value_holder(cx: &mut ProcessContext<'_>, ty: &TypeRef) {
	if let Some(value_type) = ty.value_type() {
		cx.add(Facet::ValueEncoding(value_type));
	}
	cx.add(Facet::Mandatory(Optionality::Mandatory));
}

/// Default maximum length for text-valued properties and parameters.
struct MaxLengthConvention {
	max: u32,
}

impl FacetFactory for MaxLengthConvention {
	fn name(&self) -> &'static str {
		"max-length-convention"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::VALUE_HOLDERS
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		let is_text = cx
			.feature()
			.value_type()
			.and_then(TypeRef::value_type)
			.is_some_and(|ty| ty == ValueType::Text);
		if is_text {
			cx.add(Facet::MaxLength(self.max));
		}
		Ok(())
	}
}

/// A property with no setter is derived and cannot be edited.
struct DisabledWithoutSetter;

impl FacetFactory for DisabledWithoutSetter {
	fn name(&self) -> &'static str {
		"disabled-without-setter"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::PROPERTY
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		if let Feature::Property { property, .. } = cx.feature()
			&& property.setter.is_none()
		{
			cx.add(Facet::Disabled {
				when: When::Always,
				reason: Some("derived".into()),
			});
		}
		Ok(())
	}
}

fn make_accessors(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(Accessors)
}

fn max_length_enabled(toggles: &FactoryToggles) -> bool {
	toggles.convention_max_length.is_some()
}

fn make_max_length(config: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(MaxLengthConvention {
		max: config.factories.convention_max_length.unwrap_or(u32::MAX),
	})
}

fn disabled_without_setter_enabled(toggles: &FactoryToggles) -> bool {
	toggles.infer_disabled_from_missing_setter
}

fn make_disabled_without_setter(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(DisabledWithoutSetter)
}

inventory::submit!(FacetFactoryReg {
	name: "accessors",
	ordinal: 0,
	precedence: Precedence::CONVENTION,
	enabled: always,
	make: make_accessors,
});

inventory::submit!(FacetFactoryReg {
	name: "max-length-convention",
	ordinal: 10,
	precedence: Precedence::CONVENTION,
	enabled: max_length_enabled,
	make: make_max_length,
});

inventory::submit!(FacetFactoryReg {
	name: "disabled-without-setter",
	ordinal: 11,
	precedence: Precedence::INFERRED,
	enabled: disabled_without_setter_enabled,
	make: make_disabled_without_setter,
});
