//! Supporting-method factories.
//!
//! A supporting method is found by naming convention relative to the feature:
//!
//! | Feature | Example |
//! |---------|---------|
//! | property `total` | `hideTotal`, `validateTotal(v)`, `choicesTotal()` |
//! | action `place` | `hidePlace`, `disablePlace`, `validatePlace(a, b)` |
//! | parameter 0 of `place` | `choices0Place`, `default0Place`, `validate0Place(a)` |
//! | class | `hidden()`, `disabled()`, `title()` |
//!
//! A method that matches by name but has the wrong signature is a factory
//! error, which the processor records as a violation on the feature.

use std::sync::Arc;

use crate::config::{FactoryToggles, MetamodelConfig};
use crate::error::FactoryError;
use crate::facet::{Facet, Precedence};
use crate::factory::{FacetFactory, FacetFactoryReg, Feature, ProcessContext};
use crate::ident::FeatureKinds;
use crate::introspect::{MethodDescriptor, TypeRef, ValueType, accessor_name};

/// Minimum search length for auto-complete methods.
const AUTO_COMPLETE_MIN_LENGTH: u16 = 1;

type Bind = fn(Feature<'_>, &MethodDescriptor) -> Result<Facet, String>;

/// One naming convention bound to one facet kind.
#[derive(Clone, Copy)]
struct SupportingMethod {
	name: &'static str,
	prefix: &'static [&'static str],
	kinds: FeatureKinds,
	bind: Bind,
}

impl FacetFactory for SupportingMethod {
	fn name(&self) -> &'static str {
		self.name
	}

	fn feature_kinds(&self) -> FeatureKinds {
		self.kinds
	}

	fn supporting_prefixes(&self) -> &'static [&'static str] {
		self.prefix
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		let feature = cx.feature();
		let Some(expected) = self
			.prefix
			.first()
			.and_then(|prefix| supporting_name(prefix, feature))
		else {
			return Ok(());
		};
		let Some(method) = cx.supporting_method(&expected) else {
			return Ok(());
		};
		let facet = (self.bind)(feature, method)
			.map_err(|message| FactoryError::supporting_method(&method.name, message))?;
		cx.add(facet);
		Ok(())
	}
}

/// `hideTotal` for members, `choices0Place` for parameters.
fn supporting_name(prefix: &str, feature: Feature<'_>) -> Option<String> {
	match feature {
		Feature::Class { .. } => None,
		Feature::Parameter { action, index, .. } => {
			Some(accessor_name(&format!("{prefix}{index}"), &action.name))
		}
		_ => feature.member_name().map(|name| accessor_name(prefix, name)),
	}
}

fn expect_params<'t>(
	method: &MethodDescriptor,
	expected: impl IntoIterator<Item = &'t TypeRef>,
) -> Result<(), String> {
	let expected: Vec<&TypeRef> = expected.into_iter().collect();
	let actual: Vec<&TypeRef> = method.param_types().collect();
	if expected == actual {
		return Ok(());
	}
	let render = |types: &[&TypeRef]| {
		types
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(", ")
	};
	Err(format!(
		"expected parameters ({}), found ({})",
		render(&expected),
		render(&actual)
	))
}

fn expect_returns(method: &MethodDescriptor, expected: &TypeRef) -> Result<(), String> {
	if &method.returns == expected {
		Ok(())
	} else {
		Err(format!("expected return type {expected}, found {}", method.returns))
	}
}

fn bool_type() -> TypeRef {
	TypeRef::Value(ValueType::Bool)
}

/// Value type of the property or parameter the method supports.
fn held_type<'a>(feature: Feature<'a>) -> Result<&'a TypeRef, String> {
	match feature {
		Feature::Property { property, .. } => Ok(&property.ty),
		Feature::Parameter { param, .. } => Ok(&param.ty),
		_ => Err("only properties and parameters accept values".to_string()),
	}
}

fn bind_hide(_: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	expect_params(method, [])?;
	expect_returns(method, &bool_type())?;
	Ok(Facet::HideMethod {
		method: method.name.clone(),
	})
}

fn bind_disable(_: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	expect_params(method, [])?;
	expect_returns(method, &TypeRef::text())?;
	Ok(Facet::DisableMethod {
		method: method.name.clone(),
	})
}

fn bind_validate(feature: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	match feature {
		Feature::Action { action, .. } => expect_params(method, action.method.param_types())?,
		_ => expect_params(method, [held_type(feature)?])?,
	}
	expect_returns(method, &TypeRef::text())?;
	Ok(Facet::ValidateMethod {
		method: method.name.clone(),
	})
}

fn bind_choices(feature: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	expect_params(method, [])?;
	expect_returns(method, &TypeRef::collection_of(held_type(feature)?.clone()))?;
	Ok(Facet::ChoicesMethod {
		method: method.name.clone(),
	})
}

fn bind_auto_complete(feature: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	expect_params(method, [&TypeRef::text()])?;
	expect_returns(method, &TypeRef::collection_of(held_type(feature)?.clone()))?;
	Ok(Facet::AutoCompleteMethod {
		method: method.name.clone(),
		min_length: AUTO_COMPLETE_MIN_LENGTH,
	})
}

fn bind_default(feature: Feature<'_>, method: &MethodDescriptor) -> Result<Facet, String> {
	expect_params(method, [])?;
	expect_returns(method, held_type(feature)?)?;
	Ok(Facet::DefaultMethod {
		method: method.name.clone(),
	})
}

const HIDE: SupportingMethod = SupportingMethod {
	name: "hide-method",
	prefix: &["hide"],
	kinds: FeatureKinds::MEMBERS,
	bind: bind_hide,
};

const DISABLE: SupportingMethod = SupportingMethod {
	name: "disable-method",
	prefix: &["disable"],
	kinds: FeatureKinds::MEMBERS,
	bind: bind_disable,
};

const VALIDATE: SupportingMethod = SupportingMethod {
	name: "validate-method",
	prefix: &["validate"],
	kinds: FeatureKinds::PROPERTY
		.union(FeatureKinds::ACTION)
		.union(FeatureKinds::ACTION_PARAMETER),
	bind: bind_validate,
};

const CHOICES: SupportingMethod = SupportingMethod {
	name: "choices-method",
	prefix: &["choices"],
	kinds: FeatureKinds::VALUE_HOLDERS,
	bind: bind_choices,
};

const AUTO_COMPLETE: SupportingMethod = SupportingMethod {
	name: "auto-complete-method",
	prefix: &["autoComplete"],
	kinds: FeatureKinds::VALUE_HOLDERS,
	bind: bind_auto_complete,
};

const DEFAULT: SupportingMethod = SupportingMethod {
	name: "default-method",
	prefix: &["default"],
	kinds: FeatureKinds::VALUE_HOLDERS,
	bind: bind_default,
};

/// Class-level `hidden()`, `disabled()` and `title()`.
struct ObjectMethods;

impl FacetFactory for ObjectMethods {
	fn name(&self) -> &'static str {
		"object-methods"
	}

	fn feature_kinds(&self) -> FeatureKinds {
		FeatureKinds::CLASS
	}

	fn supporting_names(&self) -> &'static [&'static str] {
		&["hidden", "disabled", "title"]
	}

	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError> {
		let bool_ty = bool_type();
		let text_ty = TypeRef::text();
		let checks: [(&str, &TypeRef, fn(Arc<str>) -> Facet); 3] = [
			("hidden", &bool_ty, |method| Facet::HiddenObject { method }),
			("disabled", &text_ty, |method| Facet::DisabledObject { method }),
			("title", &text_ty, |method| Facet::Title { method }),
		];
		for (name, returns, make) in checks {
			let Some(method) = cx.supporting_method(name) else {
				continue;
			};
			expect_params(method, [])
				.and_then(|()| expect_returns(method, returns))
				.map_err(|message| FactoryError::supporting_method(&method.name, message))?;
			cx.add(make(method.name.clone()));
		}
		Ok(())
	}
}

fn supporting_enabled(toggles: &FactoryToggles) -> bool {
	toggles.supporting_methods
}

macro_rules! supporting_factory {
	($make:ident, $ordinal:expr, $factory:expr) => {
		fn $make(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
			Box::new($factory)
		}

		inventory::submit!(FacetFactoryReg {
			name: $factory.name,
			ordinal: $ordinal,
			precedence: Precedence::SUPPORTING_METHOD,
			enabled: supporting_enabled,
			make: $make,
		});
	};
}

supporting_factory!(make_hide, 30, HIDE);
supporting_factory!(make_disable, 31, DISABLE);
supporting_factory!(make_validate, 32, VALIDATE);
supporting_factory!(make_choices, 33, CHOICES);
supporting_factory!(make_auto_complete, 34, AUTO_COMPLETE);
supporting_factory!(make_default, 35, DEFAULT);

fn make_object_methods(_: &MetamodelConfig) -> Box<dyn FacetFactory> {
	Box::new(ObjectMethods)
}

inventory::submit!(FacetFactoryReg {
	name: "object-methods",
	ordinal: 36,
	precedence: Precedence::SUPPORTING_METHOD,
	enabled: supporting_enabled,
	make: make_object_methods,
});
