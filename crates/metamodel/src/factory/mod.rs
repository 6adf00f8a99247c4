//! Facet factories and the programming model.
//!
//! # Role
//!
//! A [`FacetFactory`] inspects one feature (through a [`ProcessContext`]) and
//! contributes facets to it. The [`ProgrammingModel`] is the frozen, ordered
//! set of factories with their [`Precedence`], indexed by [`FeatureKind`] so
//! processing a feature only visits factories that declared that kind.
//!
//! # Registration
//!
//! Builtin factories are submitted with `inventory::submit!` as
//! [`FacetFactoryReg`] entries. [`ProgrammingModel::builtin`] collects them,
//! orders them by `ordinal` (then name), drops the ones switched off in
//! [`FactoryToggles`], and instantiates the rest. Applications layer their own
//! factories on top through [`ProgrammingModel::builtin_builder`].
//!
//! # Invariants
//!
//! - The factory table is immutable after [`ProgrammingModelBuilder::build`].
//! - Factories for one feature run in registration order.
//!   - Tested by: `tests::registration_order_breaks_ties`.
//! - The resulting facet set does not depend on registration order unless two
//!   contributions share a precedence.
//!   - Tested by: `tests::precedence_decides_regardless_of_order`.

mod builtins;
mod processor;

use std::fmt;

pub use processor::{Feature, ProcessContext, ProcessedClass, ProcessedFeature};

use crate::config::{FactoryToggles, MetamodelConfig};
use crate::error::FactoryError;
use crate::facet::Precedence;
use crate::ident::{FeatureKind, FeatureKinds};
use crate::traverse::ReservedNames;

/// Contributes facets to the features it applies to.
pub trait FacetFactory: Send + Sync + 'static {
	/// Stable name, used as the facet origin in diagnostics.
	fn name(&self) -> &'static str;

	/// Feature kinds this factory is invoked for.
	fn feature_kinds(&self) -> FeatureKinds;

	/// Method name prefixes this factory consumes as supporting methods
	/// (`"hide"` claims `hideTotal`, `hide0Place`, ...).
	fn supporting_prefixes(&self) -> &'static [&'static str] {
		&[]
	}

	/// Exact method names this factory consumes (`"title"`).
	fn supporting_names(&self) -> &'static [&'static str] {
		&[]
	}

	/// Inspects `cx.feature()` and contributes facets through `cx`.
	///
	/// Returning an error discards everything contributed during this call.
	fn process(&self, cx: &mut ProcessContext<'_>) -> Result<(), FactoryError>;
}

/// Inventory entry for a builtin factory.
pub struct FacetFactoryReg {
	pub name: &'static str,
	/// Registration position among builtins; lower runs first.
	pub ordinal: u16,
	pub precedence: Precedence,
	pub enabled: fn(&FactoryToggles) -> bool,
	pub make: fn(&MetamodelConfig) -> Box<dyn FacetFactory>,
}

inventory::collect!(FacetFactoryReg);

/// Always-on toggle for [`FacetFactoryReg::enabled`].
pub(crate) fn always(_: &FactoryToggles) -> bool {
	true
}

struct Registered {
	factory: Box<dyn FacetFactory>,
	precedence: Precedence,
}

/// Frozen set of facet factories.
pub struct ProgrammingModel {
	factories: Vec<Registered>,
	by_kind: [Vec<usize>; FeatureKind::ALL.len()],
	reserved: ReservedNames,
}

impl ProgrammingModel {
	pub fn builder() -> ProgrammingModelBuilder {
		ProgrammingModelBuilder::default()
	}

	/// The builtin factories enabled by `config`.
	pub fn builtin(config: &MetamodelConfig) -> Self {
		Self::builtin_builder(config).build()
	}

	/// A builder pre-loaded with the builtin factories enabled by `config`.
	pub fn builtin_builder(config: &MetamodelConfig) -> ProgrammingModelBuilder {
		let mut regs: Vec<&FacetFactoryReg> = inventory::iter::<FacetFactoryReg>
			.into_iter()
			.filter(|reg| (reg.enabled)(&config.factories))
			.collect();
		regs.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.name.cmp(b.name)));

		let mut builder = Self::builder();
		for reg in regs {
			tracing::trace!(
				domain = "factory",
				factory = reg.name,
				ordinal = reg.ordinal,
				precedence = %reg.precedence,
				"registering builtin"
			);
			builder.push((reg.make)(config), reg.precedence);
		}
		builder
	}

	pub fn len(&self) -> usize {
		self.factories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}

	/// Factory names in registration order.
	pub fn factory_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.factories.iter().map(|r| r.factory.name())
	}

	/// Names the traverser must not turn into actions.
	pub fn reserved_names(&self) -> &ReservedNames {
		&self.reserved
	}

	fn factories_for(&self, kind: FeatureKind) -> impl Iterator<Item = &Registered> + '_ {
		self.by_kind[kind.index()]
			.iter()
			.map(move |&i| &self.factories[i])
	}
}

impl fmt::Debug for ProgrammingModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProgrammingModel")
			.field("factories", &self.factory_names().collect::<Vec<_>>())
			.field("reserved", &self.reserved)
			.finish()
	}
}

#[derive(Default)]
pub struct ProgrammingModelBuilder {
	factories: Vec<Registered>,
}

impl ProgrammingModelBuilder {
	pub fn register(mut self, factory: impl FacetFactory, precedence: Precedence) -> Self {
		self.push(Box::new(factory), precedence);
		self
	}

	fn push(&mut self, factory: Box<dyn FacetFactory>, precedence: Precedence) {
		self.factories.push(Registered {
			factory,
			precedence,
		});
	}

	pub fn build(self) -> ProgrammingModel {
		let mut by_kind: [Vec<usize>; FeatureKind::ALL.len()] = Default::default();
		let mut prefixes = Vec::new();
		let mut exact = Vec::new();
		for (i, reg) in self.factories.iter().enumerate() {
			let kinds = reg.factory.feature_kinds();
			for kind in FeatureKind::ALL {
				if kinds.applies_to(kind) {
					by_kind[kind.index()].push(i);
				}
			}
			prefixes.extend_from_slice(reg.factory.supporting_prefixes());
			exact.extend_from_slice(reg.factory.supporting_names());
		}
		ProgrammingModel {
			factories: self.factories,
			by_kind,
			reserved: ReservedNames::new(prefixes, exact),
		}
	}
}

#[cfg(test)]
mod tests;
