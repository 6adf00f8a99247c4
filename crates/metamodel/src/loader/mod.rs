//! Specification loader.
//!
//! # Role
//!
//! The single entry point for obtaining [`ObjectSpecification`]s. Each logical
//! class is built at most once per generation (compute-if-absent) and then
//! shared as an `Arc`. Building substitutes the runtime class, traverses its
//! features, runs the programming model, and checks that every class its
//! members refer to resolves. Members hold those classes as [`TypeRef`]s that
//! are looked up on demand ([`SpecificationLoader::specification_for_type`]);
//! with eager references enabled the referenced classes are built right away.
//!
//! # Invariants
//!
//! - Repeated lookups within one generation return the identical `Arc`.
//!   - Enforced in: `Generation::claim` (ready slots are returned as-is).
//!   - Tested by: `invariants::test_idempotent_lookup`.
//! - Concurrent first lookups of one class build it exactly once.
//!   - Tested by: `invariants::test_concurrent_build_once`.
//! - Cyclic references terminate: eager nested builds never wait on a class
//!   that is under construction.
//!   - Enforced in: `Generation::try_claim`.
//!   - Tested by: `invariants::test_cycle_terminates`.
//! - Without eager references, a lookup builds only the requested class.
//!   - Tested by: `invariants::test_lazy_references_build_on_demand`.
//! - A build that fails or panics leaves no placeholder behind.
//!   - Enforced in: `BuildGuard::drop`.
//!   - Tested by: `invariants::test_panicking_build_is_retried`.
//! - A panicking factory becomes a violation on the class being built and
//!   never unwinds into the lookup.
//!   - Enforced in: `ProgrammingModel::process`.
//!   - Tested by: `invariants::test_panicking_factory_is_contained`.
//! - After [`SpecificationLoader::invalidate_all`] returns, lookups build fresh
//!   specifications.
//!   - Tested by: `invariants::test_invalidation_yields_new_identity`.
//!
//! # Concurrency
//!
//! The current `Generation` sits behind an [`ArcSwap`]. Invalidation swaps
//! in an empty generation; builds already running finish into the generation
//! they started in, and their callers receive that result.

mod generation;
#[cfg(test)]
mod invariants;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;

use self::generation::{BuildGuard, Claim, Generation};
use crate::config::MetamodelConfig;
use crate::error::{LoadError, SubstitutionError, Violation, ViolationSource};
use crate::factory::ProgrammingModel;
use crate::ident::{ClassId, FeatureIdentifier, FeatureKind};
use crate::introspect::{ClassCatalog, TypeRef};
use crate::spec::ObjectSpecification;
use crate::substitute::ClassSubstitutor;
use crate::traverse::{TraversedClass, traverse};

/// Loader counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderStats {
	/// Specifications built since the loader was created.
	pub builds: u64,
	/// Current generation.
	pub epoch: u64,
	/// Specifications cached in the current generation.
	pub cached: usize,
}

pub struct SpecificationLoader {
	catalog: Arc<ClassCatalog>,
	substitutor: ClassSubstitutor,
	current: ArcSwap<Generation>,
	epochs: AtomicU64,
	builds: AtomicU64,
	eager_references: bool,
}

impl SpecificationLoader {
	pub fn new(
		catalog: Arc<ClassCatalog>,
		model: ProgrammingModel,
		substitutor: ClassSubstitutor,
	) -> Self {
		Self {
			catalog,
			substitutor,
			current: ArcSwap::from_pointee(Generation::new(0, Arc::new(model))),
			epochs: AtomicU64::new(0),
			builds: AtomicU64::new(0),
			eager_references: false,
		}
	}

	/// Loader with the builtin programming model, substitution markers and
	/// loader settings from `config`.
	pub fn from_config(catalog: Arc<ClassCatalog>, config: &MetamodelConfig) -> Self {
		Self::new(
			catalog,
			ProgrammingModel::builtin(config),
			ClassSubstitutor::from_config(&config.substitution),
		)
		.with_eager_references(config.loader.eager_references)
	}

	/// Whether building a class also builds the classes it refers to.
	pub fn with_eager_references(mut self, eager: bool) -> Self {
		self.eager_references = eager;
		self
	}

	pub fn catalog(&self) -> &Arc<ClassCatalog> {
		&self.catalog
	}

	pub fn substitutor(&self) -> &ClassSubstitutor {
		&self.substitutor
	}

	/// The programming model of the current generation.
	pub fn model(&self) -> Arc<ProgrammingModel> {
		self.current.load().model.clone()
	}

	/// Returns the specification for the runtime class `raw`, building it if needed.
	///
	/// A specification with violations is returned inside [`LoadError::Invalid`].
	pub fn specification_for(&self, raw: &str) -> Result<Arc<ObjectSpecification>, LoadError> {
		let id = self.logical_id(raw)?;
		let generation = self.current.load_full();
		let spec = match generation.claim(&id) {
			Claim::Ready(spec) => spec,
			Claim::Reentrant => return Err(LoadError::UnderConstruction(id)),
			Claim::Build(guard) => self.build(&generation, guard)?,
		};
		if spec.is_valid() {
			Ok(spec)
		} else {
			Err(LoadError::Invalid { spec })
		}
	}

	/// Resolves the domain class a member type refers to.
	pub fn specification_for_type(
		&self,
		ty: &TypeRef,
	) -> Result<Arc<ObjectSpecification>, LoadError> {
		let class = ty
			.referenced_class()
			.ok_or_else(|| LoadError::NotAClass(ty.to_string()))?;
		self.specification_for(class)
	}

	/// Returns the cached specification without building.
	pub fn cached(&self, raw: &str) -> Option<Arc<ObjectSpecification>> {
		let id = self.substitutor.normalize(&self.catalog, raw).ok()?;
		self.current.load().get(&id)
	}

	/// Discards every cached specification.
	pub fn invalidate_all(&self) {
		let model = self.current.load().model.clone();
		self.swap_generation(model);
	}

	/// Installs a new programming model and discards every cached specification.
	pub fn replace_model(&self, model: ProgrammingModel) {
		self.swap_generation(Arc::new(model));
	}

	pub fn stats(&self) -> LoaderStats {
		let generation = self.current.load();
		LoaderStats {
			builds: self.builds.load(Ordering::Relaxed),
			epoch: generation.epoch,
			cached: generation.ready_count(),
		}
	}

	fn swap_generation(&self, model: Arc<ProgrammingModel>) {
		let epoch = self.epochs.fetch_add(1, Ordering::AcqRel) + 1;
		let previous = self.current.swap(Arc::new(Generation::new(epoch, model)));
		tracing::info!(
			domain = "loader",
			epoch,
			discarded = previous.ready_count(),
			"invalidated specification cache"
		);
	}

	pub(crate) fn logical_id(&self, raw: &str) -> Result<ClassId, LoadError> {
		self.substitutor
			.normalize(&self.catalog, raw)
			.map_err(|err| match err {
				SubstitutionError::UnknownClass(name) => LoadError::UnknownClass {
					suggestion: self.catalog.suggest(&name),
					name,
				},
				other => LoadError::Substitution(other),
			})
	}

	fn build(
		&self,
		generation: &Generation,
		guard: BuildGuard<'_>,
	) -> Result<Arc<ObjectSpecification>, LoadError> {
		let id = guard.id().clone();
		let descriptor = self
			.catalog
			.get(id.as_str())
			.ok_or_else(|| LoadError::UnknownClass {
				name: id.as_arc().clone(),
				suggestion: None,
			})?;

		let class = traverse(&self.catalog, descriptor, generation.model.reserved_names());
		let mut processed = generation.model.process_class(&class);
		processed
			.violations
			.extend(self.ensure_references(generation, &class));

		let spec = Arc::new(ObjectSpecification::assemble(
			class,
			processed,
			generation.epoch,
		));
		self.builds.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(
			domain = "loader",
			class = %id,
			epoch = generation.epoch,
			members = spec.members().len(),
			"built specification"
		);
		if !spec.is_valid() {
			for violation in spec.violations() {
				tracing::warn!(domain = "loader", %violation, "metamodel violation");
			}
		}
		guard.publish(spec.clone());
		Ok(spec)
	}

	/// Resolves the classes `class` refers to; unresolvable ones are returned as
	/// violations. With eager references, also builds them without waiting on
	/// any build in progress.
	fn ensure_references(&self, generation: &Generation, class: &TraversedClass) -> Vec<Violation> {
		let mut violations = Vec::new();
		let mut visited: FxHashSet<ClassId> = FxHashSet::default();
		for (feature, name) in references(class) {
			let target = match self.substitutor.normalize(&self.catalog, &name) {
				Ok(target) => target,
				Err(err) => {
					violations.push(Violation::new(
						feature,
						ViolationSource::Reference,
						err.to_string(),
					));
					continue;
				}
			};
			if !self.eager_references || !visited.insert(target.clone()) {
				continue;
			}
			let Some(guard) = generation.try_claim(&target) else {
				continue;
			};
			if let Err(err) = self.build(generation, guard) {
				tracing::debug!(
					domain = "loader",
					class = %target,
					error = %err,
					"referenced class failed to build"
				);
			}
		}
		violations
	}
}

/// Class names referenced by member types, with the referring feature.
fn references(class: &TraversedClass) -> Vec<(FeatureIdentifier, Arc<str>)> {
	let id = &class.id;
	let mut out = Vec::new();
	let mut push = |feature: FeatureIdentifier, ty: &TypeRef| {
		if let Some(name) = ty.referenced_class() {
			out.push((feature, name.clone()));
		}
	};
	for p in &class.properties {
		push(
			FeatureIdentifier::member(id.clone(), FeatureKind::Property, p.name.clone()),
			&p.ty,
		);
	}
	for c in &class.collections {
		push(
			FeatureIdentifier::member(id.clone(), FeatureKind::Collection, c.name.clone()),
			&c.element,
		);
	}
	for a in &class.actions {
		push(
			FeatureIdentifier::member(id.clone(), FeatureKind::Action, a.name.clone()),
			&a.method.returns,
		);
		for (index, param) in a.method.params.iter().enumerate() {
			push(
				FeatureIdentifier::parameter(id.clone(), a.name.clone(), index as u16),
				&param.ty,
			);
		}
	}
	out
}

impl fmt::Debug for SpecificationLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SpecificationLoader")
			.field("classes", &self.catalog.len())
			.field("stats", &self.stats())
			.finish()
	}
}
