//! Class substitution.
//!
//! # Role
//!
//! Persistence enhancers and proxy layers wrap domain classes in generated
//! subclasses. The substitutor maps such a runtime class back to the logical
//! domain class so introspection never sees enhancer-injected members.
//!
//! # Invariants
//!
//! - `normalize` is a fixpoint: normalizing a logical class returns it unchanged.
//!   - Enforced in: [`ClassSubstitutor::normalize`] (only unmarked classes are returned).
//!   - Tested by: `tests::normalize_is_idempotent`.
//! - `normalize` terminates: a revisited class is reported as [`SubstitutionError::Cycle`].

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::config::SubstitutionConfig;
use crate::error::SubstitutionError;
use crate::ident::ClassId;
use crate::introspect::{ClassCatalog, ClassDescriptor};

/// Predicate identifying an enhancement or proxy class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhancementMarker {
	ImplementsInterface(Arc<str>),
	/// Class package starts with this prefix.
	InPackage(Arc<str>),
	NameContains(Arc<str>),
}

impl EnhancementMarker {
	pub fn matches(&self, desc: &ClassDescriptor) -> bool {
		match self {
			Self::ImplementsInterface(iface) => desc.implements(iface),
			Self::InPackage(prefix) => {
				!desc.package.is_empty() && desc.package.starts_with(&**prefix)
			}
			Self::NameContains(fragment) => desc.name.contains(&**fragment),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct ClassSubstitutor {
	markers: Vec<EnhancementMarker>,
}

impl ClassSubstitutor {
	pub fn new(markers: Vec<EnhancementMarker>) -> Self {
		Self { markers }
	}

	pub fn from_config(config: &SubstitutionConfig) -> Self {
		let interfaces = config
			.marker_interfaces
			.iter()
			.map(|s| EnhancementMarker::ImplementsInterface(Arc::from(s.as_str())));
		let packages = config
			.package_prefixes
			.iter()
			.map(|s| EnhancementMarker::InPackage(Arc::from(s.as_str())));
		let fragments = config
			.name_fragments
			.iter()
			.map(|s| EnhancementMarker::NameContains(Arc::from(s.as_str())));
		Self::new(interfaces.chain(packages).chain(fragments).collect())
	}

	pub fn markers(&self) -> &[EnhancementMarker] {
		&self.markers
	}

	pub fn is_enhanced(&self, desc: &ClassDescriptor) -> bool {
		self.markers.iter().any(|m| m.matches(desc))
	}

	/// Maps a runtime class name to its logical domain class.
	pub fn normalize(
		&self,
		catalog: &ClassCatalog,
		raw: &str,
	) -> Result<ClassId, SubstitutionError> {
		let mut chain: Vec<Arc<str>> = Vec::new();
		let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
		let mut current = catalog
			.get(raw)
			.ok_or_else(|| SubstitutionError::UnknownClass(Arc::from(raw)))?;

		loop {
			if !seen.insert(current.name.clone()) {
				chain.push(current.name.clone());
				return Err(SubstitutionError::Cycle { chain });
			}
			chain.push(current.name.clone());

			if !self.is_enhanced(current) {
				if chain.len() > 1 {
					tracing::trace!(
						domain = "substitute",
						raw,
						logical = &*current.name,
						"substituted enhanced class",
					);
				}
				return Ok(ClassId::new(current.name.clone()));
			}

			let superclass =
				current
					.superclass
					.as_ref()
					.ok_or_else(|| SubstitutionError::MissingSuperclass {
						class: current.name.clone(),
					})?;
			current = catalog
				.get(superclass)
				.ok_or_else(|| SubstitutionError::UnknownClass(superclass.clone()))?;
		}
	}
}
