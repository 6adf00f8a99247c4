//! Immutable catalog of class descriptors, keyed by runtime class name.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::descriptor::ClassDescriptor;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Default, Clone)]
pub struct ClassCatalog {
	classes: FxHashMap<Arc<str>, Arc<ClassDescriptor>>,
}

impl ClassCatalog {
	pub fn builder() -> ClassCatalogBuilder {
		ClassCatalogBuilder::default()
	}

	pub fn get(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
		self.classes.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.classes.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Runtime class names in sorted order.
	pub fn names(&self) -> Vec<Arc<str>> {
		let mut names: Vec<_> = self.classes.keys().cloned().collect();
		names.sort();
		names
	}

	/// Closest registered name to `name`, if any is similar enough.
	pub fn suggest(&self, name: &str) -> Option<Arc<str>> {
		suggest(name, self.classes.keys())
	}
}

/// Picks the most similar candidate above [`SUGGESTION_THRESHOLD`].
pub(crate) fn suggest<'a, I>(name: &str, candidates: I) -> Option<Arc<str>>
where
	I: IntoIterator<Item = &'a Arc<str>>,
{
	candidates
		.into_iter()
		.map(|c| (strsim::jaro_winkler(name, c), c))
		.filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
		.max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
		.map(|(_, c)| c.clone())
}

#[derive(Debug, Default)]
pub struct ClassCatalogBuilder {
	classes: FxHashMap<Arc<str>, Arc<ClassDescriptor>>,
}

impl ClassCatalogBuilder {
	/// Adds a descriptor. A later descriptor with the same name replaces the earlier one.
	pub fn add(mut self, desc: ClassDescriptor) -> Self {
		self.insert(desc);
		self
	}

	pub fn insert(&mut self, desc: ClassDescriptor) {
		if self
			.classes
			.insert(desc.name.clone(), Arc::new(desc))
			.is_some()
		{
			tracing::debug!(domain = "catalog", "class descriptor replaced");
		}
	}

	pub fn build(self) -> ClassCatalog {
		ClassCatalog {
			classes: self.classes,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn suggestion_for_typo() {
		let catalog = ClassCatalog::builder()
			.add(ClassDescriptor::builder("Order").build())
			.add(ClassDescriptor::builder("Customer").build())
			.build();
		assert_eq!(catalog.suggest("Ordr").as_deref(), Some("Order"));
		assert_eq!(catalog.suggest("Zebra"), None);
		assert_eq!(catalog.names().len(), 2);
	}
}
