//! Feature enumeration.
//!
//! # Role
//!
//! Turns a logical class descriptor (the output of substitution) into the
//! ordered list of introspectable features: the class itself, its properties,
//! collections and actions, and each action's parameters.
//!
//! # Invariants
//!
//! - Ordering is a pure function of the descriptors: superclass members first,
//!   then declaration index, then name.
//!   - Tested by: `tests::deterministic_order`.
//! - Supporting methods (`hideTotal`, `choices0Place`, ...) are never actions.
//!   - Enforced in: [`ReservedNames::is_reserved`].
//! - Static, synthetic and `Programmatic` methods are never features.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Violation, ViolationSource};
use crate::ident::{ClassId, FeatureIdentifier, FeatureKind};
use crate::introspect::{
	Annotation, ClassCatalog, ClassDescriptor, MethodDescriptor, TypeRef, decapitalize,
};

/// Names claimed by facet factories as supporting methods.
#[derive(Debug, Clone, Default)]
pub struct ReservedNames {
	prefixes: Vec<&'static str>,
	exact: Vec<&'static str>,
}

impl ReservedNames {
	pub fn new(prefixes: Vec<&'static str>, exact: Vec<&'static str>) -> Self {
		let mut names = Self { prefixes, exact };
		names.prefixes.sort_unstable();
		names.prefixes.dedup();
		names.exact.sort_unstable();
		names.exact.dedup();
		names
	}

	/// True if `name` is an exact reserved name, or a reserved prefix followed by
	/// an uppercase letter or a digit (`hideTotal`, `choices0Place`, not `hideous`).
	pub fn is_reserved(&self, name: &str) -> bool {
		if self.exact.iter().any(|e| *e == name) {
			return true;
		}
		self.prefixes.iter().any(|p| {
			name.strip_prefix(p)
				.and_then(|rest| rest.chars().next())
				.is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
		})
	}

	pub fn prefixes(&self) -> &[&'static str] {
		&self.prefixes
	}
}

#[derive(Debug, Clone)]
pub struct PropertyFeature {
	pub name: Arc<str>,
	pub getter: MethodDescriptor,
	pub setter: Option<MethodDescriptor>,
	pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct CollectionFeature {
	pub name: Arc<str>,
	pub getter: MethodDescriptor,
	pub element: TypeRef,
}

#[derive(Debug, Clone)]
pub struct ActionFeature {
	pub name: Arc<str>,
	pub method: MethodDescriptor,
}

/// Output of [`traverse`].
#[derive(Debug, Clone)]
pub struct TraversedClass {
	pub id: ClassId,
	pub descriptor: Arc<ClassDescriptor>,
	/// Effective methods, inherited ones included, in traversal order.
	pub methods: Vec<MethodDescriptor>,
	pub properties: Vec<PropertyFeature>,
	pub collections: Vec<CollectionFeature>,
	pub actions: Vec<ActionFeature>,
	pub violations: Vec<Violation>,
}

impl TraversedClass {
	pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
		self.methods.iter().find(|m| &*m.name == name)
	}

	/// Feature identifiers in traversal order.
	pub fn feature_identifiers(&self) -> Vec<FeatureIdentifier> {
		let mut out = vec![FeatureIdentifier::class(self.id.clone())];
		out.extend(self.properties.iter().map(|p| {
			FeatureIdentifier::member(self.id.clone(), FeatureKind::Property, p.name.clone())
		}));
		out.extend(self.collections.iter().map(|c| {
			FeatureIdentifier::member(self.id.clone(), FeatureKind::Collection, c.name.clone())
		}));
		for action in &self.actions {
			out.push(FeatureIdentifier::member(
				self.id.clone(),
				FeatureKind::Action,
				action.name.clone(),
			));
			for index in 0..action.method.params.len() {
				out.push(FeatureIdentifier::parameter(
					self.id.clone(),
					action.name.clone(),
					index as u16,
				));
			}
		}
		out
	}
}

/// Enumerates the features of `descriptor`, a logical (already substituted) class.
pub fn traverse(
	catalog: &ClassCatalog,
	descriptor: &Arc<ClassDescriptor>,
	reserved: &ReservedNames,
) -> TraversedClass {
	let id = ClassId::new(descriptor.name.clone());
	let mut violations = Vec::new();
	let methods = effective_methods(catalog, descriptor, &id, &mut violations);

	let mut properties: Vec<PropertyFeature> = Vec::new();
	let mut collections: Vec<CollectionFeature> = Vec::new();
	let mut member_names: FxHashSet<Arc<str>> = FxHashSet::default();
	let mut claimed: FxHashSet<Arc<str>> = FxHashSet::default();

	for m in methods.iter().filter(|m| m.params.is_empty()) {
		let Some(name) = accessor_property_name(m) else {
			continue;
		};
		if reserved.is_reserved(&m.name) {
			continue;
		}
		claimed.insert(m.name.clone());
		if !member_names.insert(name.clone()) {
			violations.push(Violation::new(
				FeatureIdentifier::class(id.clone()),
				ViolationSource::Introspection,
				format!("accessor {} duplicates member {name}", m.name),
			));
			continue;
		}
		match &m.returns {
			TypeRef::Collection(element) => collections.push(CollectionFeature {
				name,
				getter: m.clone(),
				element: (**element).clone(),
			}),
			ty => properties.push(PropertyFeature {
				name,
				getter: m.clone(),
				setter: None,
				ty: ty.clone(),
			}),
		}
	}

	for m in &methods {
		let Some(name) = setter_property_name(m) else {
			continue;
		};
		if let Some(property) = properties.iter_mut().find(|p| p.name == name) {
			claimed.insert(m.name.clone());
			if m.params[0].ty == property.ty {
				property.setter = Some(m.clone());
			} else {
				violations.push(Violation::new(
					FeatureIdentifier::member(id.clone(), FeatureKind::Property, name),
					ViolationSource::Introspection,
					format!(
						"setter {} takes {} but getter returns {}",
						m.name, m.params[0].ty, property.ty
					),
				));
			}
		} else if collections.iter().any(|c| c.name == name) {
			claimed.insert(m.name.clone());
			violations.push(Violation::new(
				FeatureIdentifier::member(id.clone(), FeatureKind::Collection, name),
				ViolationSource::Introspection,
				format!("collections may not have a setter ({})", m.name),
			));
		}
	}

	let mut actions: Vec<ActionFeature> = Vec::new();
	for m in &methods {
		if claimed.contains(&m.name) || reserved.is_reserved(&m.name) {
			continue;
		}
		if !member_names.insert(m.name.clone()) {
			violations.push(Violation::new(
				FeatureIdentifier::member(id.clone(), FeatureKind::Action, m.name.clone()),
				ViolationSource::Introspection,
				"overloaded or clashing action name; only the first declaration is used",
			));
			continue;
		}
		actions.push(ActionFeature {
			name: m.name.clone(),
			method: m.clone(),
		});
	}

	TraversedClass {
		id,
		descriptor: descriptor.clone(),
		methods,
		properties,
		collections,
		actions,
		violations,
	}
}

/// Collects introspectable methods from the class and its catalog superclasses.
fn effective_methods(
	catalog: &ClassCatalog,
	descriptor: &Arc<ClassDescriptor>,
	id: &ClassId,
	violations: &mut Vec<Violation>,
) -> Vec<MethodDescriptor> {
	let mut lineage: Vec<&Arc<ClassDescriptor>> = vec![descriptor];
	let mut seen: FxHashSet<&str> = FxHashSet::default();
	seen.insert(&descriptor.name);
	let mut current = descriptor;
	while let Some(parent) = current.superclass.as_deref().and_then(|s| catalog.get(s)) {
		if !seen.insert(&parent.name) {
			violations.push(Violation::new(
				FeatureIdentifier::class(id.clone()),
				ViolationSource::Introspection,
				format!("cyclic superclass chain at {}", parent.name),
			));
			break;
		}
		lineage.push(parent);
		current = parent;
	}

	// Subclass declarations shadow inherited ones; inherited members come first.
	let mut by_name: FxHashMap<Arc<str>, (usize, &MethodDescriptor)> = FxHashMap::default();
	for (depth_from_leaf, class) in lineage.iter().enumerate() {
		let depth_from_root = lineage.len() - 1 - depth_from_leaf;
		for m in class.methods.iter().filter(|m| is_introspectable(m)) {
			by_name
				.entry(m.name.clone())
				.or_insert((depth_from_root, m));
		}
	}

	let mut ordered: Vec<(usize, &MethodDescriptor)> = by_name.into_values().collect();
	ordered.sort_by(|(da, a), (db, b)| {
		da.cmp(db)
			.then_with(|| a.decl_index.cmp(&b.decl_index))
			.then_with(|| a.name.cmp(&b.name))
	});
	ordered.into_iter().map(|(_, m)| m.clone()).collect()
}

fn is_introspectable(m: &MethodDescriptor) -> bool {
	!m.is_static
		&& !m.is_synthetic
		&& !m.has_annotation(|a| matches!(a, Annotation::Programmatic))
}

/// `getTotal` / `isPaid` (bool) with no parameters gives the property name.
fn accessor_property_name(m: &MethodDescriptor) -> Option<Arc<str>> {
	if m.returns.is_void() {
		return None;
	}
	let suffix = strip_accessor_prefix(&m.name, "get").or_else(|| {
		matches!(m.returns, TypeRef::Value(crate::introspect::ValueType::Bool))
			.then(|| strip_accessor_prefix(&m.name, "is"))
			.flatten()
	})?;
	Some(Arc::from(decapitalize(suffix)))
}

fn setter_property_name(m: &MethodDescriptor) -> Option<Arc<str>> {
	if m.params.len() != 1 || !m.returns.is_void() {
		return None;
	}
	strip_accessor_prefix(&m.name, "set").map(|s| Arc::from(decapitalize(s)))
}

fn strip_accessor_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
	let rest = name.strip_prefix(prefix)?;
	rest.chars()
		.next()
		.is_some_and(char::is_uppercase)
		.then_some(rest)
}
