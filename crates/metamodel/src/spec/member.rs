use std::sync::Arc;

use crate::facet::{FacetHolder, FacetKind};
use crate::ident::{FeatureIdentifier, FeatureKind};
use crate::introspect::TypeRef;

/// A property, collection or action of an [`ObjectSpecification`].
///
/// [`ObjectSpecification`]: super::ObjectSpecification
#[derive(Debug)]
pub struct ObjectMember {
	pub(super) identifier: FeatureIdentifier,
	pub(super) name: Arc<str>,
	pub(super) holder: FacetHolder,
	pub(super) value_type: TypeRef,
	pub(super) params: Box<[ObjectActionParameter]>,
}

impl ObjectMember {
	pub fn identifier(&self) -> &FeatureIdentifier {
		&self.identifier
	}

	pub fn kind(&self) -> FeatureKind {
		self.identifier.kind()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// `Named` facet if present, otherwise the member name.
	pub fn display_name(&self) -> &str {
		self.holder.named().unwrap_or(&*self.name)
	}

	pub fn holder(&self) -> &FacetHolder {
		&self.holder
	}

	pub fn has_facet(&self, kind: FacetKind) -> bool {
		self.holder.has(kind)
	}

	/// Property type, collection element type, or action return type.
	///
	/// Class references stay unresolved; resolve them through the loader.
	pub fn value_type(&self) -> &TypeRef {
		&self.value_type
	}

	/// Action parameters; empty for properties and collections.
	pub fn params(&self) -> &[ObjectActionParameter] {
		&self.params
	}

	pub fn param(&self, index: usize) -> Option<&ObjectActionParameter> {
		self.params.get(index)
	}

	pub fn is_property(&self) -> bool {
		self.kind() == FeatureKind::Property
	}

	pub fn is_collection(&self) -> bool {
		self.kind() == FeatureKind::Collection
	}

	pub fn is_action(&self) -> bool {
		self.kind() == FeatureKind::Action
	}
}

#[derive(Debug)]
pub struct ObjectActionParameter {
	pub(super) identifier: FeatureIdentifier,
	pub(super) index: u16,
	pub(super) name: Arc<str>,
	pub(super) ty: TypeRef,
	pub(super) holder: FacetHolder,
}

impl ObjectActionParameter {
	pub fn identifier(&self) -> &FeatureIdentifier {
		&self.identifier
	}

	pub fn index(&self) -> u16 {
		self.index
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn display_name(&self) -> &str {
		self.holder.named().unwrap_or(&*self.name)
	}

	pub fn ty(&self) -> &TypeRef {
		&self.ty
	}

	pub fn holder(&self) -> &FacetHolder {
		&self.holder
	}
}
