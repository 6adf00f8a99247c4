//! Reflective type metadata.
//!
//! # Role
//!
//! Rust has no runtime reflection, so the metamodel reads class structure from
//! explicit descriptors. The [`ClassCatalog`] is the read-only oracle every
//! other component consults; [`DomainObject`] is the live instance the
//! interaction evaluators consult at request time.

mod annotation;
mod catalog;
mod descriptor;
mod object;

pub use annotation::{Annotation, Semantics, When, Where};
pub(crate) use catalog::suggest;
pub use catalog::{ClassCatalog, ClassCatalogBuilder};
pub use descriptor::{
	ClassDescriptor, ClassDescriptorBuilder, MethodDescriptor, ParamDescriptor, TypeRef,
	ValueType, accessor_name, decapitalize,
};
pub use object::{DomainObject, InvokeError, Lifecycle, Value};
