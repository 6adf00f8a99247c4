//! Structural descriptions of domain classes.
//!
//! Descriptors are the read-only oracle the traverser and the facet factories
//! inspect. They are normally produced once by the application (by hand, by a
//! build step, or by a derive) and registered in a [`ClassCatalog`].
//!
//! [`ClassCatalog`]: crate::introspect::ClassCatalog

use std::fmt;
use std::sync::Arc;

use super::annotation::Annotation;

/// Scalar value types understood by the value-encoding facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	Text,
	Int,
	Float,
	Bool,
	/// ISO-8601 calendar date, `YYYY-MM-DD`.
	Date,
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Text => "text",
			Self::Int => "int",
			Self::Float => "float",
			Self::Bool => "bool",
			Self::Date => "date",
		};
		f.write_str(s)
	}
}

/// Declared type of a method return or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	Void,
	Value(ValueType),
	/// Reference to another domain class, by runtime name.
	Class(Arc<str>),
	Collection(Box<TypeRef>),
}

impl TypeRef {
	pub fn text() -> Self {
		Self::Value(ValueType::Text)
	}

	pub fn int() -> Self {
		Self::Value(ValueType::Int)
	}

	pub fn bool() -> Self {
		Self::Value(ValueType::Bool)
	}

	pub fn class(name: impl Into<Arc<str>>) -> Self {
		Self::Class(name.into())
	}

	pub fn collection_of(element: TypeRef) -> Self {
		Self::Collection(Box::new(element))
	}

	pub fn is_void(&self) -> bool {
		matches!(self, Self::Void)
	}

	pub fn is_collection(&self) -> bool {
		matches!(self, Self::Collection(_))
	}

	pub fn value_type(&self) -> Option<ValueType> {
		match self {
			Self::Value(v) => Some(*v),
			_ => None,
		}
	}

	/// The domain class this type refers to, looking through collections.
	pub fn referenced_class(&self) -> Option<&Arc<str>> {
		match self {
			Self::Class(name) => Some(name),
			Self::Collection(inner) => inner.referenced_class(),
			_ => None,
		}
	}
}

impl fmt::Display for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Void => f.write_str("void"),
			Self::Value(v) => write!(f, "{v}"),
			Self::Class(name) => f.write_str(name),
			Self::Collection(inner) => write!(f, "[{inner}]"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
	pub name: Arc<str>,
	pub ty: TypeRef,
	pub annotations: Vec<Annotation>,
}

impl ParamDescriptor {
	pub fn new(name: impl Into<Arc<str>>, ty: TypeRef) -> Self {
		Self {
			name: name.into(),
			ty,
			annotations: Vec::new(),
		}
	}

	pub fn annotate(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
	pub name: Arc<str>,
	/// Position in source declaration order.
	pub decl_index: u32,
	pub params: Vec<ParamDescriptor>,
	pub returns: TypeRef,
	pub annotations: Vec<Annotation>,
	pub is_static: bool,
	/// Injected by tooling rather than written by the application.
	pub is_synthetic: bool,
}

impl MethodDescriptor {
	pub fn new(name: impl Into<Arc<str>>, returns: TypeRef) -> Self {
		Self {
			name: name.into(),
			decl_index: 0,
			params: Vec::new(),
			returns,
			annotations: Vec::new(),
			is_static: false,
			is_synthetic: false,
		}
	}

	pub fn param(mut self, param: ParamDescriptor) -> Self {
		self.params.push(param);
		self
	}

	pub fn annotate(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	pub fn static_method(mut self) -> Self {
		self.is_static = true;
		self
	}

	pub fn synthetic(mut self) -> Self {
		self.is_synthetic = true;
		self
	}

	pub fn param_types(&self) -> impl Iterator<Item = &TypeRef> {
		self.params.iter().map(|p| &p.ty)
	}

	pub fn has_annotation(&self, pred: impl Fn(&Annotation) -> bool) -> bool {
		self.annotations.iter().any(pred)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
	pub name: Arc<str>,
	pub superclass: Option<Arc<str>>,
	pub interfaces: Vec<Arc<str>>,
	pub package: Arc<str>,
	pub annotations: Vec<Annotation>,
	pub methods: Vec<MethodDescriptor>,
	pub is_abstract: bool,
}

impl ClassDescriptor {
	pub fn builder(name: impl Into<Arc<str>>) -> ClassDescriptorBuilder {
		ClassDescriptorBuilder {
			desc: ClassDescriptor {
				name: name.into(),
				superclass: None,
				interfaces: Vec::new(),
				package: Arc::from(""),
				annotations: Vec::new(),
				methods: Vec::new(),
				is_abstract: false,
			},
		}
	}

	pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
		self.methods.iter().find(|m| &*m.name == name)
	}

	pub fn implements(&self, interface: &str) -> bool {
		self.interfaces.iter().any(|i| &**i == interface)
	}
}

/// Builder assigning declaration indices in call order.
#[derive(Debug, Clone)]
pub struct ClassDescriptorBuilder {
	desc: ClassDescriptor,
}

impl ClassDescriptorBuilder {
	pub fn extends(mut self, superclass: impl Into<Arc<str>>) -> Self {
		self.desc.superclass = Some(superclass.into());
		self
	}

	pub fn implements(mut self, interface: impl Into<Arc<str>>) -> Self {
		self.desc.interfaces.push(interface.into());
		self
	}

	pub fn package(mut self, package: impl Into<Arc<str>>) -> Self {
		self.desc.package = package.into();
		self
	}

	pub fn annotate(mut self, annotation: Annotation) -> Self {
		self.desc.annotations.push(annotation);
		self
	}

	pub fn abstract_class(mut self) -> Self {
		self.desc.is_abstract = true;
		self
	}

	pub fn method(mut self, mut method: MethodDescriptor) -> Self {
		method.decl_index = self.desc.methods.len() as u32;
		self.desc.methods.push(method);
		self
	}

	/// Shorthand for a `get{Name}` accessor.
	pub fn getter(self, property: &str, ty: TypeRef) -> Self {
		self.method(MethodDescriptor::new(accessor_name("get", property), ty))
	}

	/// Shorthand for a `set{Name}` mutator.
	pub fn setter(self, property: &str, ty: TypeRef) -> Self {
		self.method(
			MethodDescriptor::new(accessor_name("set", property), TypeRef::Void)
				.param(ParamDescriptor::new(property, ty)),
		)
	}

	/// Shorthand for a getter/setter pair.
	pub fn property(self, property: &str, ty: TypeRef) -> Self {
		self.getter(property, ty.clone()).setter(property, ty)
	}

	pub fn build(self) -> ClassDescriptor {
		self.desc
	}
}

/// Joins a prefix and a member name: `("hide", "total")` gives `hideTotal`.
pub fn accessor_name(prefix: &str, member: &str) -> String {
	let mut out = String::with_capacity(prefix.len() + member.len());
	out.push_str(prefix);
	let mut chars = member.chars();
	if let Some(first) = chars.next() {
		out.extend(first.to_uppercase());
		out.push_str(chars.as_str());
	}
	out
}

/// Lowercases the first character: `Total` gives `total`.
pub fn decapitalize(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).collect(),
		None => String::new(),
	}
}
