//! Common fixtures for metamodel integration tests.

use std::sync::Arc;

use ferrule_metamodel::{
	Annotation, ClassCatalog, ClassDescriptor, DomainObject, InvokeError, MetamodelConfig,
	MethodDescriptor, ParamDescriptor, SpecificationLoader, TypeRef, Value,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// `Order` -> `Customer` -> `Order` cycle plus an `Order` -> `Line` edge.
pub fn order_catalog() -> Arc<ClassCatalog> {
	Arc::new(
		ClassCatalog::builder()
			.add(
				ClassDescriptor::builder("Order")
					.method(
						MethodDescriptor::new("getTotal", TypeRef::text())
							.annotate(Annotation::MaxLength(6)),
					)
					.setter("total", TypeRef::text())
					.method(
						MethodDescriptor::new("validateTotal", TypeRef::text())
							.param(ParamDescriptor::new("total", TypeRef::text())),
					)
					.property("customer", TypeRef::class("Customer"))
					.getter("lines", TypeRef::collection_of(TypeRef::class("Line")))
					.build(),
			)
			.add(
				ClassDescriptor::builder("Customer")
					.property("name", TypeRef::text())
					.getter("orders", TypeRef::collection_of(TypeRef::class("Order")))
					.build(),
			)
			.add(
				ClassDescriptor::builder("Line")
					.property("quantity", TypeRef::int())
					.build(),
			)
			.add(
				ClassDescriptor::builder("Order$$EnhancerByCGLIB$$1f2e")
					.extends("Order")
					.build(),
			)
			.build(),
	)
}

/// Loader with a ten-character convention maximum for text values that builds
/// referenced classes eagerly.
pub fn order_loader() -> SpecificationLoader {
	let config = MetamodelConfig::from_toml_str(
		r#"
[factories]
convention_max_length = 10

[substitution]
name_fragments = ["$$EnhancerByCGLIB$$"]

[loader]
eager_references = true
"#,
	)
	.expect("fixture config parses");
	SpecificationLoader::from_config(order_catalog(), &config)
}

type Handler = Box<dyn Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// Domain instance whose methods are closures; unknown methods fail.
#[derive(Default)]
pub struct Target {
	handlers: FxHashMap<&'static str, Handler>,
	calls: Mutex<Vec<String>>,
}

impl Target {
	pub fn on(
		mut self,
		method: &'static str,
		f: impl Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
	) -> Self {
		self.handlers.insert(method, Box::new(f));
		self
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}
}

impl DomainObject for Target {
	fn class_name(&self) -> &str {
		"Order$$EnhancerByCGLIB$$1f2e"
	}

	fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
		self.calls.lock().push(method.to_owned());
		self.handlers
			.get(method)
			.ok_or_else(|| InvokeError::NoSuchMethod(method.to_owned()))
			.and_then(|handler| handler(args))
	}
}
