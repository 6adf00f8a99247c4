//! Live domain instances as seen by the evaluators.

use std::fmt;
use std::sync::Arc;

use super::descriptor::ValueType;

/// Persistence lifecycle of a target instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
	Transient,
	#[default]
	Persistent,
}

/// Dynamically typed value passed to and returned from domain methods.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	/// ISO-8601 `YYYY-MM-DD`.
	Date(String),
	List(Vec<Value>),
	/// Reference to another domain object.
	Ref { class: Arc<str>, key: String },
}

impl Value {
	pub fn text(s: impl Into<String>) -> Self {
		Self::Text(s.into())
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) | Self::Date(s) => Some(s),
			_ => None,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::Text(_) => "text",
			Self::Date(_) => "date",
			Self::List(_) => "list",
			Self::Ref { .. } => "reference",
		}
	}

	/// Returns true if this non-null value is an instance of `ty`.
	pub fn conforms_to(&self, ty: ValueType) -> bool {
		matches!(
			(self, ty),
			(Self::Text(_), ValueType::Text)
				| (Self::Int(_), ValueType::Int)
				| (Self::Float(_), ValueType::Float)
				| (Self::Int(_), ValueType::Float)
				| (Self::Bool(_), ValueType::Bool)
				| (Self::Date(_), ValueType::Date)
		)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str(""),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(n) => write!(f, "{n}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Text(s) | Self::Date(s) => f.write_str(s),
			Self::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Self::Ref { class, key } => write!(f, "{class}:{key}"),
		}
	}
}

/// Error raised by a domain method invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
	#[error("no such method: {0}")]
	NoSuchMethod(String),
	#[error("{method}: expected {expected} arguments, got {got}")]
	Arity {
		method: String,
		expected: usize,
		got: usize,
	},
	#[error("{method} failed: {message}")]
	Failed { method: String, message: String },
}

/// A live instance of a domain class.
///
/// Facets that delegate to supporting methods (`hideTotal`, `validatePlace`, ...)
/// call [`DomainObject::invoke`]; those calls are the only place evaluation can
/// have side effects.
pub trait DomainObject: Send + Sync {
	/// Runtime class name; may be an enhanced or proxy class.
	fn class_name(&self) -> &str;

	fn lifecycle(&self) -> Lifecycle {
		Lifecycle::Persistent
	}

	fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError>;
}
