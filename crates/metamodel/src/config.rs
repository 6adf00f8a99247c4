//! Metamodel configuration.
//!
//! Configuration is consumed once, when the [`ProgrammingModel`], the
//! [`ClassSubstitutor`] and the loader are built. Nothing reads it during
//! steady-state operation.
//!
//! ```toml
//! [factories]
//! role_based_hiding = true
//! convention_max_length = 255
//!
//! [substitution]
//! marker_interfaces = ["javax.jdo.spi.PersistenceCapable"]
//! name_fragments = ["$$EnhancerByCGLIB$$"]
//!
//! [loader]
//! eager_references = true
//! ```
//!
//! [`ProgrammingModel`]: crate::factory::ProgrammingModel
//! [`ClassSubstitutor`]: crate::substitute::ClassSubstitutor

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetamodelConfig {
	pub factories: FactoryToggles,
	pub substitution: SubstitutionConfig,
	pub loader: LoaderConfig,
}

impl MetamodelConfig {
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(src)?;
		config.check()?;
		Ok(config)
	}

	fn check(&self) -> Result<(), ConfigError> {
		if self.factories.convention_max_length == Some(0) {
			return Err(ConfigError::Invalid {
				key: "factories.convention_max_length",
				message: "must be at least 1".to_string(),
			});
		}
		let sub = &self.substitution;
		for (key, list) in [
			("substitution.marker_interfaces", &sub.marker_interfaces),
			("substitution.package_prefixes", &sub.package_prefixes),
			("substitution.name_fragments", &sub.name_fragments),
		] {
			if list.iter().any(|s| s.trim().is_empty()) {
				return Err(ConfigError::Invalid {
					key,
					message: "entries must not be empty".to_string(),
				});
			}
		}
		Ok(())
	}
}

/// Switches for optional builtin facet factories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactoryToggles {
	/// Recognise `hideX`/`disableX`/`validateX`/`choicesX`/... supporting methods.
	pub supporting_methods: bool,
	/// Honour `RequiresRole` annotations.
	pub role_based_hiding: bool,
	/// Honour `RegEx` annotations.
	pub regex_validation: bool,
	/// Disable properties that have no setter.
	pub infer_disabled_from_missing_setter: bool,
	/// Default maximum length for text properties and parameters.
	pub convention_max_length: Option<u32>,
}

impl Default for FactoryToggles {
	fn default() -> Self {
		Self {
			supporting_methods: true,
			role_based_hiding: true,
			regex_validation: true,
			infer_disabled_from_missing_setter: true,
			convention_max_length: None,
		}
	}
}

/// Predicates identifying enhancement or proxy classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstitutionConfig {
	pub marker_interfaces: Vec<String>,
	pub package_prefixes: Vec<String>,
	pub name_fragments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
	/// Build the classes a specification refers to as part of building it,
	/// instead of on first lookup.
	pub eager_references: bool,
}
