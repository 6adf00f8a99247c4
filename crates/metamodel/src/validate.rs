//! Boot-time metamodel validation.
//!
//! Loads a set of classes eagerly and folds every violation and load failure
//! into one [`ValidationReport`], so a misconfigured programming model fails
//! at startup with a single readable report instead of at first use.

use std::fmt;
use std::sync::Arc;

use crate::error::{LoadError, Violation};
use crate::loader::SpecificationLoader;

/// Aggregated outcome of [`SpecificationLoader::validate_all`].
#[derive(Debug, Default)]
pub struct ValidationReport {
	checked: usize,
	violations: Vec<Violation>,
	failures: Vec<(Arc<str>, LoadError)>,
}

impl ValidationReport {
	/// Number of classes whose specification was built or found.
	pub fn checked(&self) -> usize {
		self.checked
	}

	pub fn violations(&self) -> &[Violation] {
		&self.violations
	}

	/// Classes that could not be loaded at all.
	pub fn failures(&self) -> &[(Arc<str>, LoadError)] {
		&self.failures
	}

	pub fn is_ok(&self) -> bool {
		self.violations.is_empty() && self.failures.is_empty()
	}

	pub fn into_result(self) -> Result<(), Self> {
		if self.is_ok() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for ValidationReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_ok() {
			return write!(f, "metamodel valid ({} classes)", self.checked);
		}
		writeln!(
			f,
			"metamodel invalid: {} violation(s), {} failed class(es), {} classes checked",
			self.violations.len(),
			self.failures.len(),
			self.checked
		)?;
		for violation in &self.violations {
			writeln!(f, "  {violation}")?;
		}
		for (class, err) in &self.failures {
			writeln!(f, "  {class}: {err}")?;
		}
		Ok(())
	}
}

impl std::error::Error for ValidationReport {}

impl SpecificationLoader {
	/// Builds every named class and reports all violations at once.
	pub fn validate_all<I, S>(&self, names: I) -> ValidationReport
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut report = ValidationReport::default();
		for name in names {
			let name = name.as_ref();
			match self.specification_for(name) {
				Ok(_) => report.checked += 1,
				Err(LoadError::Invalid { spec }) => {
					report.checked += 1;
					report.violations.extend_from_slice(spec.violations());
				}
				Err(err) => report.failures.push((name.into(), err)),
			}
		}
		if report.is_ok() {
			tracing::info!(domain = "validate", checked = report.checked, "metamodel valid");
		} else {
			tracing::warn!(
				domain = "validate",
				checked = report.checked,
				violations = report.violations.len(),
				failures = report.failures.len(),
				"metamodel invalid"
			);
		}
		report
	}

	/// [`validate_all`](Self::validate_all) over every class in the catalog.
	pub fn validate_catalog(&self) -> ValidationReport {
		let names = self.catalog().names();
		self.validate_all(names.iter().map(|n| &**n))
	}
}
