//! Facet-based domain object metamodel.
//!
//! Builds an [`ObjectSpecification`] for each application class by reading its
//! descriptor, enumerating properties, collections, actions and parameters,
//! and letting a [`ProgrammingModel`] of facet factories attach behaviour to
//! each feature. The [`interaction`] evaluators then answer, per request,
//! whether a member may be seen, used, or given a proposed value.
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Runtime class -> logical class | [`substitute`] |
//! | Class -> features | [`traverse`] |
//! | Feature -> facets | [`factory`] |
//! | Facets -> specification | [`spec`] |
//! | Cache, cycles, invalidation | [`loader`] |
//! | Request-time evaluation | [`interaction`] |
//! | Boot-time report | [`validate`] |
//!
//! # Adding a Facet
//!
//! 1. Add a variant to [`Facet`] and its [`FacetKind`].
//! 2. Write a [`FacetFactory`] and register it with `inventory::submit!` and
//!    a [`FacetFactoryReg`], or pass it to [`ProgrammingModelBuilder::register`].
//! 3. Teach the relevant evaluator in [`interaction`] to consult it.

pub mod config;
pub mod error;
pub mod facet;
pub mod factory;
pub mod ident;
pub mod interaction;
pub mod introspect;
pub mod loader;
pub mod spec;
pub mod substitute;
pub mod traverse;
pub mod validate;

pub use config::{FactoryToggles, LoaderConfig, MetamodelConfig, SubstitutionConfig};
pub use error::{
	ConfigError, FactoryError, InteractionError, LoadError, SubstitutionError, Violation,
	ViolationSource,
};
pub use facet::{Facet, FacetHolder, FacetKind, Optionality, Precedence};
pub use factory::{FacetFactory, FacetFactoryReg, ProgrammingModel, ProgrammingModelBuilder};
pub use ident::{ClassId, FeatureIdentifier, FeatureKind, FeatureKinds};
pub use interaction::{CallerContext, Consent, InteractionContext, Veto, VetoKind};
pub use introspect::{
	Annotation, ClassCatalog, ClassDescriptor, DomainObject, InvokeError, Lifecycle,
	MethodDescriptor, ParamDescriptor, TypeRef, Value, ValueType, When, Where,
};
pub use loader::{LoaderStats, SpecificationLoader};
pub use spec::{ObjectActionParameter, ObjectMember, ObjectSpecification};
pub use substitute::ClassSubstitutor;
pub use validate::ValidationReport;
