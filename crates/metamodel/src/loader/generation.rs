//! One cache generation: compute-if-absent slots guarded by a mutex and condvar.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::factory::ProgrammingModel;
use crate::ident::ClassId;
use crate::spec::ObjectSpecification;

enum Slot {
	Building { owner: ThreadId },
	Ready(Arc<ObjectSpecification>),
}

/// Outcome of a top-level [`Generation::claim`].
pub(super) enum Claim<'g> {
	Ready(Arc<ObjectSpecification>),
	/// The caller must build the class and publish through the guard.
	Build(BuildGuard<'g>),
	/// The calling thread is already building this class.
	Reentrant,
}

pub(super) struct Generation {
	pub(super) epoch: u64,
	pub(super) model: Arc<ProgrammingModel>,
	slots: Mutex<FxHashMap<ClassId, Slot>>,
	published: Condvar,
}

impl Generation {
	pub(super) fn new(epoch: u64, model: Arc<ProgrammingModel>) -> Self {
		Self {
			epoch,
			model,
			slots: Mutex::new(FxHashMap::default()),
			published: Condvar::new(),
		}
	}

	/// Returns the cached specification, waiting while another thread builds it,
	/// or claims the build for the calling thread.
	pub(super) fn claim(&self, id: &ClassId) -> Claim<'_> {
		let me = thread::current().id();
		let mut slots = self.slots.lock();
		loop {
			match slots.get(id) {
				Some(Slot::Ready(spec)) => return Claim::Ready(spec.clone()),
				Some(Slot::Building { owner }) if *owner == me => return Claim::Reentrant,
				Some(Slot::Building { .. }) => {}
				None => break,
			}
			self.published.wait(&mut slots);
		}
		slots.insert(id.clone(), Slot::Building { owner: me });
		Claim::Build(BuildGuard::new(self, id.clone()))
	}

	/// Claims the build only if nobody has started it. Never waits.
	pub(super) fn try_claim(&self, id: &ClassId) -> Option<BuildGuard<'_>> {
		let mut slots = self.slots.lock();
		if slots.contains_key(id) {
			return None;
		}
		slots.insert(
			id.clone(),
			Slot::Building {
				owner: thread::current().id(),
			},
		);
		Some(BuildGuard::new(self, id.clone()))
	}

	pub(super) fn get(&self, id: &ClassId) -> Option<Arc<ObjectSpecification>> {
		match self.slots.lock().get(id) {
			Some(Slot::Ready(spec)) => Some(spec.clone()),
			_ => None,
		}
	}

	/// Number of published specifications.
	pub(super) fn ready_count(&self) -> usize {
		self.slots
			.lock()
			.values()
			.filter(|slot| matches!(slot, Slot::Ready(_)))
			.count()
	}
}

/// Exclusive right to build one class in one generation.
///
/// Dropping the guard without publishing (an error or a panic during the build)
/// removes the placeholder and wakes waiters, one of which then retries.
pub(super) struct BuildGuard<'g> {
	generation: &'g Generation,
	id: ClassId,
	published: bool,
}

impl<'g> BuildGuard<'g> {
	fn new(generation: &'g Generation, id: ClassId) -> Self {
		Self {
			generation,
			id,
			published: false,
		}
	}

	pub(super) fn id(&self) -> &ClassId {
		&self.id
	}

	pub(super) fn publish(mut self, spec: Arc<ObjectSpecification>) {
		self.generation
			.slots
			.lock()
			.insert(self.id.clone(), Slot::Ready(spec));
		self.published = true;
		self.generation.published.notify_all();
	}
}

impl Drop for BuildGuard<'_> {
	fn drop(&mut self) {
		if self.published {
			return;
		}
		self.generation.slots.lock().remove(&self.id);
		self.generation.published.notify_all();
		tracing::debug!(
			domain = "loader",
			class = %self.id,
			epoch = self.generation.epoch,
			"abandoned build"
		);
	}
}
