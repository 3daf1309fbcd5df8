//! Export state machine
//!
//! Writes lifecycle tags through the [`MetadataStore`]. Because the store
//! is a multimap, there is no single "current state": every transition is an
//! explicit remove + add, and initialization first sweeps every known tag
//! so that leftovers from a crashed run cannot survive.

use super::exporter_state::{ExporterState, TaggedValue, STATE_ATTRIBUTE};
use crate::adapters::repository::store::{AvuOutcome, MetadataStore};
use crate::adapters::repository::traits::RuleInvoker;
use crate::domain::ids::RepositoryName;
use crate::domain::Result;

/// Result of a single [`ExportStateMachine::transition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Outcome of removing the old tag
    pub removed: AvuOutcome,
    /// Outcome of adding the new tag
    pub added: AvuOutcome,
}

/// Export state machine for one repository on one collection
pub struct ExportStateMachine<'a> {
    store: MetadataStore<'a>,
    repository: RepositoryName,
}

impl<'a> ExportStateMachine<'a> {
    /// Creates a state machine writing through `store`
    pub fn new(store: MetadataStore<'a>, repository: RepositoryName) -> Self {
        Self { store, repository }
    }

    /// Repository whose tags this machine manages
    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    fn tag(&self, state: Option<ExporterState>) -> String {
        state
            .map(|state| TaggedValue::new(&self.repository, state).to_string())
            .unwrap_or_default()
    }

    /// Replaces the `old` tag with the `new` one
    ///
    /// Either side may be `None`, which turns the call into an add-only or
    /// remove-only update. A missing old tag or an already present new tag is
    /// logged and otherwise ignored.
    pub fn transition(
        &self,
        old: Option<ExporterState>,
        new: Option<ExporterState>,
    ) -> TransitionOutcome {
        let old_tag = self.tag(old);
        let new_tag = self.tag(new);

        let removed = self.store.remove(STATE_ATTRIBUTE, &old_tag);
        let added = self.store.add(STATE_ATTRIBUTE, &new_tag, None);

        let _entered = self.store.span().enter();
        crate::log_transition!(self.repository, old, new);

        TransitionOutcome { removed, added }
    }

    /// Removes every known tag of this repository
    ///
    /// Returns how many tags were actually attached.
    pub fn clear_all(&self) -> usize {
        ExporterState::ALL
            .iter()
            .map(|state| self.store.remove(STATE_ATTRIBUTE, &self.tag(Some(*state))))
            .filter(AvuOutcome::is_applied)
            .count()
    }

    /// Puts the collection into [`ExporterState::CreateExporter`]
    ///
    /// Sweeps all known tags, sets [`ExporterState::InQueueForExport`] and
    /// then transitions to [`ExporterState::CreateExporter`]. Afterwards
    /// exactly one tag of this repository is attached, whatever state a
    /// previous run left behind.
    pub fn initialize(&self) -> TransitionOutcome {
        let cleared = self.clear_all();
        if cleared > 0 {
            let _entered = self.store.span().enter();
            tracing::warn!(
                repository = %self.repository,
                cleared,
                "Cleared export state left by a previous run"
            );
        }

        self.store.add(
            STATE_ATTRIBUTE,
            &self.tag(Some(ExporterState::InQueueForExport)),
            None,
        );
        self.transition(
            Some(ExporterState::InQueueForExport),
            Some(ExporterState::CreateExporter),
        )
    }

    /// Crash path: removes every known tag, then closes the collection
    ///
    /// # Errors
    ///
    /// Returns an error if the remote close procedure fails. Tag removal
    /// never fails.
    pub fn cleanup_on_crash(&self, rules: &dyn RuleInvoker) -> Result<()> {
        let cleared = self.clear_all();
        {
            let _entered = self.store.span().enter();
            tracing::error!(repository = %self.repository, cleared, "Cleaned up export state");
        }
        rules.close_collection()?;
        Ok(())
    }

    /// Known states of this repository currently attached, in lifecycle order
    ///
    /// # Errors
    ///
    /// Returns an error if the collection metadata cannot be read.
    pub fn active_states(&self) -> Result<Vec<ExporterState>> {
        let mut states: Vec<ExporterState> = self
            .store
            .values(STATE_ATTRIBUTE)?
            .iter()
            .filter_map(|value| TaggedValue::parse(value))
            .filter(|tag| tag.repository == self.repository)
            .map(|tag| tag.state)
            .collect();
        states.sort();
        states.dedup();
        Ok(states)
    }
}
