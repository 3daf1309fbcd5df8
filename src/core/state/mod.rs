// Export lifecycle tags and the state machine that writes them

pub mod exporter_state;
pub mod machine;

pub use exporter_state::{ExporterState, TaggedValue, STATE_ATTRIBUTE};
pub use machine::{ExportStateMachine, TransitionOutcome};
