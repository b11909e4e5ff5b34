// Disaster alert pipeline.
//
// Architecture:
// - model.rs: Alert record, severity classes and the demo seed
// - store.rs: JSON persistence of the alert list
// - list.rs: Read model and the only writer of the store
// - feed.rs: Simulated early-warning feed on a cancellable timer
// - dispatch.rs: Toast / OS push decision and once-per-id delivery

pub mod dispatch;
pub mod feed;
pub mod list;
pub mod model;
pub mod store;
