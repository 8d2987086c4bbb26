//! Atmospheric data store and spatial query engine.
//!
//! Airports and their observation records live together in one ordered,
//! code-keyed [`ObservationStore`]. [`AtmosphereService`] puts that store
//! behind a single-writer lock, keeps it in sync with an
//! [`airport_catalog::AirportSource`], and records request statistics.
//! Every inbound operation is wrapped in a [`Task`] and run by the
//! [`TaskDispatcher`] on a bounded worker pool.

pub mod dispatcher;
pub mod frequency;
pub mod ledger;
pub mod observation;
pub mod record;
pub mod service;
pub mod spatial;
pub mod store;
pub mod task;

pub use dispatcher::{DispatcherConfig, TaskDispatcher};
pub use frequency::{HealthSnapshot, Instrumentation, RadiusFrequency, RequestFrequency};
pub use ledger::{LedgerStatus, TaskLedger};
pub use observation::{ObservationPoint, ObservationPointBuilder, PointKind};
pub use record::AtmosphericRecord;
pub use service::{AtmosphereService, ServiceSettings};
pub use spatial::{distance, parse_radius, query, true_haversine, EARTH_RADIUS_KM};
pub use store::{ObservationStore, Station};
pub use task::{Task, TaskOutput, TaskState};
