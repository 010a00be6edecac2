//! Labflow: a clinical test workflow engine.
//!
//! Labflow governs three coupled lifecycles: examinations, the lab tests
//! assigned to them, and the results entered for those tests. The status
//! machines in [`machines`] are pure functions over immutable entities; the
//! [`coordinator`] is the thin imperative shell that loads entities from a
//! [`WorkflowStore`], applies a machine operation and writes the outcome
//! back. Results are interpreted against the lab test's reference range and
//! the patient's earlier results.
//!
//! # Core Concepts
//!
//! - **Status**: each lifecycle is a [`core::State`] enum with final states
//! - **History**: every status change is recorded immutably with its actor
//! - **Store**: persistence is injected; [`MemoryStore`] ships in the crate
//!
//! # Example
//!
//! ```rust
//! use labflow::coordinator::{Actor, RequestContext, Role};
//! use labflow::model::{Examination, LabTest, Patient, ReferenceRange};
//! use labflow::requests::{AssignTestsRequest, EnterResultRequest};
//! use labflow::interpretation::Classification;
//! use labflow::{Coordinator, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! let patient = store.add_patient(Patient::new("MRN-1", "Ada Byron"));
//! let glucose = store.add_lab_test(LabTest::new(
//!     "Glucose",
//!     Some("mg/dL"),
//!     Some(ReferenceRange::new(70.0, 140.0)?),
//! ));
//! let exam = store.add_examination(Examination::scheduled(patient.id, 10, None))?;
//!
//! let coordinator = Coordinator::default();
//! let doctor = RequestContext::new(Actor::new(10, Role::Doctor));
//! let assigned = coordinator.assign_tests(
//!     &mut store,
//!     &doctor,
//!     &AssignTestsRequest { examination_id: exam.id, lab_test_ids: vec![glucose.id] },
//! )?;
//!
//! let technician = RequestContext::new(Actor::new(20, Role::Technician));
//! let entry = coordinator.enter_result(
//!     &mut store,
//!     &technician,
//!     &EnterResultRequest {
//!         assigned_test_id: assigned.created[0].id,
//!         result_data: Some("120".to_string()),
//!         ..Default::default()
//!     },
//! )?;
//! assert_eq!(entry.classification, Classification::Within);
//! # Ok::<(), labflow::WorkflowError>(())
//! ```

#[macro_use]
pub mod core;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod interpretation;
pub mod machines;
pub mod model;
pub mod requests;
pub mod snapshot;
pub mod store;
pub mod validation;

pub use config::{CompletionPolicy, WorkflowConfig};
pub use coordinator::Coordinator;
pub use error::{WorkflowError, WorkflowResult};
pub use snapshot::{SnapshotError, StoreSnapshot};
pub use store::{MemoryStore, WorkflowStore};
