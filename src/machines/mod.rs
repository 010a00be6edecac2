//! Status machines for the three stateful entities.
//!
//! Every operation here is a pure function: it takes the current entity
//! (as freshly loaded by the caller), validates the requested move, and
//! returns the updated value. Persisting it is the coordinator's job.

pub mod assigned_test;
pub mod examination;
pub mod result;
