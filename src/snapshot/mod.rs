//! Save and restore the in-memory store.
//!
//! A snapshot is a complete copy of a [`MemoryStore`], including the id
//! counter and every entity's version, so a restored store continues exactly
//! where the original left off. Snapshots can be written as JSON for
//! inspection or as bincode for compact storage.

use crate::error::EntityKind;
use crate::model::{
    AssignedTest, EntityId, Examination, LabTest, Medication, Patient, Prescription, TestResult,
};
use crate::store::MemoryStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a [`MemoryStore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    /// Unique snapshot identifier.
    pub id: String,
    pub taken_at: DateTime<Utc>,
    pub next_id: EntityId,
    pub patients: BTreeMap<EntityId, Patient>,
    pub lab_tests: BTreeMap<EntityId, LabTest>,
    pub medications: BTreeMap<EntityId, Medication>,
    pub examinations: BTreeMap<EntityId, Examination>,
    pub assigned_tests: BTreeMap<EntityId, AssignedTest>,
    pub test_results: BTreeMap<EntityId, TestResult>,
    pub prescriptions: BTreeMap<EntityId, Prescription>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(raw).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// Check the format version and that every reference resolves.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let dangling = |entity, id, missing, target| SnapshotError::DanglingReference {
            entity,
            id,
            missing,
            target,
        };

        for exam in self.examinations.values() {
            if !self.patients.contains_key(&exam.patient_id) {
                return Err(dangling(
                    EntityKind::Examination,
                    exam.id,
                    EntityKind::Patient,
                    exam.patient_id,
                ));
            }
        }
        for test in self.assigned_tests.values() {
            if !self.examinations.contains_key(&test.examination_id) {
                return Err(dangling(
                    EntityKind::AssignedTest,
                    test.id,
                    EntityKind::Examination,
                    test.examination_id,
                ));
            }
            if !self.lab_tests.contains_key(&test.lab_test_id) {
                return Err(dangling(
                    EntityKind::AssignedTest,
                    test.id,
                    EntityKind::LabTest,
                    test.lab_test_id,
                ));
            }
            if let Some(result_id) = test.result_id {
                if !self.test_results.contains_key(&result_id) {
                    return Err(dangling(
                        EntityKind::AssignedTest,
                        test.id,
                        EntityKind::TestResult,
                        result_id,
                    ));
                }
            }
        }
        for result in self.test_results.values() {
            if !self.assigned_tests.contains_key(&result.assigned_test_id) {
                return Err(dangling(
                    EntityKind::TestResult,
                    result.id,
                    EntityKind::AssignedTest,
                    result.assigned_test_id,
                ));
            }
        }
        for prescription in self.prescriptions.values() {
            if !self.examinations.contains_key(&prescription.examination_id) {
                return Err(dangling(
                    EntityKind::Prescription,
                    prescription.id,
                    EntityKind::Examination,
                    prescription.examination_id,
                ));
            }
            for item in &prescription.items {
                if !self.medications.contains_key(&item.medication_id) {
                    return Err(dangling(
                        EntityKind::Prescription,
                        prescription.id,
                        EntityKind::Medication,
                        item.medication_id,
                    ));
                }
            }
        }

        let highest = self
            .patients
            .keys()
            .chain(self.lab_tests.keys())
            .chain(self.medications.keys())
            .chain(self.examinations.keys())
            .chain(self.assigned_tests.keys())
            .chain(self.test_results.keys())
            .chain(self.prescriptions.keys())
            .max()
            .copied()
            .unwrap_or(0);
        if highest > self.next_id {
            return Err(SnapshotError::IdCounterBehind {
                next_id: self.next_id,
                highest,
            });
        }
        Ok(())
    }
}

impl MemoryStore {
    /// Copy the whole store.
    pub fn snapshot(&self) -> StoreSnapshot {
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            next_id: self.next_id,
            patients: self.patients.clone(),
            lab_tests: self.lab_tests.clone(),
            medications: self.medications.clone(),
            examinations: self.examinations.clone(),
            assigned_tests: self.assigned_tests.clone(),
            test_results: self.test_results.clone(),
            prescriptions: self.prescriptions.clone(),
        };
        tracing::info!(snapshot = %snapshot.id, next_id = snapshot.next_id, "store snapshot taken");
        snapshot
    }

    /// Rebuild a store from a validated snapshot.
    pub fn restore(snapshot: StoreSnapshot) -> Result<Self, SnapshotError> {
        snapshot
            .validate()
            .inspect_err(|err| tracing::warn!(snapshot = %snapshot.id, %err, "snapshot rejected"))?;
        tracing::info!(snapshot = %snapshot.id, "store restored");
        Ok(Self {
            next_id: snapshot.next_id,
            patients: snapshot.patients,
            lab_tests: snapshot.lab_tests,
            medications: snapshot.medications,
            examinations: snapshot.examinations,
            assigned_tests: snapshot.assigned_tests,
            test_results: snapshot.test_results,
            prescriptions: snapshot.prescriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssignedTestStatus, ReferenceRange};
    use crate::store::WorkflowStore;

    fn populated() -> (MemoryStore, AssignedTest) {
        let mut store = MemoryStore::new();
        let patient = store.add_patient(Patient::new("MRN-3", "Ada Byron"));
        let lab = store.add_lab_test(LabTest::new(
            "Potassium",
            Some("mmol/L"),
            Some(ReferenceRange::new(3.5, 5.1).unwrap()),
        ));
        let exam = store
            .add_examination(Examination::scheduled(patient.id, 9, None))
            .unwrap();
        let test = store
            .insert_assigned_test(AssignedTest {
                id: 0,
                examination_id: exam.id,
                lab_test_id: lab.id,
                status: AssignedTestStatus::Pending,
                result_id: None,
                assigned_by: 9,
                assigned_at: Utc::now(),
                history: Default::default(),
                version: 0,
            })
            .unwrap();
        (store, test)
    }

    #[test]
    fn json_snapshot_restores_identical_store() {
        let (store, test) = populated();
        let json = store.snapshot().to_json().unwrap();
        let restored = MemoryStore::restore(StoreSnapshot::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.assigned_test(test.id).unwrap(), test);
        assert_eq!(restored.next_id, store.next_id);
    }

    #[test]
    fn binary_snapshot_keeps_versions() {
        let (mut store, test) = populated();
        let mut started = test.clone();
        started.status = AssignedTestStatus::InProgress;
        let saved = store.update_assigned_test(&started).unwrap();

        let bytes = store.snapshot().to_bytes().unwrap();
        let restored = MemoryStore::restore(StoreSnapshot::from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(restored.assigned_test(test.id).unwrap().version, saved.version);
    }

    #[test]
    fn restored_store_keeps_allocating_fresh_ids() {
        let (store, _) = populated();
        let mut restored = MemoryStore::restore(store.snapshot()).unwrap();
        let med = restored.add_medication(Medication::new("Aspirin", None));
        assert_eq!(med.id, store.next_id + 1);
    }

    #[test]
    fn rejects_unknown_version() {
        let (store, _) = populated();
        let mut snapshot = store.snapshot();
        snapshot.version = 99;
        assert!(matches!(
            MemoryStore::restore(snapshot),
            Err(SnapshotError::UnsupportedVersion { found: 99, supported: 1 })
        ));
    }

    #[test]
    fn rejects_dangling_references() {
        let (store, test) = populated();
        let mut snapshot = store.snapshot();
        snapshot.examinations.clear();
        let err = MemoryStore::restore(snapshot).unwrap_err();
        match err {
            SnapshotError::DanglingReference { entity, id, missing, .. } => {
                assert_eq!(entity, EntityKind::AssignedTest);
                assert_eq!(id, test.id);
                assert_eq!(missing, EntityKind::Examination);
            }
            other => panic!("Expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn rejects_id_counter_behind_stored_ids() {
        let (store, _) = populated();
        let mut snapshot = store.snapshot();
        snapshot.next_id = 1;
        let err = MemoryStore::restore(snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::IdCounterBehind { next_id: 1, .. }));
        assert_eq!(
            err.to_string(),
            format!("Id counter 1 is behind stored id {}", store.next_id)
        );
    }

    #[test]
    fn garbage_input_fails_to_deserialize() {
        assert!(matches!(
            StoreSnapshot::from_json("[]"),
            Err(SnapshotError::Decode(_))
        ));
        assert!(matches!(
            StoreSnapshot::from_bytes(&[1, 2, 3]),
            Err(SnapshotError::Decode(_))
        ));
    }
}
