//! In-process store used by tests and embedded deployments.

use super::WorkflowStore;
use crate::error::{EntityKind, WorkflowError, WorkflowResult};
use crate::model::{
    AssignedTest, EntityId, Examination, LabTest, Medication, Patient, Prescription, TestResult,
};
use std::collections::{BTreeMap, HashSet};

/// Entities with an optimistic concurrency version.
trait Versioned: Clone {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

macro_rules! versioned {
    ($ty:ty, $kind:expr) => {
        impl Versioned for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> EntityId {
                self.id
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn set_version(&mut self, version: u64) {
                self.version = version;
            }
        }
    };
}

versioned!(Examination, EntityKind::Examination);
versioned!(AssignedTest, EntityKind::AssignedTest);
versioned!(TestResult, EntityKind::TestResult);

/// A [`WorkflowStore`] kept entirely in memory.
///
/// Ids come from one counter shared by all entity kinds, so an id is never
/// reused even across kinds.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub(crate) next_id: EntityId,
    pub(crate) patients: BTreeMap<EntityId, Patient>,
    pub(crate) lab_tests: BTreeMap<EntityId, LabTest>,
    pub(crate) medications: BTreeMap<EntityId, Medication>,
    pub(crate) examinations: BTreeMap<EntityId, Examination>,
    pub(crate) assigned_tests: BTreeMap<EntityId, AssignedTest>,
    pub(crate) test_results: BTreeMap<EntityId, TestResult>,
    pub(crate) prescriptions: BTreeMap<EntityId, Prescription>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_patient(&mut self, mut patient: Patient) -> Patient {
        patient.id = self.allocate();
        self.patients.insert(patient.id, patient.clone());
        patient
    }

    pub fn add_lab_test(&mut self, mut lab_test: LabTest) -> LabTest {
        lab_test.id = self.allocate();
        self.lab_tests.insert(lab_test.id, lab_test.clone());
        lab_test
    }

    pub fn add_medication(&mut self, mut medication: Medication) -> Medication {
        medication.id = self.allocate();
        self.medications.insert(medication.id, medication.clone());
        medication
    }

    /// Register an examination for an existing patient.
    pub fn add_examination(&mut self, mut examination: Examination) -> WorkflowResult<Examination> {
        if !self.patients.contains_key(&examination.patient_id) {
            return Err(WorkflowError::not_found(
                EntityKind::Patient,
                examination.patient_id,
            ));
        }
        examination.id = self.allocate();
        examination.version = 1;
        self.examinations.insert(examination.id, examination.clone());
        Ok(examination)
    }

    pub fn patient(&self, id: EntityId) -> WorkflowResult<Patient> {
        fetch(&self.patients, EntityKind::Patient, id)
    }

    pub fn prescriptions_for_examination(&self, examination_id: EntityId) -> Vec<Prescription> {
        self.prescriptions
            .values()
            .filter(|p| p.examination_id == examination_id)
            .cloned()
            .collect()
    }

    fn insert_versioned<T: Versioned>(
        next_id: &mut EntityId,
        map: &mut BTreeMap<EntityId, T>,
        mut entity: T,
        assign: impl FnOnce(&mut T, EntityId),
    ) -> T {
        *next_id += 1;
        assign(&mut entity, *next_id);
        entity.set_version(1);
        map.insert(entity.id(), entity.clone());
        entity
    }
}

fn fetch<T: Clone>(map: &BTreeMap<EntityId, T>, kind: EntityKind, id: EntityId) -> WorkflowResult<T> {
    map.get(&id)
        .cloned()
        .ok_or_else(|| WorkflowError::not_found(kind, id))
}

fn replace<T: Versioned>(map: &mut BTreeMap<EntityId, T>, entity: &T) -> WorkflowResult<T> {
    let stored = map
        .get_mut(&entity.id())
        .ok_or_else(|| WorkflowError::not_found(T::KIND, entity.id()))?;
    if stored.version() != entity.version() {
        let kind = T::KIND;
        tracing::warn!(
            kind = %kind,
            id = entity.id(),
            stored = stored.version(),
            given = entity.version(),
            "stale write rejected"
        );
        return Err(WorkflowError::ConcurrentModification {
            entity: T::KIND,
            id: entity.id(),
        });
    }
    let mut next = entity.clone();
    next.set_version(entity.version() + 1);
    *stored = next.clone();
    Ok(next)
}

impl WorkflowStore for MemoryStore {
    fn examination(&self, id: EntityId) -> WorkflowResult<Examination> {
        fetch(&self.examinations, EntityKind::Examination, id)
    }

    fn lab_test(&self, id: EntityId) -> WorkflowResult<LabTest> {
        fetch(&self.lab_tests, EntityKind::LabTest, id)
    }

    fn medication(&self, id: EntityId) -> WorkflowResult<Medication> {
        fetch(&self.medications, EntityKind::Medication, id)
    }

    fn assigned_test(&self, id: EntityId) -> WorkflowResult<AssignedTest> {
        fetch(&self.assigned_tests, EntityKind::AssignedTest, id)
    }

    fn assigned_tests_for_examination(&self, examination_id: EntityId) -> WorkflowResult<Vec<AssignedTest>> {
        Ok(self
            .assigned_tests
            .values()
            .filter(|t| t.examination_id == examination_id)
            .cloned()
            .collect())
    }

    fn test_result(&self, id: EntityId) -> WorkflowResult<TestResult> {
        fetch(&self.test_results, EntityKind::TestResult, id)
    }

    fn result_for_assigned_test(&self, assigned_test_id: EntityId) -> WorkflowResult<Option<TestResult>> {
        Ok(self
            .test_results
            .values()
            .find(|r| r.assigned_test_id == assigned_test_id)
            .cloned())
    }

    fn result_history(
        &self,
        patient_id: EntityId,
        lab_test_id: EntityId,
    ) -> WorkflowResult<Vec<(AssignedTest, TestResult)>> {
        let examinations: HashSet<EntityId> = self
            .examinations
            .values()
            .filter(|e| e.patient_id == patient_id)
            .map(|e| e.id)
            .collect();

        Ok(self
            .assigned_tests
            .values()
            .filter(|t| t.lab_test_id == lab_test_id && examinations.contains(&t.examination_id))
            .filter_map(|t| {
                let result = self.test_results.get(&t.result_id?)?;
                Some((t.clone(), result.clone()))
            })
            .collect())
    }

    fn prescription(&self, id: EntityId) -> WorkflowResult<Prescription> {
        fetch(&self.prescriptions, EntityKind::Prescription, id)
    }

    fn update_examination(&mut self, examination: &Examination) -> WorkflowResult<Examination> {
        replace(&mut self.examinations, examination)
    }

    fn insert_assigned_test(&mut self, test: AssignedTest) -> WorkflowResult<AssignedTest> {
        if !self.examinations.contains_key(&test.examination_id) {
            return Err(WorkflowError::not_found(EntityKind::Examination, test.examination_id));
        }
        Ok(Self::insert_versioned(
            &mut self.next_id,
            &mut self.assigned_tests,
            test,
            |t, id| t.id = id,
        ))
    }

    fn update_assigned_test(&mut self, test: &AssignedTest) -> WorkflowResult<AssignedTest> {
        replace(&mut self.assigned_tests, test)
    }

    fn insert_test_result(&mut self, result: TestResult) -> WorkflowResult<TestResult> {
        if !self.assigned_tests.contains_key(&result.assigned_test_id) {
            return Err(WorkflowError::not_found(
                EntityKind::AssignedTest,
                result.assigned_test_id,
            ));
        }
        if let Some(existing) = self.result_for_assigned_test(result.assigned_test_id)? {
            tracing::warn!(
                assigned_test = result.assigned_test_id,
                result = existing.id,
                "second result rejected"
            );
            return Err(WorkflowError::Storage(format!(
                "assigned test {} already has result {}",
                result.assigned_test_id, existing.id
            )));
        }
        Ok(Self::insert_versioned(
            &mut self.next_id,
            &mut self.test_results,
            result,
            |r, id| r.id = id,
        ))
    }

    fn update_test_result(&mut self, result: &TestResult) -> WorkflowResult<TestResult> {
        replace(&mut self.test_results, result)
    }

    fn insert_prescription(&mut self, mut prescription: Prescription) -> WorkflowResult<Prescription> {
        if !self.examinations.contains_key(&prescription.examination_id) {
            return Err(WorkflowError::not_found(
                EntityKind::Examination,
                prescription.examination_id,
            ));
        }
        prescription.id = self.allocate();
        self.prescriptions.insert(prescription.id, prescription.clone());
        Ok(prescription)
    }

    fn delete_prescription(&mut self, id: EntityId) -> WorkflowResult<()> {
        self.prescriptions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Prescription, id))
    }
}
