//! Secondary indices over the records of a [`Tree`](crate::tree::Tree): by student and by
//! subject. Both hold [`NodeId`]s into the tree rather than records, so they never own anything
//! and must not outlive the tree they were built against.
//!
//! Entries are only ever appended (records are never removed). Neither index keeps its lists
//! sorted; readers sort them in place when they need an order.

use std::collections::HashMap;

use crate::record::{Key, StudentId};
use crate::tree::NodeId;

/// Student ID -> (subject, record) for every subject that student registered for, in
/// registration order until someone sorts it.
#[derive(Clone, Debug, Default)]
pub struct StudentIndex {
    entries: HashMap<StudentId, Vec<(String, NodeId)>>,
}

impl StudentIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `(subject, id)` to the student's list, creating the list if needed.
    pub fn insert(&mut self, student_id: StudentId, subject: &str, id: NodeId) {
        self.entries
            .entry(student_id)
            .or_default()
            .push((subject.to_string(), id));
    }

    /// The student's entries, if they registered for anything.
    pub fn get(&self, student_id: StudentId) -> Option<&[(String, NodeId)]> {
        self.entries.get(&student_id).map(Vec::as_slice)
    }

    /// Mutable access to the student's entries so readers can sort them in place.
    pub fn get_mut(&mut self, student_id: StudentId) -> Option<&mut Vec<(String, NodeId)>> {
        self.entries.get_mut(&student_id)
    }

    /// Number of distinct students.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no student has been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Subject -> every record registered for it.
#[derive(Clone, Debug, Default)]
pub struct SubjectIndex {
    entries: HashMap<String, Vec<NodeId>>,
}

impl SubjectIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the subject's list, creating the list if needed. Does nothing if that
    /// exact record is already listed.
    pub fn insert(&mut self, subject: &str, id: NodeId) {
        match self.entries.get_mut(subject) {
            Some(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            None => {
                self.entries.insert(subject.to_string(), vec![id]);
            }
        }
    }

    /// The subject's records, if anyone registered for it.
    pub fn get(&self, subject: &str) -> Option<&[NodeId]> {
        self.entries.get(subject).map(Vec::as_slice)
    }

    /// Mutable access to the subject's records so readers can sort them in place.
    pub fn get_mut(&mut self, subject: &str) -> Option<&mut Vec<NodeId>> {
        self.entries.get_mut(subject)
    }

    /// Number of distinct subjects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no subject has been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Both secondary indices, updated together.
#[derive(Clone, Debug, Default)]
pub struct Indices {
    /// Lookup by student ID.
    pub by_student: StudentIndex,
    /// Lookup by subject name.
    pub by_subject: SubjectIndex,
}

impl Indices {
    /// Empty indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly created record in both indices. Must be called exactly once per new
    /// record; duplicate-key inserts don't create records and so never get here.
    pub fn register(&mut self, key: &Key, id: NodeId) {
        self.by_student.insert(key.student_id, &key.subject, id);
        self.by_subject.insert(&key.subject, id);
    }

    /// Number of distinct students registered for anything.
    pub fn students(&self) -> usize {
        self.by_student.len()
    }

    /// Number of distinct subjects anyone registered for.
    pub fn subjects(&self) -> usize {
        self.by_subject.len()
    }
}
