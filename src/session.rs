//! A [`Session`] owns the tree and its secondary indices for one run of queries and answers
//! each [`Query`] against them.
//!
//! # Examples
//!
//! ```
//! use course_index::record::{Color, Key, Registration};
//! use course_index::session::{Listing, Session};
//!
//! let mut session = Session::new();
//! let report = session
//!     .insert(Registration {
//!         key: Key::new(1, "Algo"),
//!         student_name: "Kim".into(),
//!         semester: 3,
//!         phone: "010".into(),
//!         timestamp: 100,
//!     })
//!     .unwrap();
//! assert_eq!((report.depth, report.duplicate), (0, false));
//!
//! assert_eq!(
//!     session.list_subjects(1),
//!     Listing::Subjects(vec![("Algo".to_string(), Color::Black)])
//! );
//! assert_eq!(session.list_subjects(2), Listing::NoRecords);
//! ```

use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::index::Indices;
use crate::query::Query;
use crate::record::{Color, Key, Record, Registration, StudentId};
use crate::tree::Tree;

/// Printed when a student has no registrations.
pub const NO_RECORDS_MESSAGE: &str = "No records found";

/// Result of an insert.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InsertReport {
    /// Depth of the inserted or updated record once the tree has been rebalanced.
    pub depth: usize,
    /// Whether the key already existed.
    pub duplicate: bool,
}

/// Result of listing a student's subjects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    /// The student never registered for anything.
    NoRecords,
    /// Each subject with its record's current color, by subject name.
    Subjects(Vec<(String, Color)>),
}

/// Result of counting a subject's students.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubjectCount {
    /// Number of records for the subject.
    pub count: usize,
    /// Sum of those records' current depths.
    pub depth_sum: usize,
}

/// One entry of an earliest-applicants answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Applicant {
    /// The applicant.
    pub student_id: StudentId,
    /// Current color of their record.
    pub color: Color,
}

/// The answer to any [`Query`]. Its `Display` form is the line printed for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Answer to [`Query::Insert`].
    Inserted(InsertReport),
    /// Answer to [`Query::ListSubjects`].
    Listed(Listing),
    /// Answer to [`Query::CountStudents`].
    Counted(SubjectCount),
    /// Answer to [`Query::EarliestApplicants`].
    Earliest(Vec<Applicant>),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted(report) => {
                write!(f, "{} {}", report.depth, u8::from(report.duplicate))
            }
            Self::Listed(Listing::NoRecords) => f.write_str(NO_RECORDS_MESSAGE),
            Self::Listed(Listing::Subjects(subjects)) => {
                write_pairs(f, subjects.iter().map(|(subject, color)| (subject, color)))
            }
            Self::Counted(count) => write!(f, "{} {}", count.count, count.depth_sum),
            Self::Earliest(applicants) => write_pairs(
                f,
                applicants.iter().map(|a| (&a.student_id, &a.color)),
            ),
        }
    }
}

/// Writes `a1 b1 a2 b2 ...` with single spaces and nothing trailing.
fn write_pairs<A, B>(
    f: &mut fmt::Formatter<'_>,
    pairs: impl Iterator<Item = (A, B)>,
) -> fmt::Result
where
    A: fmt::Display,
    B: fmt::Display,
{
    for (i, (a, b)) in pairs.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{} {}", a, b)?;
    }
    Ok(())
}

/// The tree plus the indices derived from it.
#[derive(Clone, Debug, Default)]
pub struct Session {
    tree: Tree,
    indices: Indices,
}

impl Session {
    /// An empty session.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            indices: Indices::new(),
        }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The secondary indices.
    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    /// Number of distinct registrations.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The stored record for a student and subject.
    pub fn record(&self, student_id: StudentId, subject: &str) -> Option<&Record> {
        self.tree.get(&Key::new(student_id, subject))
    }

    /// Answers one query.
    pub fn execute(&mut self, query: Query) -> Result<Response> {
        Ok(match query {
            Query::Insert(registration) => Response::Inserted(self.insert(registration)?),
            Query::ListSubjects { student_id } => Response::Listed(self.list_subjects(student_id)),
            Query::CountStudents { subject } => Response::Counted(self.count_students(&subject)?),
            Query::EarliestApplicants { subject, k } => {
                Response::Earliest(self.earliest_applicants(&subject, k)?)
            }
        })
    }

    /// Inserts a registration, or refreshes the timestamp of an existing one, and reports the
    /// record's depth afterwards. New records are added to both indices as soon as they are
    /// linked into the tree, before rebalancing.
    pub fn insert(&mut self, registration: Registration) -> Result<InsertReport> {
        let key = registration.key.clone();
        let indices = &mut self.indices;
        let insertion = self.tree.insert_with(registration, |tree, id| {
            indices.register(tree.record(id).key(), id);
        })?;

        let report = InsertReport {
            depth: self.tree.depth(insertion.id()),
            duplicate: insertion.is_duplicate(),
        };
        debug!(
            "insert {}: depth {}, duplicate {}",
            key, report.depth, report.duplicate
        );
        Ok(report)
    }

    /// The student's subjects in name order, each with its record's current color.
    ///
    /// The student's index entries are sorted in place (stably) on every call.
    pub fn list_subjects(&mut self, student_id: StudentId) -> Listing {
        let Some(entries) = self.indices.by_student.get_mut(student_id) else {
            return Listing::NoRecords;
        };

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let tree = &self.tree;
        Listing::Subjects(
            entries
                .iter()
                .map(|(subject, id)| (subject.clone(), tree.record(*id).color()))
                .collect(),
        )
    }

    /// How many records the subject has and the sum of their current depths.
    ///
    /// Every insert registers its subject, so an unknown subject is an
    /// [`Error::UnknownSubject`] rather than a zero count.
    pub fn count_students(&self, subject: &str) -> Result<SubjectCount> {
        let ids = self
            .indices
            .by_subject
            .get(subject)
            .ok_or_else(|| Error::UnknownSubject(subject.to_string()))?;

        Ok(SubjectCount {
            count: ids.len(),
            depth_sum: ids.iter().map(|&id| self.tree.depth(id)).sum(),
        })
    }

    /// Up to `k` applicants for the subject, earliest timestamp first. Ties keep the order the
    /// subject's records were in, which is insertion order until an earlier call sorted them.
    ///
    /// The subject's index entries are sorted in place (stably) on every call. An unknown
    /// subject is an [`Error::UnknownSubject`].
    pub fn earliest_applicants(&mut self, subject: &str, k: i64) -> Result<Vec<Applicant>> {
        let ids = self
            .indices
            .by_subject
            .get_mut(subject)
            .ok_or_else(|| Error::UnknownSubject(subject.to_string()))?;

        let tree = &self.tree;
        ids.sort_by_key(|&id| tree.record(id).timestamp());

        let take = usize::try_from(k).unwrap_or(0);
        Ok(ids
            .iter()
            .take(take)
            .map(|&id| {
                let record = tree.record(id);
                Applicant {
                    student_id: record.student_id(),
                    color: record.color(),
                }
            })
            .collect())
    }
}
