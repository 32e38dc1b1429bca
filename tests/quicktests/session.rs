use course_index::session::{Listing, Response, Session};
use course_index::{Key, Query};
use quickcheck_macros::quickcheck;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{registration, Op};

/// Everything the session should know, kept the slow way.
#[derive(Default)]
struct Model {
    /// Key -> latest timestamp.
    records: BTreeMap<(i64, String), i64>,
}

impl Model {
    fn subjects_of(&self, student_id: i64) -> Vec<String> {
        self.records
            .keys()
            .filter(|(sid, _)| *sid == student_id)
            .map(|(_, subject)| subject.clone())
            .collect()
    }

    fn timestamps_of(&self, subject: &str) -> Vec<i64> {
        let mut timestamps: Vec<_> = self
            .records
            .iter()
            .filter(|((_, s), _)| s == subject)
            .map(|(_, &timestamp)| timestamp)
            .collect();
        timestamps.sort_unstable();
        timestamps
    }
}

/// Applies a set of operations to a session and a model, checking every answer against the
/// model as it goes.
fn do_ops(ops: &[Op], session: &mut Session, model: &mut Model) -> bool {
    for op in ops {
        let query = op.query();
        let response = match &query {
            Query::CountStudents { subject } | Query::EarliestApplicants { subject, .. }
                if model.timestamps_of(subject).is_empty() =>
            {
                // Nobody registered yet, which only the driver reports.
                if session.execute(query.clone()).is_ok() {
                    return false;
                }
                continue;
            }
            _ => match session.execute(query.clone()) {
                Ok(response) => response,
                Err(_) => return false,
            },
        };

        let ok = match (&query, response) {
            (Query::Insert(r), Response::Inserted(report)) => {
                let key = (r.key.student_id, r.key.subject.clone());
                let duplicate = model.records.insert(key, r.timestamp).is_some();
                report.duplicate == duplicate
            }
            (Query::ListSubjects { student_id }, Response::Listed(listing)) => {
                let expected = model.subjects_of(*student_id);
                match listing {
                    Listing::NoRecords => expected.is_empty(),
                    Listing::Subjects(subjects) => subjects
                        .into_iter()
                        .map(|(subject, _)| subject)
                        .eq(expected),
                }
            }
            (Query::CountStudents { subject }, Response::Counted(count)) => {
                count.count == model.timestamps_of(subject).len()
            }
            (Query::EarliestApplicants { subject, k }, Response::Earliest(applicants)) => {
                let expected = model.timestamps_of(subject);
                let take = (*k).max(0) as usize;
                let timestamps: Vec<_> = applicants
                    .iter()
                    .map(|a| {
                        session
                            .record(a.student_id, subject)
                            .map(|record| record.timestamp())
                    })
                    .collect();
                timestamps.len() == take.min(expected.len())
                    && timestamps
                        .into_iter()
                        .zip(expected)
                        .all(|(got, want)| got == Some(want))
            }
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    true
}

#[quickcheck]
fn fuzz_multiple_operations(ops: Vec<Op>) -> bool {
    let mut session = Session::new();
    let mut model = Model::default();

    do_ops(&ops, &mut session, &mut model)
        && session.len() == model.records.len()
        && session.tree().validate().is_ok()
}

#[quickcheck]
fn tree_stays_balanced(keys: Vec<(i16, u8)>) -> bool {
    let mut session = Session::new();
    for (student_id, subject) in &keys {
        let subject = format!("S{}", subject % 8);
        if session
            .insert(registration((*student_id).into(), &subject, 0))
            .is_err()
        {
            return false;
        }
        if session.tree().validate().is_err() {
            return false;
        }
    }

    // A red-black tree is never more than twice as tall as a perfectly balanced one.
    let n = session.len();
    let bound = 2 * (usize::BITS - (n + 1).leading_zeros()) as usize;
    session.tree().height() <= bound
}

#[quickcheck]
fn reported_depth_matches_tree(keys: Vec<i16>) -> bool {
    let mut session = Session::new();
    keys.into_iter().all(|student_id| {
        let key = Key::new(student_id.into(), "Algo");
        match session.insert(registration(key.student_id, &key.subject, 0)) {
            Ok(report) => {
                let tree = session.tree();
                match tree.search(&key) {
                    course_index::tree::Search::Found(id) => tree.depth(id) == report.depth,
                    _ => false,
                }
            }
            Err(_) => false,
        }
    })
}

#[quickcheck]
fn counts_sum_to_len(keys: Vec<(i8, u8)>) -> bool {
    let mut session = Session::new();
    let mut subjects = BTreeSet::new();
    for (student_id, subject) in keys {
        let subject = format!("S{}", subject % 5);
        if session
            .insert(registration(student_id.into(), &subject, 0))
            .is_err()
        {
            return false;
        }
        subjects.insert(subject);
    }

    let counts: Option<usize> = subjects
        .iter()
        .map(|subject| session.count_students(subject).ok().map(|c| c.count))
        .sum();
    counts == Some(session.len())
}

#[quickcheck]
fn duplicate_insert_only_updates_timestamp(student_id: i8, first: i16, second: i16) -> bool {
    let mut session = Session::new();
    let mut depths = HashMap::new();
    for timestamp in [first, second] {
        match session.insert(registration(student_id.into(), "OS", timestamp.into())) {
            Ok(report) => {
                depths.insert(report.duplicate, report.depth);
            }
            Err(_) => return false,
        }
    }

    session.len() == 1
        && depths.get(&false) == depths.get(&true)
        && session
            .record(student_id.into(), "OS")
            .map(|record| record.timestamp())
            == Some(second.into())
}
