use course_index::{Key, Query, Registration};
use quickcheck::{Arbitrary, Gen};

mod session;

const SUBJECTS: &[&str] = &["Algo", "Compilers", "Databases", "Networks", "OS"];

/// An enum for the various kinds of "things" to do to
/// a session in a quicktest.
#[derive(Clone, Debug)]
pub(crate) enum Op {
    /// Register a student for a subject at a time
    Insert(i8, &'static str, i16),
    /// List a student's subjects
    List(i8),
    /// Count a subject's students
    Count(&'static str),
    /// Earliest K applicants for a subject
    Earliest(&'static str, i8),
}

impl Op {
    pub(crate) fn query(&self) -> Query {
        match *self {
            Op::Insert(student_id, subject, timestamp) => Query::Insert(registration(
                student_id.into(),
                subject,
                timestamp.into(),
            )),
            Op::List(student_id) => Query::ListSubjects {
                student_id: student_id.into(),
            },
            Op::Count(subject) => Query::CountStudents {
                subject: subject.into(),
            },
            Op::Earliest(subject, k) => Query::EarliestApplicants {
                subject: subject.into(),
                k: k.into(),
            },
        }
    }
}

impl Arbitrary for Op {
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        let subject = *g.choose(SUBJECTS).unwrap();
        match g.choose(&[0, 0, 0, 1, 2, 3]).unwrap() {
            0 => Op::Insert(i8::arbitrary(g), subject, i16::arbitrary(g)),
            1 => Op::List(i8::arbitrary(g)),
            2 => Op::Count(subject),
            3 => Op::Earliest(subject, i8::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}

pub(crate) fn registration(student_id: i64, subject: &str, timestamp: i64) -> Registration {
    Registration {
        key: Key::new(student_id, subject),
        student_name: format!("student{}", student_id),
        semester: 1,
        phone: "010".into(),
        timestamp,
    }
}
