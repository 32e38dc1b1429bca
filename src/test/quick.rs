use quickcheck::{Arbitrary, Gen};

use crate::record::{Key, Registration};

/// Subjects drawn from in quicktests. Few enough that students pile up on the same subject.
const SUBJECTS: &[&str] = &["Algo", "Compilers", "Databases", "Networks", "OS"];

/// An enum for the various kinds of "things" to do to
/// the tree in a quicktest.
#[derive(Clone, Debug)]
pub(crate) enum Op {
    /// Register a student for a subject
    Insert {
        student_id: i8,
        subject: &'static str,
        timestamp: i16,
    },
    /// Compare iterators
    Iter,
}

impl Op {
    /// The registration this op inserts, if it is an insert.
    pub(crate) fn registration(&self) -> Option<Registration> {
        match *self {
            Op::Insert {
                student_id,
                subject,
                timestamp,
            } => Some(Registration {
                key: Key::new(student_id.into(), subject),
                student_name: format!("student{}", student_id),
                semester: 1,
                phone: "010".into(),
                timestamp: timestamp.into(),
            }),
            Op::Iter => None,
        }
    }
}

impl Arbitrary for Op {
    /// Tells quickcheck how to randomly choose an operation. Inserts are weighted up so trees
    /// grow deep enough to rotate.
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 0, 0, 0, 1]).unwrap() {
            0 => Op::Insert {
                student_id: i8::arbitrary(g),
                subject: *g.choose(SUBJECTS).unwrap(),
                timestamp: i16::arbitrary(g),
            },
            1 => Op::Iter,
            _ => unreachable!(),
        }
    }
}
