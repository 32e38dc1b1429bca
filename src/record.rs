//! The registration [`Record`] stored in each tree node, along with its [`Key`] and [`Color`].
//!
//! # Examples
//!
//! ```
//! use course_index::record::{Color, Key};
//!
//! let kim = Key::new(1, "Algo");
//! let lee = Key::new(2, "Algo");
//!
//! // Student ID decides first, subject only breaks ties.
//! assert!(kim < lee);
//! assert!(Key::new(1, "Algo") < Key::new(1, "Compilers"));
//!
//! assert_eq!(Color::Red.flip(), Color::Black);
//! assert_eq!(Color::Black.to_string(), "B");
//! ```

use std::fmt;

use crate::tree::NodeId;

/// Identifies a student.
pub type StudentId = i64;

/// Registration time. Smaller is earlier.
pub type Timestamp = i64;

/// The ordering key of a [`Record`]: a (student ID, subject) pair.
///
/// The derived `Ord` compares `student_id` first and `subject` second, both ascending. Two keys
/// are equal only when both components match.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    /// The registering student.
    pub student_id: StudentId,
    /// The subject registered for.
    pub subject: String,
}

impl Key {
    /// Builds a key from its two components.
    pub fn new(student_id: StudentId, subject: impl Into<String>) -> Self {
        Self {
            student_id,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.student_id, self.subject)
    }
}

/// Node color of the red-black tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Every record starts out red.
    Red,
    /// The root and every rebalanced-away violation ends up black.
    Black,
}

impl Color {
    /// The opposite color.
    pub fn flip(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// Single character form used in query output.
    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The payload of a new registration, before it has a place in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Where the record sorts.
    pub key: Key,
    /// Student's name.
    pub student_name: String,
    /// Semester the student is in.
    pub semester: i32,
    /// Student's phone number.
    pub phone: String,
    /// When the registration was filed.
    pub timestamp: Timestamp,
}

/// One (student, subject) registration living in the tree.
///
/// The key is fixed once created. Only `timestamp` changes afterwards (on a duplicate insert),
/// plus the color and links the rebalancer rewrites.
#[derive(Clone, Debug)]
pub struct Record {
    key: Key,
    student_name: String,
    semester: i32,
    phone: String,
    timestamp: Timestamp,
    pub(crate) color: Color,

    // `left` and `right` are the ownership edges. `parent` is only ever followed upwards.
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl Record {
    /// A fresh, red, unlinked record.
    pub(crate) fn new(registration: Registration) -> Self {
        let Registration {
            key,
            student_name,
            semester,
            phone,
            timestamp,
        } = registration;

        Self {
            key,
            student_name,
            semester,
            phone,
            timestamp,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }

    /// The (student ID, subject) key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Shorthand for `self.key().student_id`.
    pub fn student_id(&self) -> StudentId {
        self.key.student_id
    }

    /// Shorthand for `self.key().subject`.
    pub fn subject(&self) -> &str {
        &self.key.subject
    }

    /// Student's name as first registered.
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// Semester as first registered.
    pub fn semester(&self) -> i32 {
        self.semester
    }

    /// Phone number as first registered.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Timestamp of the latest registration for this key.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Current node color.
    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }
}
