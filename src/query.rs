//! The query stream: a leading query count followed by that many queries, each an opcode and
//! its whitespace separated fields.
//!
//! | Opcode | Fields |
//! |---|---|
//! | `I` | student ID, subject, name, semester, phone, timestamp |
//! | `L` | student ID |
//! | `C` | subject |
//! | `M` | subject, K |
//!
//! Line breaks carry no meaning; any whitespace separates tokens. Input is read a line at a
//! time, only as far as the next token needed.
//!
//! # Examples
//!
//! ```
//! use course_index::query::{Query, QueryReader};
//!
//! let mut reader = QueryReader::new("2\nL 7\nM Algo 3\n".as_bytes());
//!
//! assert_eq!(reader.header().unwrap(), 2);
//! assert_eq!(
//!     reader.next_query().unwrap(),
//!     Some(Query::ListSubjects { student_id: 7 })
//! );
//! assert_eq!(
//!     reader.next_query().unwrap(),
//!     Some(Query::EarliestApplicants { subject: "Algo".into(), k: 3 })
//! );
//! assert_eq!(reader.next_query().unwrap(), None);
//! ```

use std::collections::VecDeque;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::{Key, Registration, StudentId};

/// One parsed query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// `I`: insert a registration, or refresh the timestamp of an existing one.
    Insert(Registration),
    /// `L`: list a student's subjects.
    ListSubjects {
        /// Whose subjects.
        student_id: StudentId,
    },
    /// `C`: count a subject's students and sum their depths.
    CountStudents {
        /// Which subject.
        subject: String,
    },
    /// `M`: the `k` earliest applicants for a subject.
    EarliestApplicants {
        /// Which subject.
        subject: String,
        /// How many at most. Zero or less lists nobody.
        k: i64,
    },
}

impl Query {
    /// The opcode this query is written with.
    pub fn opcode(&self) -> char {
        match self {
            Self::Insert(_) => 'I',
            Self::ListSubjects { .. } => 'L',
            Self::CountStudents { .. } => 'C',
            Self::EarliestApplicants { .. } => 'M',
        }
    }
}

/// Reads queries off a whitespace separated token stream, one line of input at a time, so
/// each query can be answered before the rest of the input has arrived.
pub struct QueryReader<R> {
    input: R,
    line: String,
    tokens: VecDeque<String>,
}

impl<R: BufRead> QueryReader<R> {
    /// A reader over buffered input.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            tokens: VecDeque::new(),
        }
    }

    /// Reads the leading query count.
    pub fn header(&mut self) -> Result<usize> {
        self.field("query count")
    }

    /// Reads the next query. Returns `Ok(None)` at the end of the input.
    ///
    /// An unrecognised opcode is reported as [`Error::UnknownOpcode`] after consuming only the
    /// opcode token, so the caller may skip it and keep reading.
    pub fn next_query(&mut self) -> Result<Option<Query>> {
        let Some(opcode) = self.next_token()? else {
            return Ok(None);
        };

        let query = match opcode.as_str() {
            "I" => {
                let student_id = self.field("student id")?;
                let subject = self.word("subject")?;
                Query::Insert(Registration {
                    key: Key::new(student_id, subject),
                    student_name: self.word("student name")?,
                    semester: self.field("semester")?,
                    phone: self.word("phone")?,
                    timestamp: self.field("timestamp")?,
                })
            }
            "L" => Query::ListSubjects {
                student_id: self.field("student id")?,
            },
            "C" => Query::CountStudents {
                subject: self.word("subject")?,
            },
            "M" => Query::EarliestApplicants {
                subject: self.word("subject")?,
                k: self.field("k")?,
            },
            _ => return Err(Error::UnknownOpcode(opcode)),
        };
        Ok(Some(query))
    }

    /// Pulls lines until one has a token in it. `Ok(None)` once the input is exhausted.
    fn next_token(&mut self) -> Result<Option<String>> {
        while self.tokens.is_empty() {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.tokens
                .extend(self.line.split_whitespace().map(str::to_string));
        }
        Ok(self.tokens.pop_front())
    }

    fn word(&mut self, field: &'static str) -> Result<String> {
        self.next_token()?.ok_or_else(|| Error::Malformed {
            field,
            token: String::new(),
        })
    }

    fn field<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let token = self.word(field)?;
        token.parse().map_err(|_| Error::Malformed { field, token })
    }
}
