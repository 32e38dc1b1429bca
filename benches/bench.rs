use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use course_index::{Key, Registration, Session};

const SUBJECTS: [&str; 8] = [
    "Algo", "Compilers", "Databases", "Graphics", "Networks", "OS", "Security", "Theory",
];

fn registration(student_id: i64, subject: &str, timestamp: i64) -> Registration {
    Registration {
        key: Key::new(student_id, subject),
        student_name: "Kim".into(),
        semester: 3,
        phone: "01012341234".into(),
        timestamp,
    }
}

/// Student IDs in insertion order, either ascending (the worst case for an unbalanced tree)
/// or scattered by a multiplicative hash.
fn student_ids(num_students: usize, scattered: bool) -> Vec<i64> {
    (0..num_students as i64)
        .map(|i| {
            if scattered {
                (i * 2_654_435_761) % 1_000_003
            } else {
                i
            }
        })
        .collect()
}

fn build_session(ids: &[i64]) -> Session {
    let mut session = Session::new();
    for (i, &student_id) in ids.iter().enumerate() {
        let subject = SUBJECTS[i % SUBJECTS.len()];
        session
            .insert(registration(student_id, subject, (i * 7 % 101) as i64))
            .unwrap();
    }
    session
}

/// Helper to bench a function on a session.
/// It creates a group for the given name and closure and runs it against sessions of
/// various sizes and insertion orders before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut Session, i64)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_students = 2usize.pow(num_levels as u32) - 1;

        for (order, scattered) in [("ascending", false), ("scattered", true)] {
            let ids = student_ids(num_students, scattered);
            let session = build_session(&ids);
            let probe = ids[ids.len() / 2];
            let id = BenchmarkId::new(order, num_students);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut session = black_box(session.clone());
                        let instant = std::time::Instant::now();
                        f(&mut session, black_box(probe));
                        time += instant.elapsed();
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "insert-max", |session, _| {
        let _report = black_box(session.insert(registration(i64::MAX, "Algo", 0)));
    });
    bench_helper(c, "insert-middle", |session, student_id| {
        let _report = black_box(session.insert(registration(student_id, "Algo", 0)));
    });

    bench_helper(c, "list", |session, student_id| {
        let _listing = black_box(session.list_subjects(student_id));
    });
    bench_helper(c, "count", |session, _| {
        let _count = black_box(session.count_students("Algo"));
    });
    bench_helper(c, "earliest", |session, _| {
        let _applicants = black_box(session.earliest_applicants("Algo", 10));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
