use std::collections::HashSet;
use std::sync::Arc;

use coursectl_core::{Course, MemoryStore, Registrar, Student};
use proptest::prelude::*;

const STUDENTS: i64 = 4;
const COURSES: i64 = 3;

#[derive(Debug, Clone)]
enum Op {
    Enroll(i64, i64),
    Drop(i64, i64),
    DeleteStudent(i64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1..=STUDENTS, 1..=COURSES).prop_map(|(s, c)| Op::Enroll(s, c)),
        3 => (1..=STUDENTS, 1..=COURSES).prop_map(|(s, c)| Op::Drop(s, c)),
        1 => (1..=STUDENTS).prop_map(Op::DeleteStudent),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

async fn seeded() -> Registrar {
    let registrar = Registrar::new(Arc::new(MemoryStore::new()));
    for i in 0..STUDENTS {
        registrar
            .save_student(Student::new(format!("S{i}"), "Test", "Law", None))
            .await
            .unwrap();
    }
    for i in 0..COURSES {
        registrar
            .save_course(Course::new(format!("C{i}"), "Staff", "", 5))
            .await
            .unwrap();
    }
    registrar
}

proptest! {
    /// Property: after any enroll/drop/delete sequence, every stored counter
    /// equals the live number of enrolled students, before and after listing
    #[test]
    fn prop_counters_match_membership(ops in prop::collection::vec(arb_op(), 0..60)) {
        runtime().block_on(async {
            let registrar = seeded().await;
            for op in &ops {
                // Ops against deleted students fail with NotFound; that is fine.
                let _ = match *op {
                    Op::Enroll(s, c) => registrar.enroll(s, c).await.map(|_| ()),
                    Op::Drop(s, c) => registrar.drop_course(s, c).await.map(|_| ()),
                    Op::DeleteStudent(s) => registrar.delete_student(s).await,
                };
            }

            let students = registrar.list_students().await.unwrap();
            for c in 1..=COURSES {
                let stored = registrar.get_course(c).await.unwrap().number_of_students;
                let live = students.iter().filter(|s| s.is_enrolled_in(c)).count();
                prop_assert_eq!(stored as usize, live);
            }
            for course in registrar.list_courses().await.unwrap() {
                let id = course.id.unwrap();
                let live = students.iter().filter(|s| s.is_enrolled_in(id)).count();
                prop_assert_eq!(course.number_of_students as usize, live);
            }
            Ok(())
        })?;
    }

    /// Property: the counter tracks an independently kept model of the
    /// enrollment pairs
    #[test]
    fn prop_counters_exact_without_recompute(
        ops in prop::collection::vec(
            (1..=STUDENTS, 1..=COURSES, any::<bool>()), 0..60)
    ) {
        runtime().block_on(async {
            let registrar = seeded().await;
            let mut expected: HashSet<(i64, i64)> = HashSet::new();
            for &(s, c, enroll) in &ops {
                if enroll {
                    registrar.enroll(s, c).await.unwrap();
                    expected.insert((s, c));
                } else {
                    registrar.drop_course(s, c).await.unwrap();
                    expected.remove(&(s, c));
                }
            }

            for c in 1..=COURSES {
                let stored = registrar.get_course(c).await.unwrap().number_of_students;
                let want = expected.iter().filter(|(_, ec)| *ec == c).count();
                prop_assert!(stored >= 0);
                prop_assert_eq!(stored as usize, want);
            }
            Ok(())
        })?;
    }

    /// Property: enroll is idempotent on the relationship
    #[test]
    fn prop_enroll_idempotent(s in 1..=STUDENTS, c in 1..=COURSES, repeats in 1usize..5) {
        runtime().block_on(async {
            let registrar = seeded().await;
            for _ in 0..repeats {
                registrar.enroll(s, c).await.unwrap();
            }
            prop_assert_eq!(registrar.get_student(s).await.unwrap().courses, vec![c]);
            prop_assert_eq!(registrar.get_course(c).await.unwrap().number_of_students, 1);
            Ok(())
        })?;
    }
}
