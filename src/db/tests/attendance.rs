use chrono::NaiveDate;

use super::harness::{create_test_db, insert_course, insert_user};
use crate::models::Role;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

#[tokio::test]
async fn test_upsert_keeps_single_record() {
    let db = create_test_db().await;
    let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
    let student = insert_user(&db, "stu@example.com", Role::Student).await;
    let course = insert_course(&db, instructor.id, "Chemistry").await;

    let first = db
        .attendance()
        .upsert(student.id, course.id, day(3), true)
        .await
        .unwrap();
    assert!(first.present);

    let second = db
        .attendance()
        .upsert(student.id, course.id, day(3), false)
        .await
        .unwrap();
    assert!(!second.present);
    assert_eq!(second.id, first.id);

    let records = db.attendance().list_by_course(course.id, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].present);
}

#[tokio::test]
async fn test_list_filters() {
    let db = create_test_db().await;
    let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
    let alice = insert_user(&db, "alice@example.com", Role::Student).await;
    let bob = insert_user(&db, "bob@example.com", Role::Student).await;
    let chem = insert_course(&db, instructor.id, "Chemistry").await;
    let bio = insert_course(&db, instructor.id, "Biology").await;

    let repo = db.attendance();
    repo.upsert(alice.id, chem.id, day(3), true).await.unwrap();
    repo.upsert(alice.id, chem.id, day(4), false).await.unwrap();
    repo.upsert(bob.id, chem.id, day(3), true).await.unwrap();
    repo.upsert(alice.id, bio.id, day(3), true).await.unwrap();

    assert_eq!(repo.list_by_course(chem.id, None).await.unwrap().len(), 3);
    assert_eq!(repo.list_by_course(chem.id, Some(day(3))).await.unwrap().len(), 2);

    let alice_all = repo.list_by_student(alice.id, None).await.unwrap();
    assert_eq!(alice_all.len(), 3);
    assert_eq!(alice_all[0].date, day(4));
    assert_eq!(
        repo.list_by_student(alice.id, Some(bio.id)).await.unwrap().len(),
        1
    );

    assert_eq!(repo.list_by_date(day(3), None).await.unwrap().len(), 3);
    assert_eq!(repo.list_by_date(day(3), Some(bio.id)).await.unwrap().len(), 1);
    assert!(repo.list_by_date(day(5), None).await.unwrap().is_empty());
}
