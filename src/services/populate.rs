//! Embed referenced users and courses into response records.
//!
//! A record lists its references through [`References`]; [`populate`] then
//! batch-loads every referenced summary with one query per collection and
//! merges them into the serialized record under the reference's key. A
//! reference whose target has been deleted serializes as `null`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::ServiceResult;
use crate::{
    db::{DbError, DbPool, Page},
    models::{Assignment, Attendance, Course, Enrollment, Quiz, QuizResult, Submission},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ref {
    User(Uuid),
    Course(Uuid),
}

pub trait References {
    /// `(response key, referenced record)` pairs.
    fn references(&self) -> Vec<(&'static str, Ref)>;
}

/// A record with its references resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Populated<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(flatten)]
    pub refs: BTreeMap<&'static str, Value>,
}

pub async fn populate<T>(db: &DbPool, records: Vec<T>) -> ServiceResult<Vec<Populated<T>>>
where
    T: References,
{
    let mut user_ids = Vec::new();
    let mut course_ids = Vec::new();
    for record in &records {
        for (_, reference) in record.references() {
            match reference {
                Ref::User(id) => user_ids.push(id),
                Ref::Course(id) => course_ids.push(id),
            }
        }
    }
    dedup(&mut user_ids);
    dedup(&mut course_ids);

    let mut users = HashMap::with_capacity(user_ids.len());
    if !user_ids.is_empty() {
        for summary in db.users().get_summaries(&user_ids).await? {
            users.insert(summary.id, to_value(&summary)?);
        }
    }
    let mut courses = HashMap::with_capacity(course_ids.len());
    if !course_ids.is_empty() {
        for summary in db.courses().get_summaries(&course_ids).await? {
            courses.insert(summary.id, to_value(&summary)?);
        }
    }

    Ok(records
        .into_iter()
        .map(|record| {
            let refs = record
                .references()
                .into_iter()
                .map(|(key, reference)| {
                    let value = match reference {
                        Ref::User(id) => users.get(&id),
                        Ref::Course(id) => courses.get(&id),
                    };
                    (key, value.cloned().unwrap_or(Value::Null))
                })
                .collect();
            Populated { record, refs }
        })
        .collect())
}

pub async fn populate_one<T>(db: &DbPool, record: T) -> ServiceResult<Populated<T>>
where
    T: References,
{
    let mut populated = populate(db, vec![record]).await?;
    populated
        .pop()
        .ok_or_else(|| DbError::Internal("populate dropped a record".into()).into())
}

pub async fn populate_page<T>(db: &DbPool, page: Page<T>) -> ServiceResult<Page<Populated<T>>>
where
    T: References,
{
    let Page {
        items,
        total,
        params,
    } = page;
    Ok(Page {
        items: populate(db, items).await?,
        total,
        params,
    })
}

fn dedup(ids: &mut Vec<Uuid>) {
    ids.sort_unstable();
    ids.dedup();
}

fn to_value(summary: &impl Serialize) -> Result<Value, DbError> {
    Ok(serde_json::to_value(summary)?)
}

impl References for Course {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![("instructor", Ref::User(self.instructor_id))]
    }
}

impl References for Enrollment {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![
            ("user", Ref::User(self.user_id)),
            ("course", Ref::Course(self.course_id)),
        ]
    }
}

impl References for Assignment {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![
            ("course", Ref::Course(self.course_id)),
            ("creator", Ref::User(self.created_by)),
        ]
    }
}

impl References for Quiz {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![
            ("course", Ref::Course(self.course_id)),
            ("creator", Ref::User(self.created_by)),
        ]
    }
}

impl References for Submission {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![("user", Ref::User(self.user_id))]
    }
}

impl References for QuizResult {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![("user", Ref::User(self.user_id))]
    }
}

impl References for Attendance {
    fn references(&self) -> Vec<(&'static str, Ref)> {
        vec![
            ("user", Ref::User(self.user_id)),
            ("course", Ref::Course(self.course_id)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::Role,
    };

    #[tokio::test]
    async fn test_populate_embeds_summaries() {
        let db = create_test_db().await;
        let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
        let student = insert_user(&db, "stu@example.com", Role::Student).await;
        let course = insert_course(&db, instructor.id, "Distributed Systems").await;
        let enrollment = db.enrollments().create(student.id, course.id).await.unwrap();

        let populated = populate_one(&db, enrollment).await.unwrap();
        let json = serde_json::to_value(&populated).unwrap();

        assert_eq!(json["userId"], student.id.to_string());
        assert_eq!(json["user"]["email"], "stu@example.com");
        assert!(json["user"].get("passwordHash").is_none());
        assert_eq!(json["course"]["title"], "Distributed Systems");
    }

    #[tokio::test]
    async fn test_populate_shares_lookups_across_records() {
        let db = create_test_db().await;
        let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
        let first = insert_course(&db, instructor.id, "Operating Systems").await;
        let second = insert_course(&db, instructor.id, "Computer Networks").await;

        let populated = populate(&db, vec![first, second]).await.unwrap();
        assert_eq!(populated.len(), 2);
        for course in &populated {
            assert_eq!(course.refs["instructor"]["firstName"], "Test");
        }
    }

    #[tokio::test]
    async fn test_populate_empty() {
        let db = create_test_db().await;
        let populated = populate::<Course>(&db, vec![]).await.unwrap();
        assert!(populated.is_empty());
    }
}
