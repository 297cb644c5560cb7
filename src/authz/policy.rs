//! The access-control rules.
//!
//! Rules are evaluated in a fixed order:
//!
//! 1. Nobody deletes their own account, whatever their role.
//! 2. Public resources need no caller; everything else does.
//! 3. Admins are allowed everything else.
//! 4. Per-resource ownership and role rules.
//! 5. Anything not explicitly allowed is denied.

use uuid::Uuid;

use super::AuthzError;
use crate::models::Role;

/// The authenticated principal making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_faculty(&self) -> bool {
        self.role == Role::Faculty
    }

    fn is(&self, id: Uuid) -> bool {
        self.id == id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// What a request touches, with the ownership facts the rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// One account.
    User { id: Uuid },
    /// The fields of an account only an admin may change: role and active flag.
    UserPrivileges,
    /// The account listing and admin-side account creation.
    UserDirectory,
    /// Registering a new account with the requested role.
    Registration { role: Role },
    /// Records scoped to the caller alone: profile, token refresh, the
    /// `my-*` listings, enrolling in a course, submitting coursework.
    OwnRecords,
    Course { instructor_id: Uuid },
    /// The public course catalog. Creating a course adds to it.
    CourseCatalog,
    Enrollment {
        user_id: Uuid,
        course_instructor_id: Uuid,
    },
    /// Enrollments listed by course or by user.
    EnrollmentRoster,
    Assignment { created_by: Uuid },
    /// A new assignment for the course taught by `course_instructor_id`.
    NewAssignment { course_instructor_id: Uuid },
    Quiz { created_by: Uuid },
    /// A new quiz for the course taught by `course_instructor_id`.
    NewQuiz { course_instructor_id: Uuid },
    /// Assignment and quiz listings. See [`list_scope`] for what a caller sees.
    CourseworkCatalog,
    Submission {
        user_id: Uuid,
        assignment_created_by: Uuid,
    },
    /// Every submission for one assignment.
    AssignmentSubmissions { assignment_created_by: Uuid },
    QuizResult { user_id: Uuid, quiz_created_by: Uuid },
    /// Every result for one quiz.
    QuizResults { quiz_created_by: Uuid },
    /// Every result of one user.
    UserResults { user_id: Uuid },
    /// Marking or reading attendance for the course taught by `instructor_id`.
    CourseAttendance { instructor_id: Uuid },
    StudentAttendance { student_id: Uuid },
    /// Attendance across courses for one date.
    AttendanceLedger,
    /// A completion certificate for the enrollment of `user_id`.
    Certificate { user_id: Uuid },
    Statistics,
}

/// Which assignments and quizzes a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    ActiveOnly,
}

/// Decide whether `caller` may perform `action` on `resource`.
///
/// `None` is an anonymous request. The function is pure; every ownership
/// fact it needs is carried in `resource`.
pub fn authorize(
    caller: Option<&Caller>,
    action: Action,
    resource: &Resource,
) -> Result<(), AuthzError> {
    if let (Some(caller), Action::Delete, Resource::User { id }) = (caller, action, resource)
        && caller.is(*id)
    {
        return Err(AuthzError::forbidden("You cannot delete yourself"));
    }

    if is_public(action, resource) {
        return Ok(());
    }

    let Some(caller) = caller else {
        // Registering an admin is a privilege question, not an identity one.
        if matches!(resource, Resource::Registration { .. }) {
            return Err(deny(action, resource));
        }
        return Err(AuthzError::Unauthenticated);
    };

    if caller.is_admin() || permits(caller, action, resource) {
        Ok(())
    } else {
        Err(deny(action, resource))
    }
}

/// Students only see active coursework. Nobody's view depends on enrollment.
pub fn list_scope(caller: &Caller) -> ListScope {
    match caller.role {
        Role::Admin | Role::Faculty => ListScope::All,
        Role::Student => ListScope::ActiveOnly,
    }
}

fn is_public(action: Action, resource: &Resource) -> bool {
    match (action, resource) {
        (Action::Read, Resource::Course { .. } | Resource::CourseCatalog) => true,
        (Action::Create, Resource::Registration { role }) => *role != Role::Admin,
        _ => false,
    }
}

fn permits(caller: &Caller, action: Action, resource: &Resource) -> bool {
    use Action::*;

    match (*resource, action) {
        (Resource::User { id }, Read | Update) => caller.is(id),
        (Resource::OwnRecords, _) => true,

        (Resource::Course { instructor_id }, Update | Delete) => {
            caller.is_faculty() && caller.is(instructor_id)
        }
        (Resource::CourseCatalog, Create) => caller.is_faculty(),

        (
            Resource::Enrollment {
                user_id,
                course_instructor_id,
            },
            Update,
        ) => caller.is(user_id) && (!caller.is_faculty() || caller.is(course_instructor_id)),
        (Resource::Enrollment { user_id, .. }, Read | Delete) => caller.is(user_id),
        (Resource::EnrollmentRoster, Read) => caller.is_faculty(),

        (Resource::Assignment { .. } | Resource::Quiz { .. }, Read) => true,
        (Resource::Assignment { created_by } | Resource::Quiz { created_by }, Update | Delete) => {
            caller.is_faculty() && caller.is(created_by)
        }
        (
            Resource::NewAssignment {
                course_instructor_id,
            }
            | Resource::NewQuiz {
                course_instructor_id,
            },
            Create,
        ) => caller.is_faculty() && caller.is(course_instructor_id),
        (Resource::CourseworkCatalog, Read) => true,

        (
            Resource::Submission {
                user_id,
                assignment_created_by,
            },
            Read,
        ) => caller.is(user_id) || caller.is(assignment_created_by),
        (
            Resource::Submission {
                assignment_created_by,
                ..
            },
            Update,
        ) => caller.is(assignment_created_by),
        (
            Resource::AssignmentSubmissions {
                assignment_created_by,
            },
            Read,
        ) => caller.is(assignment_created_by),

        (
            Resource::QuizResult {
                user_id,
                quiz_created_by,
            },
            Read,
        ) => caller.is(user_id) || caller.is(quiz_created_by),
        (Resource::QuizResults { quiz_created_by }, Read) => {
            caller.is_faculty() && caller.is(quiz_created_by)
        }
        (Resource::UserResults { user_id }, Read) => caller.is(user_id) || caller.is_faculty(),

        (Resource::CourseAttendance { instructor_id }, Read | Create) => {
            caller.is_faculty() && caller.is(instructor_id)
        }
        (Resource::StudentAttendance { student_id }, Read) => caller.is(student_id),
        (Resource::AttendanceLedger, Read) => caller.is_faculty(),

        (Resource::Certificate { user_id }, Read) => caller.is(user_id),

        _ => false,
    }
}

fn deny(action: Action, resource: &Resource) -> AuthzError {
    use Action::*;

    let reason = match (resource, action) {
        (Resource::UserPrivileges | Resource::UserDirectory | Resource::Statistics, _) => {
            "Access denied. Admin only."
        }
        (Resource::Registration { .. }, _) => "Only an admin can create admin accounts",
        (Resource::Course { .. }, Delete) => "Not authorized to delete this course",
        (Resource::Course { .. }, _) => "Not authorized to update this course",
        (Resource::Enrollment { .. }, _) => "Not authorized to access this enrollment",
        (Resource::Certificate { .. }, _) => "Not authorized to access this enrollment",
        (Resource::Assignment { .. }, Delete) => "Not authorized to delete this assignment",
        (Resource::Assignment { .. }, _) => "Not authorized to update this assignment",
        (Resource::NewAssignment { .. }, _) => {
            "Not authorized to create assignment for this course"
        }
        (Resource::Quiz { .. }, Delete) => "Not authorized to delete this quiz",
        (Resource::Quiz { .. }, _) => "Not authorized to update this quiz",
        (Resource::NewQuiz { .. }, _) => "Not authorized to create quiz for this course",
        (Resource::Submission { .. }, Update) => "Not authorized to grade this submission",
        (Resource::Submission { .. }, _) => "Not authorized to view this submission",
        (Resource::AssignmentSubmissions { .. }, _) => {
            "Not authorized to view submissions for this assignment"
        }
        (Resource::QuizResult { .. }, _) => "Not authorized to view this result",
        (Resource::QuizResults { .. }, _) => "Not authorized to view results for this quiz",
        (Resource::UserResults { .. }, _) => "Not authorized to view results for this user",
        _ => "Access denied",
    };
    AuthzError::forbidden(reason)
}
