mod assignments;
mod attendance;
mod common;
mod courses;
mod enrollments;
mod quizzes;
mod results;
mod submissions;
mod users;

pub use assignments::SqliteAssignmentRepo;
pub use attendance::SqliteAttendanceRepo;
pub use courses::SqliteCourseRepo;
pub use enrollments::SqliteEnrollmentRepo;
pub use quizzes::SqliteQuizRepo;
pub use results::SqliteResultRepo;
pub use submissions::SqliteSubmissionRepo;
pub use users::SqliteUserRepo;
