mod assignments;
mod attendance;
mod auth;
mod certificates;
mod courses;
mod enrollments;
mod error;
pub mod populate;
mod quizzes;
mod results;
pub mod scoring;
mod stats;
mod submissions;
mod users;

use std::sync::Arc;

pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use auth::{AuthService, Session};
pub use certificates::CertificateService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use error::{ServiceError, ServiceResult};
pub use populate::Populated;
pub use quizzes::QuizService;
pub use results::ResultService;
pub use stats::StatsService;
pub use submissions::SubmissionService;
pub use users::UserService;

use crate::{
    auth::{PasswordHasher, TokenIssuer},
    db::DbPool,
};

/// Container for all LMS services.
///
/// Every operation follows the same order: load the target (not found
/// wins), ask the authorization policy, then touch the store.
#[derive(Clone)]
pub struct Services {
    db: Arc<DbPool>,
    pub auth: AuthService,
    pub users: UserService,
    pub courses: CourseService,
    pub enrollments: EnrollmentService,
    pub assignments: AssignmentService,
    pub submissions: SubmissionService,
    pub quizzes: QuizService,
    pub results: ResultService,
    pub attendance: AttendanceService,
    pub certificates: CertificateService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            auth: AuthService::new(db.clone(), hasher.clone(), tokens),
            users: UserService::new(db.clone(), hasher),
            courses: CourseService::new(db.clone()),
            enrollments: EnrollmentService::new(db.clone()),
            assignments: AssignmentService::new(db.clone()),
            submissions: SubmissionService::new(db.clone()),
            quizzes: QuizService::new(db.clone()),
            results: ResultService::new(db.clone()),
            attendance: AttendanceService::new(db.clone()),
            certificates: CertificateService::new(db.clone()),
            stats: StatsService::new(db.clone()),
            db,
        }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{AuthConfig, PasswordHashConfig};

    pub const TEST_JWT_SECRET: &str = "test-secret-0123456789abcdef";

    /// Auth settings with the cheapest Argon2 parameters the crate accepts.
    pub fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            password: PasswordHashConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        }
    }

    pub fn test_services(db: DbPool) -> Services {
        let config = test_auth_config();
        let hasher = PasswordHasher::new(&config.password).expect("valid argon2 params");
        Services::new(Arc::new(db), hasher, TokenIssuer::new(&config))
    }
}
