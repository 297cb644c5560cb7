//! HTTP surface. Everything except the health checks is mounted under `/api`.

mod assignments;
mod attendance;
mod auth;
mod certificates;
mod courses;
mod enrollments;
mod envelope;
mod error;
mod extract;
pub mod health;
mod quizzes;
mod results;
mod stats;
mod submissions;
mod users;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use envelope::{Envelope, ProfileBody, SessionBody};
pub use error::ApiError;
use extract::{ApiPath, ApiQuery, ValidJson};

use crate::{AppState, middleware::identity_middleware};

/// Build the `/api` router.
///
/// Login and logout skip identity resolution so that a stale cookie never
/// blocks signing in or out. Every other route sees the resolved caller.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let identified = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh-token", post(auth::refresh))
        .route("/auth/profile", get(auth::profile))
        .route("/users", get(users::list).post(users::create))
        .route("/users/change-role/{id}", put(users::change_role))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/courses", get(courses::list).post(courses::create))
        .route("/courses/my-courses", get(courses::my_courses))
        .route("/courses/category/{category}", get(courses::by_category))
        .route(
            "/courses/{id}",
            get(courses::get).put(courses::update).delete(courses::delete),
        )
        .route("/enrollments", post(enrollments::create))
        .route("/enrollments/my-enrollments", get(enrollments::mine))
        .route("/enrollments/course/{course_id}", get(enrollments::by_course))
        .route("/enrollments/user/{user_id}", get(enrollments::by_user))
        .route(
            "/enrollments/{id}",
            put(enrollments::update).delete(enrollments::delete),
        )
        .route(
            "/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route("/assignments/course/{course_id}", get(assignments::by_course))
        .route(
            "/assignments/{id}",
            get(assignments::get)
                .put(assignments::update)
                .delete(assignments::delete),
        )
        .route(
            "/submissions",
            get(submissions::by_assignment).post(submissions::create),
        )
        .route("/submissions/my-submissions", get(submissions::mine))
        .route(
            "/submissions/{id}",
            get(submissions::get).put(submissions::grade),
        )
        .route("/quizzes", get(quizzes::list).post(quizzes::create))
        .route("/quizzes/course/{course_id}", get(quizzes::by_course))
        .route(
            "/quizzes/{id}",
            get(quizzes::get).put(quizzes::update).delete(quizzes::delete),
        )
        .route("/results", get(results::by_quiz).post(results::create))
        .route("/results/user/{user_id}", get(results::by_user))
        .route("/results/{id}", get(results::get))
        .route("/attendance", post(attendance::mark))
        .route("/attendance/course/{course_id}", get(attendance::by_course))
        .route(
            "/attendance/student/{student_id}",
            get(attendance::by_student),
        )
        .route("/attendance/date/{date}", get(attendance::by_date))
        .route("/admin/stats", get(stats::overview))
        .route(
            "/certificates/generate/{enrollment_id}",
            get(certificates::generate),
        )
        .route_layer(middleware::from_fn_with_state(state, identity_middleware));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .merge(identified)
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
