mod assignment;
mod attendance;
mod course;
mod enrollment;
mod quiz;
mod report;
mod result;
mod submission;
mod user;
mod validators;

pub use assignment::*;
pub use attendance::*;
pub use course::*;
pub use enrollment::*;
pub use quiz::*;
pub use report::*;
pub use result::*;
pub use submission::*;
pub use user::*;
