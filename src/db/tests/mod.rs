//! Repository tests against in-memory SQLite.
//!
//! Each module exercises one repository through its trait object, the
//! same way services reach it through `DbPool`.

mod attendance;
