//! Data models for portal entities.
//!
//! This module contains the typed records decoded from API responses:
//!
//! - `Student`, `StudentRoster`: the accounts selectable after login
//! - `Period`, `GradesTable`: grading periods and estimate table keys
//! - `Announcement`, `AnnouncementFile`: school announcements

pub mod announcement;
pub mod estimate;
pub mod student;

pub use announcement::{Announcement, AnnouncementFile};
pub use estimate::{GradesTable, Period, ANY_ID};
pub use student::{Student, StudentRoster};
