//! Static learning content
//!
//! Lessons and resources are compiled in; only quiz submissions are stored.

pub mod lessons;
pub mod progress;
pub mod resources;

pub use lessons::{find_lesson, lessons, Lesson, QuizGrade};
pub use progress::ProgressSummary;
pub use resources::{resources, Resource};
