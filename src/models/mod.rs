mod chat;
mod course;
mod question;
pub mod timestamp;
mod user;

pub use chat::{ChatMessage, Sender};
pub use course::{star_bar, video_label, Chapter, ChapterRating, Course};
pub use question::Question;
pub use user::{ApprovalDecision, ApprovalStatus, TutorProfile, User, UserRole};
