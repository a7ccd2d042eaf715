pub mod auth_modal;
pub mod chat_message;
pub mod chat_panel;
pub mod course_card;
pub mod header;
pub mod notifications;
pub mod question_card;
pub mod tutor_applications;
pub mod user_table;

pub use auth_modal::*;
pub use chat_message::*;
pub use chat_panel::*;
pub use course_card::*;
pub use header::*;
pub use notifications::*;
pub use question_card::*;
pub use tutor_applications::*;
pub use user_table::*;
