pub mod admin;
pub mod courses;
pub mod home;
pub mod questions;

pub use admin::*;
pub use courses::*;
pub use home::*;
pub use questions::*;
