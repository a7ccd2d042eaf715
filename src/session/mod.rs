mod storage;
mod store;

pub use storage::{MemoryStorage, Storage, KEY_APPROVAL, KEY_USERNAME, KEY_USER_TYPE};
pub use store::{ListenerId, Session, SessionStore, UserSession};
