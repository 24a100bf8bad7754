pub mod task;
pub mod user;

pub use task::{NewTask, TagRow, Task, TaskRow};
pub use user::{validate_username, NewUser, User};
