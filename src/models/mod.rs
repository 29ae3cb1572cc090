pub mod datetime;
pub mod response;
pub mod task;
pub mod user;

pub use response::{DataResponse, ErrorBody, MessageDataResponse, MessageResponse};
pub use task::{
    CreateTaskRequest, NewTask, Owner, Task, TaskDraft, TaskFilter, TaskPatch, TaskPriority, TaskQuery,
    TaskView,
};
pub use user::{NewUser, User, UserView, ROLE_USER};
