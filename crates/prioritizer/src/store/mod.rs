//! Task store layer.
//!
//! The workflow talks to the store only through [`TaskStore`]; the Google
//! Tasks REST client is the production implementation.

mod google;
mod traits;

pub use google::GoogleTasksStore;
pub use traits::{find_list_by_title, set_task_status, TaskStore};
