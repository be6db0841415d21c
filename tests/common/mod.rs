#![allow(unused_imports)]

pub use todo_scheduler_test_utils::builders;
pub use todo_scheduler_test_utils::{
    init_tracing, memory_repo, memory_repo_with_prefs, with_timeout,
};
