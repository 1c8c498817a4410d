pub mod controller;
pub mod cookie;
pub mod error;
pub mod executor;
pub mod memory_page;
pub mod page;
pub mod render;
pub mod users;

#[cfg(test)]
mod test_support;

pub use controller::{AssignmentState, AssignmentStep, PageController};
pub use error::ActionError;
pub use executor::{ActionOutcome, ActionTask, RequestExecutor};
pub use memory_page::{ElementState, MemoryPage, PageEffect};
pub use page::{ElementIds, PageContext, PageView, SelectOption};
pub use users::{MissingUserDirectory, StaticUserDirectory, UserDirectory};
