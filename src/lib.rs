pub mod config;
pub mod dataset;
pub mod error;
pub mod lesson;
pub mod logging;
pub mod queries;
pub mod render;
pub mod selector;
pub mod server;

pub use dataset::{Dataset, Order};
pub use error::{DemoError, Result};
pub use lesson::{Lesson, LessonView};
pub use selector::MonthSelector;
