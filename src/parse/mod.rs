pub mod task_parser;
pub mod task_serializer;

pub use task_parser::{ParseError, parse_task};
pub use task_serializer::serialize_task;
