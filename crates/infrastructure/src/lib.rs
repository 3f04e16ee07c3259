pub mod db;
pub mod memory;
pub mod todo_repository;
pub mod user_repository;

pub use db::*;
pub use memory::*;
pub use todo_repository::*;
pub use user_repository::*;
