pub mod errors;
pub mod repository;
pub mod service;
pub mod todo;
pub mod user;

pub use errors::*;
pub use repository::*;
pub use service::*;
pub use todo::*;
pub use user::*;
