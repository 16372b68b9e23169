#![forbid(unsafe_code)]

pub mod demo;
pub mod repository;

pub use repository::{
    InMemoryRepository, QuestionRepository, ResultId, ResultRepository, Storage, StorageError,
    TopicRepository,
};
