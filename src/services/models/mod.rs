/*
 * Responsibility
 * - model レコードの型とディレクトリ (永続化境界) の trait
 * - 既定実装はプロセス内メモリ
 */
pub mod directory;
pub mod memory;
pub mod types;

pub use directory::{ModelDirectory, ModelError};
pub use memory::InMemoryModelDirectory;
pub use types::{CreateModelRequest, Model, ModelStatus, ModelType, UpdateModelRequest};
