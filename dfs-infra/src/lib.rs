//! 分层架构共享内核：基础设施层（dfs-infra）
//!
//! 领域层仓储接口的具体存储后端：
//! - `JsonDatabase`：整文件 JSON 键值存储，带暂存区，commit 时整体改写文件
//! - `FileRepository`：按实体类型分组的快照文件仓储，默认自动提交
//! - `InMemoryRepository`：进程内仓储，无暂存区，可经工厂跨事务共享数据
//!
//! 所有后端均为单线程、无锁、无崩溃恢复；多个写者同时操作同一文件会相互覆盖。
//!
mod document;
pub mod file_repo;
pub mod inmemory_repo;
pub mod json_db;

pub use file_repo::{FileRepository, FileRepositoryFactory, FileStoreOptions};
pub use inmemory_repo::{Collection, InMemoryRepository, InMemoryRepositoryFactory};
pub use json_db::{JsonDatabase, JsonStoreOptions};
