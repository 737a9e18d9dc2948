//! 分层架构共享内核：领域层（dfs-domain）
//!
//! 提供应用中反复出现的领域构件：
//! - 实体与聚合根（`entity`），以及挂在实体上的事件发件箱（`domain_event`）
//! - 规约（`specification`）：按任意条件查询仓储
//! - 仓储（`repository`）：统一的 save/get/delete/update 门面、按类型路由的
//!   `RepositoryManager`，以及一次事务内共享的已见实体集合 `Seen`
//!
//! 具体存储后端（JSON 文件、快照文件、内存）位于 `dfs-infra`；
//! 工作单元与消息总线位于 `dfs-application`。
//!
//! 典型用法：
//! 1. 用 `#[entity]`/`#[aggregate_root]` 声明实体，并指定其领域事件类型；
//! 2. 领域逻辑通过 `Entity::raise` 记录事件；
//! 3. 经仓储读写实体时，实体被登记到 `Seen`，由工作单元统一收集事件。
//!
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod repository;
pub mod specification;

// 允许在本 crate 内部通过 ::dfs_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::dfs_domain 路径。
extern crate self as dfs_domain;
