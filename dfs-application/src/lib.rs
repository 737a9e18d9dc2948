//! 分层架构共享内核：应用层（dfs-application）
//!
//! - `command`/`message`：命令与总线上流转的消息
//! - `uow`：工作单元，负责提交/回滚并收集本次事务产生的领域事件
//! - `command_handler`/`event_handler`/`handler_registry`：按类型名注册的处理器
//! - `message_bus`：同步派发命令与事件，并把处理过程中产生的新事件继续派发下去
//!
pub mod command;
pub mod command_handler;
pub mod error;
pub mod event_handler;
pub mod handler_registry;
pub mod message;
pub mod message_bus;
pub mod uow;

pub use handler_registry::HandlerRegistry;
pub use message::Message;
pub use message_bus::{DispatchOrder, MessageBus, MessageBusConfig};
pub use uow::{RepositoryUnitOfWork, UnitOfWork};

// 允许过程宏生成的 ::dfs_application 路径在本 crate 的测试中解析
extern crate self as dfs_application;
