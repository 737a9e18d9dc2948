//! 领域事件（Domain Event）与实体发件箱
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及实体上暂存已发生、
//! 尚未被工作单元收集的事件队列（`Outbox`）。

mod domain_event_trait;
mod outbox;

pub use domain_event_trait::DomainEvent;
pub use outbox::Outbox;
