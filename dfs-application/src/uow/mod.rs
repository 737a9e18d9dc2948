//! 工作单元（Unit of Work）
//!
//! 把一次业务操作期间的仓储读写视为一个事务：
//! - `commit`/`rollback` 由具体实现决定落到哪里；
//! - `add_event` 记录与任何实体都无关的事件；
//! - `pull_events` 先产出工作单元自身的事件（先进先出），再逐个取出事务内经手过的
//!   实体，取尽其事件。取出过程是破坏性的，同一批事件只会被产出一次；
//! - `enter` 返回作用域守卫，离开作用域时总是执行一次 `rollback`，已提交的内容不受影响。
//!
mod collector;
mod repository;
mod scope;

pub use collector::{EventCollector, PullEvents};
pub use repository::RepositoryUnitOfWork;
pub use scope::UnitOfWorkScope;

use crate::error::AppResult;
use dfs_domain::domain_event::DomainEvent;

pub trait UnitOfWork {
    type Event: DomainEvent;

    /// 事件收集器：工作单元自身的事件队列与本次事务的已见实体集合
    fn collector(&mut self) -> &mut EventCollector<Self::Event>;

    fn commit(&mut self) -> AppResult<()>;

    fn rollback(&mut self) -> AppResult<()>;

    fn add_event(&mut self, event: Self::Event) {
        self.collector().add_event(event);
    }

    fn pull_events(&mut self) -> PullEvents<'_, Self::Event> {
        self.collector().pull_events()
    }

    fn enter(&mut self) -> UnitOfWorkScope<'_, Self>
    where
        Self: Sized,
    {
        UnitOfWorkScope::new(self)
    }
}
