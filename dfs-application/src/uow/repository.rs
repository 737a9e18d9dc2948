use super::{EventCollector, UnitOfWork};
use crate::error::AppResult;
use dfs_domain::domain_event::DomainEvent;
use dfs_domain::repository::{RepositoryFactory, RepositoryManager, Seen};

/// 基于仓储管理器的工作单元
///
/// 事件收集器与仓储管理器共享同一份 `Seen`：经任意仓储读写的实体都会在
/// `pull_events` 时被收集。`commit`/`rollback` 作用于本工作单元已创建的全部仓储。
///
/// 每个逻辑事务应使用新的工作单元；跨事务共享数据时让工厂持有共享的存储。
pub struct RepositoryUnitOfWork<E, F> {
    collector: EventCollector<E>,
    repositories: RepositoryManager<E, F>,
}

impl<E, F> RepositoryUnitOfWork<E, F>
where
    E: DomainEvent,
    F: RepositoryFactory<E>,
{
    pub fn new(factory: F) -> Self {
        let seen = Seen::new();
        Self {
            collector: EventCollector::new(seen.clone()),
            repositories: RepositoryManager::new(seen, factory),
        }
    }

    pub fn repositories(&mut self) -> &mut RepositoryManager<E, F> {
        &mut self.repositories
    }
}

impl<E, F> UnitOfWork for RepositoryUnitOfWork<E, F>
where
    E: DomainEvent,
    F: RepositoryFactory<E>,
{
    type Event = E;

    fn collector(&mut self) -> &mut EventCollector<E> {
        &mut self.collector
    }

    fn commit(&mut self) -> AppResult<()> {
        tracing::debug!(
            repositories = ?self.repositories.managed_types(),
            "committing unit of work"
        );
        self.repositories.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> AppResult<()> {
        tracing::debug!("rolling back unit of work");
        self.repositories.rollback()?;
        Ok(())
    }
}
