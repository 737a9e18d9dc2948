use super::{Persistable, Repository, Seen};
use crate::domain_event::DomainEvent;
use crate::entity::EntityRef;
use crate::error::{DomainError, DomainResult};
use crate::specification::Specification;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

/// 仓储工厂：为某一实体类型创建绑定到给定 `Seen` 的仓储实例
pub trait RepositoryFactory<E: DomainEvent> {
    fn create<T>(&self, seen: Seen<E>) -> DomainResult<Box<dyn Repository<T>>>
    where
        T: Persistable<Event = E>;
}

impl<E, F> RepositoryFactory<E> for Rc<F>
where
    E: DomainEvent,
    F: RepositoryFactory<E>,
{
    fn create<T>(&self, seen: Seen<E>) -> DomainResult<Box<dyn Repository<T>>>
    where
        T: Persistable<Event = E>,
    {
        (**self).create(seen)
    }
}

// 类型擦除后的仓储：只暴露事务相关操作，其余按具体类型还原后调用
trait ManagedRepository {
    fn entity_type(&self) -> &'static str;
    fn commit(&mut self) -> DomainResult<()>;
    fn rollback(&mut self) -> DomainResult<()>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Slot<T: Persistable>(Box<dyn Repository<T>>);

impl<T: Persistable> ManagedRepository for Slot<T> {
    fn entity_type(&self) -> &'static str {
        T::TYPE
    }

    fn commit(&mut self) -> DomainResult<()> {
        self.0.commit()
    }

    fn rollback(&mut self) -> DomainResult<()> {
        self.0.rollback()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 按实体类型路由的仓储管理器
///
/// - 每种实体类型在首次访问时由工厂惰性创建一个仓储，并共享同一份 `Seen`；
/// - `get`/`get_by_spec`/`save`/`update` 转发给对应类型的仓储；
/// - `delete` 直接调用后端删除钩子，不经过「先 get 再判断」的流程，也不登记实体；
/// - `commit`/`rollback` 作用于已创建的全部仓储。
pub struct RepositoryManager<E, F> {
    seen: Seen<E>,
    factory: F,
    repositories: HashMap<TypeId, Box<dyn ManagedRepository>>,
}

impl<E, F> RepositoryManager<E, F>
where
    E: DomainEvent,
    F: RepositoryFactory<E>,
{
    pub fn new(seen: Seen<E>, factory: F) -> Self {
        Self {
            seen,
            factory,
            repositories: HashMap::new(),
        }
    }

    pub fn seen(&self) -> &Seen<E> {
        &self.seen
    }

    /// 获取（必要时创建）某一实体类型的仓储
    pub fn repository<T>(&mut self) -> DomainResult<&mut (dyn Repository<T> + 'static)>
    where
        T: Persistable<Event = E>,
    {
        let slot = match self.repositories.entry(TypeId::of::<T>()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(entity_type = T::TYPE, "creating repository");
                let repo = self.factory.create::<T>(self.seen.clone())?;
                entry.insert(Box::new(Slot(repo)))
            }
        };

        let found = slot.entity_type();
        match slot.as_any_mut().downcast_mut::<Slot<T>>() {
            Some(Slot(repo)) => Ok(repo.as_mut()),
            None => Err(DomainError::TypeMismatch {
                expected: type_name::<T>().to_string(),
                found: found.to_string(),
            }),
        }
    }

    pub fn get<T>(&mut self, id: &T::Id) -> DomainResult<Option<EntityRef<T>>>
    where
        T: Persistable<Event = E>,
    {
        self.repository::<T>()?.get(id)
    }

    pub fn get_by_spec<T>(
        &mut self,
        spec: &dyn Specification<T>,
    ) -> DomainResult<Option<EntityRef<T>>>
    where
        T: Persistable<Event = E>,
    {
        self.repository::<T>()?.get_by_spec(spec)
    }

    pub fn save<T>(&mut self, entity: &EntityRef<T>) -> DomainResult<()>
    where
        T: Persistable<Event = E>,
    {
        self.repository::<T>()?.save(entity)
    }

    pub fn update<T>(&mut self, entity: &EntityRef<T>) -> DomainResult<()>
    where
        T: Persistable<Event = E>,
    {
        self.repository::<T>()?.update(entity)
    }

    pub fn delete<T>(&mut self, entity: &EntityRef<T>) -> DomainResult<()>
    where
        T: Persistable<Event = E>,
    {
        self.repository::<T>()?.remove(entity)
    }

    /// 提交全部已创建的仓储
    pub fn commit(&mut self) -> DomainResult<()> {
        for repo in self.repositories.values_mut() {
            tracing::debug!(entity_type = repo.entity_type(), "committing repository");
            repo.commit()?;
        }
        Ok(())
    }

    /// 回滚全部已创建的仓储
    pub fn rollback(&mut self) -> DomainResult<()> {
        for repo in self.repositories.values_mut() {
            tracing::debug!(entity_type = repo.entity_type(), "rolling back repository");
            repo.rollback()?;
        }
        Ok(())
    }

    /// 已创建仓储的实体类型名
    pub fn managed_types(&self) -> Vec<&'static str> {
        self.repositories.values().map(|r| r.entity_type()).collect()
    }
}
