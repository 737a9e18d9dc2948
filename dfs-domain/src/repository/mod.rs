//! 仓储（Repository）
//!
//! 以集合的方式访问某一类型的持久化实体。对外操作（save/get/delete/update）
//! 在所有后端上语义一致，由默认方法统一实现：先把经手的实体登记到共享的
//! [`Seen`]，再调用后端钩子（find/insert/remove/replace）。后端只需实现钩子、
//! 规约查询与 commit/rollback。
//!
//! - 查询未命中返回 `None`，删除不存在的 id 为空操作，均不是错误；
//! - `get_by_spec` 返回第一个满足规约的实体，多条命中时不保证是哪一条；
//! - 带暂存区的后端在 commit 之前对 `get` 不可见（自动提交模式除外）。
//!
mod manager;
mod seen;

pub use manager::{RepositoryFactory, RepositoryManager};
pub use seen::Seen;

use crate::entity::{Entity, EntityRef};
use crate::error::DomainResult;
use crate::specification::Specification;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 可被任意存储后端持久化的实体
///
/// `#[entity]` 宏声明的实体自动满足该约束。
pub trait Persistable: Entity + Clone + Serialize + DeserializeOwned {}

impl<T> Persistable for T where T: Entity + Clone + Serialize + DeserializeOwned {}

/// 仓储接口
pub trait Repository<T: Entity> {
    /// 本仓储所属事务的已见实体集合
    fn seen(&self) -> &Seen<T::Event>;

    // --- 后端钩子 ---

    /// 按 id 查找已存储的实体
    fn find(&self, id: &T::Id) -> DomainResult<Option<EntityRef<T>>>;

    /// 存入实体
    fn insert(&mut self, entity: &EntityRef<T>) -> DomainResult<()>;

    /// 删除与该实体身份相同的记录
    fn remove(&mut self, entity: &EntityRef<T>) -> DomainResult<()>;

    /// 用给定实体的字段覆盖已存储的记录
    fn replace(&mut self, entity: &EntityRef<T>) -> DomainResult<()>;

    /// 返回第一个满足规约的实体
    fn get_by_spec(&self, spec: &dyn Specification<T>) -> DomainResult<Option<EntityRef<T>>>;

    /// 落盘暂存的修改；无暂存区的后端为空操作
    fn commit(&mut self) -> DomainResult<()> {
        Ok(())
    }

    /// 丢弃尚未提交的暂存修改
    fn rollback(&mut self) -> DomainResult<()>;

    // --- 对外操作 ---

    fn save(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        self.seen().track(entity);
        self.insert(entity)
    }

    /// 找到时登记到已见集合，即使之后没有任何修改，其事件也会被收集
    fn get(&self, id: &T::Id) -> DomainResult<Option<EntityRef<T>>> {
        let found = self.find(id)?;
        if let Some(entity) = &found {
            self.seen().track(entity);
        }
        Ok(found)
    }

    fn delete(&mut self, id: &T::Id) -> DomainResult<()> {
        if let Some(entity) = self.get(id)? {
            self.remove(&entity)?;
        }
        Ok(())
    }

    fn update(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        self.seen().track(entity);
        self.replace(entity)
    }
}
