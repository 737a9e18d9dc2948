//! 快照文件仓储
//!
//! 文件为一个 JSON 对象，按实体类型名分组：`{ "Person": [ {...}, ... ], ... }`。
//! 每个仓储实例只加载、只改写自己类型的那一组，同一文件可被多个类型的仓储共用。
//!
use crate::document;
use bon::Builder;
use dfs_domain::domain_event::DomainEvent;
use dfs_domain::entity::{Entity, EntityRef};
use dfs_domain::error::{DomainError, DomainResult};
use dfs_domain::repository::{Persistable, Repository, RepositoryFactory, Seen};
use dfs_domain::specification::Specification;
use serde_json::Value;
use std::mem;
use std::path::PathBuf;

#[derive(Builder, Debug, Clone)]
pub struct FileStoreOptions {
    #[builder(into)]
    pub path: PathBuf,
    /// 每次 save/update/delete 后立即提交
    #[builder(default = true)]
    pub auto_commit: bool,
}

// 暂存的写操作，commit 时按入队顺序执行
enum Staged<T: Entity> {
    Save(EntityRef<T>),
    Update(EntityRef<T>),
    Delete(T::Id),
}

/// 基于快照文件的仓储
///
/// - `save` 在提交时存入实体的深拷贝（不含待收集事件），同一 id 已存在时保留原记录；
/// - `update` 在提交时把实体的全部状态复制到已存储的记录上，记录自身的待收集事件保留；
///   记录不存在时提交失败；
/// - `delete` 在提交时按 id 删除；
/// - 读取只看已提交的记录；`get` 返回的是仓储持有的记录本身，直接修改它不会自动落盘，
///   需再次 `update` 或等下一次提交。
pub struct FileRepository<T: Entity> {
    seen: Seen<T::Event>,
    path: PathBuf,
    auto_commit: bool,
    records: Vec<EntityRef<T>>,
    staging: Vec<Staged<T>>,
}

impl<T: Persistable> FileRepository<T> {
    pub fn open(seen: Seen<T::Event>, options: &FileStoreOptions) -> DomainResult<Self> {
        let mut doc = document::read(&options.path)?;
        let records = match doc.remove(T::TYPE) {
            Some(group) => serde_json::from_value::<Vec<T>>(group)?
                .into_iter()
                .map(EntityRef::new)
                .collect(),
            None => Vec::new(),
        };
        tracing::debug!(
            path = %options.path.display(),
            entity_type = T::TYPE,
            records = records.len(),
            "snapshot store opened"
        );
        Ok(Self {
            seen,
            path: options.path.clone(),
            auto_commit: options.auto_commit,
            records,
            staging: Vec::new(),
        })
    }

    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// 尚未提交的操作数
    pub fn staged(&self) -> usize {
        self.staging.len()
    }

    fn stage(&mut self, op: Staged<T>) -> DomainResult<()> {
        self.staging.push(op);
        if self.auto_commit {
            Repository::commit(self)?;
        }
        Ok(())
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.records.iter().position(|r| r.borrow().id() == id)
    }

    fn apply(&mut self, op: Staged<T>) -> DomainResult<()> {
        match op {
            Staged::Save(entity) => {
                if self.position(&entity.id()).is_none() {
                    let mut copy = entity.snapshot();
                    copy.events_mut().clear();
                    self.records.push(EntityRef::new(copy));
                }
            }
            Staged::Update(entity) => {
                let id = entity.id();
                let Some(index) = self.position(&id) else {
                    return Err(DomainError::not_found(format!("{}#{}", T::TYPE, id)));
                };
                let stored = &self.records[index];
                if !stored.ptr_eq(&entity) {
                    let mut state = entity.snapshot();
                    let mut record = stored.borrow_mut();
                    mem::swap(state.events_mut(), record.events_mut());
                    *record = state;
                }
            }
            Staged::Delete(id) => {
                self.records.retain(|r| r.borrow().id() != &id);
            }
        }
        Ok(())
    }

    fn apply_batch(&mut self, ops: Vec<Staged<T>>) -> DomainResult<()> {
        for op in ops {
            self.apply(op)?;
        }
        self.flush()
    }

    // update 会原地改写记录，因此句柄和状态都要留底
    fn checkpoint(&self) -> Vec<(EntityRef<T>, T)> {
        self.records
            .iter()
            .map(|r| (r.clone(), r.snapshot()))
            .collect()
    }

    fn restore(&mut self, checkpoint: Vec<(EntityRef<T>, T)>) {
        self.records = checkpoint
            .into_iter()
            .map(|(handle, state)| {
                *handle.borrow_mut() = state;
                handle
            })
            .collect();
    }

    // 读-改-写：保留文件中其他类型的分组
    fn flush(&self) -> DomainResult<()> {
        let group = self
            .records
            .iter()
            .map(|r| serde_json::to_value(&*r.borrow()))
            .collect::<Result<Vec<Value>, _>>()?;
        let mut doc = document::read(&self.path)?;
        doc.insert(T::TYPE.to_string(), Value::Array(group));
        document::write(&self.path, &doc)
    }
}

impl<T: Persistable> Repository<T> for FileRepository<T> {
    fn seen(&self) -> &Seen<T::Event> {
        &self.seen
    }

    fn find(&self, id: &T::Id) -> DomainResult<Option<EntityRef<T>>> {
        Ok(self.position(id).map(|index| self.records[index].clone()))
    }

    fn insert(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        self.stage(Staged::Save(entity.clone()))
    }

    fn remove(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        self.stage(Staged::Delete(entity.id()))
    }

    fn replace(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        self.stage(Staged::Update(entity.clone()))
    }

    fn get_by_spec(&self, spec: &dyn Specification<T>) -> DomainResult<Option<EntityRef<T>>> {
        Ok(self
            .records
            .iter()
            .find(|r| spec.is_satisfied_by(&r.borrow()))
            .cloned())
    }

    /// 整批提交：任一操作或写盘失败时，内存中的记录恢复到提交前的状态，整批暂存作废
    fn commit(&mut self) -> DomainResult<()> {
        let staged = self.staging.len();
        let ops = mem::take(&mut self.staging);
        let before = self.checkpoint();
        if let Err(err) = self.apply_batch(ops) {
            self.restore(before);
            tracing::warn!(
                entity_type = T::TYPE,
                staged,
                error = %err,
                "snapshot store commit failed, batch discarded"
            );
            return Err(err);
        }
        tracing::debug!(
            entity_type = T::TYPE,
            staged,
            records = self.records.len(),
            "snapshot store committed"
        );
        Ok(())
    }

    fn rollback(&mut self) -> DomainResult<()> {
        tracing::debug!(
            entity_type = T::TYPE,
            staged = self.staging.len(),
            "snapshot store rolled back"
        );
        self.staging.clear();
        Ok(())
    }

    /// 删除按 id 暂存，提交时才执行，因此也能删除同一事务中尚未提交的记录
    fn delete(&mut self, id: &T::Id) -> DomainResult<()> {
        if let Some(entity) = self.find(id)? {
            self.seen.track(&entity);
        }
        self.stage(Staged::Delete(id.clone()))
    }
}

/// 为每种实体类型打开同一个快照文件的仓储工厂
#[derive(Debug, Clone)]
pub struct FileRepositoryFactory {
    options: FileStoreOptions,
}

impl FileRepositoryFactory {
    pub fn new(options: FileStoreOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FileStoreOptions {
        &self.options
    }
}

impl<E: DomainEvent> RepositoryFactory<E> for FileRepositoryFactory {
    fn create<T>(&self, seen: Seen<E>) -> DomainResult<Box<dyn Repository<T>>>
    where
        T: Persistable<Event = E>,
    {
        Ok(Box::new(FileRepository::<T>::open(seen, &self.options)?))
    }
}
