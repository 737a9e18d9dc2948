use dfs_domain::domain_event::DomainEvent;
use dfs_domain::entity::{Entity, EntityRef};
use dfs_domain::error::{DomainError, DomainResult};
use dfs_domain::repository::{Persistable, Repository, RepositoryFactory, Seen};
use dfs_domain::specification::Specification;
use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 可在多个仓储实例间共享的实体集合
///
/// 存放的是实体句柄本身而非拷贝：通过 `get` 取出的实体被修改后立即可见。
pub struct Collection<T> {
    items: Rc<RefCell<Vec<EntityRef<T>>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.find(id).is_some()
    }

    fn find(&self, id: &T::Id) -> Option<EntityRef<T>> {
        self.items
            .borrow()
            .iter()
            .find(|e| e.borrow().id() == id)
            .cloned()
    }
}

/// 内存仓储
///
/// 没有暂存区：save/delete 立即生效，`update` 与 `rollback` 为空操作。
/// 保存已存在的 id 时保留原有实体。
pub struct InMemoryRepository<T: Entity> {
    seen: Seen<T::Event>,
    collection: Collection<T>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new(seen: Seen<T::Event>) -> Self {
        Self::with_collection(seen, Collection::default())
    }

    pub fn with_collection(seen: Seen<T::Event>, collection: Collection<T>) -> Self {
        Self { seen, collection }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn seen(&self) -> &Seen<T::Event> {
        &self.seen
    }

    fn find(&self, id: &T::Id) -> DomainResult<Option<EntityRef<T>>> {
        Ok(self.collection.find(id))
    }

    fn insert(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        if !self.collection.contains(&entity.id()) {
            self.collection.items.borrow_mut().push(entity.clone());
        }
        Ok(())
    }

    fn remove(&mut self, entity: &EntityRef<T>) -> DomainResult<()> {
        let id = entity.id();
        self.collection
            .items
            .borrow_mut()
            .retain(|e| e.borrow().id() != &id);
        Ok(())
    }

    // 存放的就是共享句柄，无需复制字段
    fn replace(&mut self, _entity: &EntityRef<T>) -> DomainResult<()> {
        Ok(())
    }

    fn get_by_spec(&self, spec: &dyn Specification<T>) -> DomainResult<Option<EntityRef<T>>> {
        Ok(self
            .collection
            .items
            .borrow()
            .iter()
            .find(|e| spec.is_satisfied_by(&e.borrow()))
            .cloned())
    }

    fn rollback(&mut self) -> DomainResult<()> {
        Ok(())
    }
}

/// 内存仓储工厂
///
/// 按实体类型保存一份 [`Collection`]，由它创建的所有仓储共享同一份数据；
/// 配合 `Rc<InMemoryRepositoryFactory>` 可让多个工作单元看到彼此保存的实体。
#[derive(Default)]
pub struct InMemoryRepositoryFactory {
    collections: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl InMemoryRepositoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某一实体类型的共享集合（不存在时创建）
    pub fn collection<T: Entity>(&self) -> DomainResult<Collection<T>> {
        let mut collections = self.collections.borrow_mut();
        let slot = collections
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Collection::<T>::default()));
        slot.downcast_ref::<Collection<T>>()
            .cloned()
            .ok_or_else(|| DomainError::TypeMismatch {
                expected: type_name::<Collection<T>>().to_string(),
                found: "another collection type".to_string(),
            })
    }
}

impl<E: DomainEvent> RepositoryFactory<E> for InMemoryRepositoryFactory {
    fn create<T>(&self, seen: Seen<E>) -> DomainResult<Box<dyn Repository<T>>>
    where
        T: Persistable<Event = E>,
    {
        let collection = self.collection::<T>()?;
        Ok(Box::new(InMemoryRepository::with_collection(seen, collection)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfs_domain::specification::Criteria;
    use dfs_macros::{entity, event};

    #[event]
    enum BookEvent {
        Shelved,
    }

    #[entity(event = BookEvent)]
    struct Book {
        title: String,
    }

    fn book(id: &str, title: &str) -> EntityRef<Book> {
        let mut b = Book::new(id.to_string());
        b.title = title.to_string();
        EntityRef::new(b)
    }

    #[test]
    fn save_is_immediately_visible_and_shares_the_handle() {
        let mut repo = InMemoryRepository::new(Seen::new());
        let dune = book("b-1", "Dune");
        repo.save(&dune).unwrap();

        let found = repo.get(&"b-1".to_string()).unwrap().unwrap();
        assert!(found.ptr_eq(&dune));

        dune.borrow_mut().title = "Dune Messiah".into();
        assert_eq!(found.borrow().title, "Dune Messiah");
    }

    #[test]
    fn saving_a_known_id_keeps_the_first_entity() {
        let mut repo = InMemoryRepository::new(Seen::new());
        repo.save(&book("b-1", "first")).unwrap();
        repo.save(&book("b-1", "second")).unwrap();

        assert_eq!(repo.collection().len(), 1);
        let found = repo.get(&"b-1".to_string()).unwrap().unwrap();
        assert_eq!(found.borrow().title, "first");
    }

    #[test]
    fn delete_and_rollback() {
        let mut repo = InMemoryRepository::new(Seen::new());
        repo.save(&book("b-1", "Dune")).unwrap();

        repo.delete(&"b-1".to_string()).unwrap();
        repo.rollback().unwrap();

        assert!(repo.get(&"b-1".to_string()).unwrap().is_none());
        repo.delete(&"b-1".to_string()).unwrap();
    }

    #[test]
    fn get_by_spec_scans_the_collection() {
        let mut repo = InMemoryRepository::new(Seen::new());
        repo.save(&book("b-1", "Dune")).unwrap();
        repo.save(&book("b-2", "Emma")).unwrap();

        let emma = Criteria::new(|b: &Book| b.title == "Emma");
        let found = repo.get_by_spec(&emma).unwrap().unwrap();
        assert_eq!(found.id(), "b-2");

        let none = Criteria::new(|b: &Book| b.title.is_empty());
        assert!(repo.get_by_spec(&none).unwrap().is_none());
    }

    #[test]
    fn factory_shares_collections_per_type() {
        let factory = InMemoryRepositoryFactory::new();
        let mut first = factory.create::<Book>(Seen::new()).unwrap();
        first.save(&book("b-1", "Dune")).unwrap();

        let second = factory.create::<Book>(Seen::new()).unwrap();
        assert!(second.get(&"b-1".to_string()).unwrap().is_some());
        assert_eq!(factory.collection::<Book>().unwrap().len(), 1);
    }
}
