//! 实体（Entity）与聚合根（AggregateRoot）基础抽象
//!
//! 实体以「具体类型 + 标识」定义身份：同类型实体只比较 id，跨类型身份由
//! [`EntityKey`] 表达。每个实体挂载一个 [`Outbox`]，领域逻辑产生的事件先暂存
//! 在这里，再由工作单元统一收集。
//!
//! 仓储与工作单元之间以 [`EntityRef`] 共享同一个实体实例：处理器对实体的修改与
//! 记录的事件，工作单元都能看到。
//!
use crate::domain_event::{DomainEvent, Outbox};
use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// 具备唯一标识与事件发件箱的实体抽象
///
/// 约定：id 一经分配不可修改，且在同一类型内唯一。
pub trait Entity: Sized + 'static {
    /// 实体标识类型
    type Id: Clone + Eq + Hash + Display + Debug + 'static;
    /// 该实体产生的领域事件类型
    type Event: DomainEvent;

    /// 实体类型名，用于日志与快照文件分组
    ///
    /// 宏默认取结构体名（不含模块路径），同一存储中的实体类型必须各不相同，
    /// 重名时可用 `#[entity(name = "...")]` 指定。
    const TYPE: &'static str;

    /// 使用给定标识创建实体，其余字段取默认值
    fn new(id: Self::Id) -> Self;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 待收集的领域事件
    fn events(&self) -> &Outbox<Self::Event>;

    fn events_mut(&mut self) -> &mut Outbox<Self::Event>;

    /// 记录一个领域事件
    fn raise(&mut self, event: Self::Event) {
        self.events_mut().push(event);
    }

    /// 跨类型可比较的身份键
    fn key(&self) -> EntityKey {
        EntityKey::of::<Self>(self.id())
    }
}

/// 聚合根：一组相关对象的一致性边界，本身不增加字段
pub trait AggregateRoot: Entity {}

/// 两个实体（可能不同类型）是否为同一身份
pub fn same_identity<A: Entity, B: Entity>(a: &A, b: &B) -> bool {
    a.key() == b.key()
}

/// 实体身份键：具体类型 + 标识
///
/// 相等当且仅当具体类型相同且 id 按自身的 `Eq` 相等；`Display` 形式为 `TYPE#id`，
/// 只用于日志。
#[derive(Clone, Debug)]
pub struct EntityKey {
    type_id: TypeId,
    type_name: &'static str,
    id: Rc<dyn ErasedId>,
}

impl EntityKey {
    pub fn of<T: Entity>(id: &T::Id) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: T::TYPE,
            id: Rc::new(id.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 取回原始类型的 id；类型不符时为 `None`
    pub fn id<I: 'static>(&self) -> Option<&I> {
        self.id.as_any().downcast_ref()
    }
}

impl PartialEq for EntityKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.id.eq_erased(&*other.id)
    }
}

impl Eq for EntityKey {}

impl Hash for EntityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.id.hash_erased(state);
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}

// 擦除类型后的实体 id，比较与哈希仍走原类型的实现
trait ErasedId: Display + Debug {
    fn as_any(&self) -> &dyn Any;

    fn eq_erased(&self, other: &dyn ErasedId) -> bool;

    fn hash_erased(&self, state: &mut dyn Hasher);
}

impl<I: Eq + Hash + Display + Debug + 'static> ErasedId for I {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn ErasedId) -> bool {
        other.as_any().downcast_ref::<I>() == Some(self)
    }

    fn hash_erased(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// 共享的实体句柄
///
/// 克隆句柄不会复制实体；相等性遵循实体身份（同类型同 id）。
pub struct EntityRef<T> {
    inner: Rc<RefCell<T>>,
}

impl<T: Entity> EntityRef<T> {
    pub fn new(entity: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(entity)),
        }
    }

    /// 只读借用实体。持有期间不可再可变借用同一实体。
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    pub fn id(&self) -> T::Id {
        self.inner.borrow().id().clone()
    }

    pub fn key(&self) -> EntityKey {
        self.inner.borrow().key()
    }

    /// 在实体上记录一个领域事件
    pub fn raise(&self, event: T::Event) {
        self.inner.borrow_mut().raise(event);
    }

    /// 是否指向同一个实例（而不仅是同一身份）
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 复制出当前状态
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for EntityRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Entity> From<T> for EntityRef<T> {
    fn from(entity: T) -> Self {
        Self::new(entity)
    }
}

impl<T: Entity> PartialEq for EntityRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.borrow().id() == other.borrow().id()
    }
}

impl<T: Entity> Eq for EntityRef<T> {}

impl<T: Debug> Debug for EntityRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(entity) => f.debug_tuple("EntityRef").field(&*entity).finish(),
            Err(_) => f.write_str("EntityRef(<borrowed>)"),
        }
    }
}

/// 事件来源：可被工作单元逐个取出事件的对象（类型擦除后存放于 `Seen`）
pub trait EventSource<E> {
    fn key(&self) -> EntityKey;

    /// 取出最早的待收集事件
    fn pop_event(&self) -> Option<E>;

    fn pending_events(&self) -> usize;
}

impl<T: Entity> EventSource<T::Event> for EntityRef<T> {
    fn key(&self) -> EntityKey {
        EntityRef::key(self)
    }

    fn pop_event(&self) -> Option<T::Event> {
        self.inner.borrow_mut().events_mut().pop()
    }

    fn pending_events(&self) -> usize {
        self.inner.borrow().events().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfs_macros::{aggregate_root, entity, event};
    use std::collections::HashSet;

    #[event]
    enum PersonEvent {
        Renamed { name: String },
        Archived,
    }

    #[entity(event = PersonEvent)]
    struct Person {
        name: String,
    }

    #[aggregate_root(event = PersonEvent)]
    struct Household {
        members: Vec<String>,
    }

    fn person(id: &str, name: &str) -> Person {
        let mut p = Person::new(id.to_string());
        p.name = name.to_string();
        p
    }

    #[test]
    fn same_type_equality_compares_ids_only() {
        let bob = person("1", "bob");
        let renamed = person("1", "robert");
        let other = person("2", "bob");

        assert_eq!(bob, renamed);
        assert_ne!(bob, other);

        let set: HashSet<Person> = [bob, renamed, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn identity_includes_concrete_type() {
        let p = person("1", "bob");
        let h = Household::new("1".to_string());

        assert!(!same_identity(&p, &h));
        assert!(same_identity(&p, &person("1", "alice")));
        assert_eq!(p.key().to_string(), "Person#1");
        assert_eq!(h.key().type_name(), "Household");
    }

    // Display 相同但并不相等的 id
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Slot {
        shelf: u8,
        label: &'static str,
    }

    impl Display for Slot {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.label)
        }
    }

    #[derive(Clone, Debug)]
    struct Crate {
        id: Slot,
        events: Outbox<PersonEvent>,
    }

    impl Entity for Crate {
        type Id = Slot;
        type Event = PersonEvent;

        const TYPE: &'static str = "Crate";

        fn new(id: Slot) -> Self {
            Self {
                id,
                events: Outbox::default(),
            }
        }

        fn id(&self) -> &Slot {
            &self.id
        }

        fn events(&self) -> &Outbox<PersonEvent> {
            &self.events
        }

        fn events_mut(&mut self) -> &mut Outbox<PersonEvent> {
            &mut self.events
        }
    }

    #[test]
    fn keys_compare_ids_by_value_not_by_display() {
        let low = Slot { shelf: 1, label: "a" };
        let high = Slot { shelf: 2, label: "a" };
        let a = Crate::new(low.clone());
        let b = Crate::new(high);

        assert_eq!(a.key().to_string(), b.key().to_string());
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), Crate::new(low.clone()).key());
        assert_eq!(a.key().id::<Slot>(), Some(&low));
        assert_eq!(a.key().id::<String>(), None);

        let keys: HashSet<EntityKey> = [a.key(), b.key(), a.key()].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn raised_events_are_popped_in_order() {
        let handle = EntityRef::new(person("1", "bob"));
        handle.raise(PersonEvent::Renamed {
            name: "robert".into(),
        });
        handle.raise(PersonEvent::Archived);

        let source: &dyn EventSource<PersonEvent> = &handle;
        assert_eq!(source.pending_events(), 2);
        assert_eq!(
            source.pop_event(),
            Some(PersonEvent::Renamed {
                name: "robert".into()
            })
        );
        assert_eq!(source.pop_event(), Some(PersonEvent::Archived));
        assert_eq!(source.pop_event(), None);
    }

    #[test]
    fn handles_share_the_same_instance() {
        let a = EntityRef::new(person("1", "bob"));
        let b = a.clone();
        b.borrow_mut().name = "robert".into();

        assert!(a.ptr_eq(&b));
        assert_eq!(a.borrow().name, "robert");

        let copy = EntityRef::new(a.snapshot());
        assert!(!copy.ptr_eq(&a));
        assert_eq!(copy, a);
    }
}
