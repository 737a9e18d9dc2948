use crate::domain_event::DomainEvent;
use crate::entity::{Entity, EntityKey, EntityRef, EventSource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

type Tracked<E> = HashMap<EntityKey, Box<dyn EventSource<E>>>;

/// 一次事务内「经手过的实体」集合
///
/// 由同一个工作单元派生出的所有仓储共享同一份 `Seen`（克隆只复制引用）。
/// 经 save/get/update 的实体都会登记在这里，事务结束前由工作单元逐个取出并
/// 收集其事件。
///
/// - 以 [`EntityKey`] 判定成员身份：同一身份已存在时保留最先登记的句柄；
/// - 取出顺序不做保证；
/// - 每个逻辑事务都应使用新的 `Seen`，否则旧实体会混入后续的事件收集。
pub struct Seen<E> {
    inner: Rc<RefCell<Tracked<E>>>,
}

impl<E> Clone for Seen<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Seen<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<E: DomainEvent> Seen<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记实体；同一身份只登记一次
    pub fn track<T>(&self, entity: &EntityRef<T>)
    where
        T: Entity<Event = E>,
    {
        let key = entity.key();
        let mut tracked = self.inner.borrow_mut();
        if !tracked.contains_key(&key) {
            tracing::trace!(entity = %key, "tracking entity");
            tracked.insert(key, Box::new(entity.clone()));
        }
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.inner.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// 移除并返回任意一个已登记的实体
    pub fn pop(&self) -> Option<Box<dyn EventSource<E>>> {
        let mut tracked = self.inner.borrow_mut();
        let key = tracked.keys().next().cloned()?;
        tracked.remove(&key)
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// 两个 `Seen` 是否为同一份共享集合
    pub fn shares_with(&self, other: &Seen<E>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> fmt::Debug for Seen<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(tracked) => f.debug_set().entries(tracked.keys()).finish(),
            Err(_) => f.write_str("Seen(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Seen;
    use crate::entity::{Entity, EntityRef};
    use dfs_macros::{entity, event};

    #[event]
    enum TaskEvent {
        Opened,
    }

    #[entity(event = TaskEvent)]
    struct Task {
        title: String,
    }

    #[test]
    fn clones_share_one_collection() {
        let seen = Seen::new();
        let shared = seen.clone();

        shared.track(&EntityRef::new(Task::new("t-1".into())));

        assert!(seen.shares_with(&shared));
        assert!(!seen.shares_with(&Seen::new()));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn first_handle_for_an_identity_wins() {
        let seen = Seen::new();
        let first = EntityRef::new(Task::new("t-1".into()));
        let second = EntityRef::new(Task::new("t-1".into()));
        first.raise(TaskEvent::Opened);

        seen.track(&first);
        seen.track(&second);
        seen.track(&first);
        assert_eq!(seen.len(), 1);

        let source = seen.pop().expect("tracked entity");
        assert_eq!(source.pending_events(), 1);
        assert!(seen.is_empty());
        assert!(seen.pop().is_none());
    }

    #[test]
    fn contains_uses_entity_identity() {
        let seen = Seen::new();
        let task = EntityRef::new(Task::new("t-9".into()));
        seen.track(&task);

        assert!(seen.contains(&Task::new("t-9".into()).key()));
        assert!(!seen.contains(&Task::new("t-1".into()).key()));

        seen.clear();
        assert!(seen.is_empty());
    }
}
