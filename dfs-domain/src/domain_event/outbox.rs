use std::collections::VecDeque;
use std::collections::vec_deque::Iter;

/// 实体发件箱：按发生顺序暂存实体上产生的领域事件
///
/// 领域逻辑只追加，工作单元按 FIFO 逐个取出。
/// 发件箱不参与序列化，实体持久化后重新加载时总是为空。
#[derive(Debug, Clone)]
pub struct Outbox<E> {
    pending: VecDeque<E>,
}

impl<E> Default for Outbox<E> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<E> Outbox<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个事件
    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    /// 取出最早的事件
    pub fn pop(&mut self) -> Option<E> {
        self.pending.pop_front()
    }

    /// 丢弃所有待收集事件
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, E> {
        self.pending.iter()
    }
}

impl<E> Extend<E> for Outbox<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::Outbox;

    #[test]
    fn pops_in_insertion_order() {
        let mut outbox = Outbox::new();
        outbox.push("created");
        outbox.extend(["renamed", "archived"]);
        assert_eq!(outbox.len(), 3);

        assert_eq!(outbox.pop(), Some("created"));
        assert_eq!(outbox.pop(), Some("renamed"));
        assert_eq!(outbox.iter().copied().collect::<Vec<_>>(), vec!["archived"]);

        outbox.clear();
        assert!(outbox.is_empty());
        assert_eq!(outbox.pop(), None);
    }
}
