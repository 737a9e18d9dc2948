use dfs_domain::domain_event::DomainEvent;
use dfs_domain::entity::EventSource;
use dfs_domain::repository::Seen;
use std::collections::VecDeque;

/// 工作单元的事件来源
///
/// `events` 为工作单元直接记录的事件；`seen` 与该事务内创建的全部仓储共享。
pub struct EventCollector<E> {
    events: VecDeque<E>,
    seen: Seen<E>,
}

impl<E> Default for EventCollector<E> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
            seen: Seen::default(),
        }
    }
}

impl<E: DomainEvent> EventCollector<E> {
    pub fn new(seen: Seen<E>) -> Self {
        Self {
            events: VecDeque::new(),
            seen,
        }
    }

    pub fn seen(&self) -> &Seen<E> {
        &self.seen
    }

    pub fn add_event(&mut self, event: E) {
        tracing::trace!(event = event.event_type(), "unit of work event added");
        self.events.push_back(event);
    }

    /// 工作单元自身尚未取出的事件数（不含实体上的事件）
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn pull_events(&mut self) -> PullEvents<'_, E> {
        PullEvents {
            events: &mut self.events,
            seen: &self.seen,
            current: None,
        }
    }
}

/// 逐个取出事件的迭代器，见 [`UnitOfWork::pull_events`](crate::uow::UnitOfWork::pull_events)
pub struct PullEvents<'a, E> {
    events: &'a mut VecDeque<E>,
    seen: &'a Seen<E>,
    current: Option<Box<dyn EventSource<E>>>,
}

impl<E: DomainEvent> Iterator for PullEvents<'_, E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if let Some(event) = self.events.pop_front() {
            return Some(event);
        }
        loop {
            if let Some(source) = &self.current {
                if let Some(event) = source.pop_event() {
                    return Some(event);
                }
            }
            self.current = Some(self.seen.pop()?);
        }
    }
}
