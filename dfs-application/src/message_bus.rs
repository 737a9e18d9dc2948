use crate::command::Command;
use crate::error::{AppError, AppResult};
use crate::handler_registry::HandlerRegistry;
use crate::message::Message;
use crate::uow::UnitOfWork;
use bon::Builder;
use dfs_domain::domain_event::DomainEvent;
use std::collections::VecDeque;

/// 消息队列的取出顺序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchOrder {
    /// 后进先出：新产生的事件先于更早排队的消息处理（深度优先）
    #[default]
    Lifo,
    /// 先进先出：按产生顺序逐层处理（广度优先）
    Fifo,
}

#[derive(Builder, Debug, Clone, Copy, Default)]
pub struct MessageBusConfig {
    #[builder(default)]
    pub order: DispatchOrder,
}

/// 同步消息总线
///
/// `handle` 以给定消息为起点处理一整串级联：
/// 1. 取出一条消息（顺序由 [`DispatchOrder`] 决定）；
/// 2. 命令交给唯一的命令处理器，找不到时返回 `HandlerNotFound`；
///    事件依次交给其全部处理器，没有处理器的事件直接跳过；
/// 3. 把工作单元中新产生的事件（`pull_events`）追加到队列；
/// 4. 队列为空时结束。
///
/// 处理器返回的错误会立即终止本次级联并原样返回，剩余消息被丢弃。
pub struct MessageBus<C, U: UnitOfWork> {
    uow: U,
    handlers: HandlerRegistry<C, U>,
    config: MessageBusConfig,
    queue: VecDeque<Message<C, U::Event>>,
}

impl<C: Command, U: UnitOfWork> MessageBus<C, U> {
    pub fn new(uow: U, handlers: HandlerRegistry<C, U>) -> Self {
        Self::with_config(uow, handlers, MessageBusConfig::default())
    }

    pub fn with_config(uow: U, handlers: HandlerRegistry<C, U>, config: MessageBusConfig) -> Self {
        Self {
            uow,
            handlers,
            config,
            queue: VecDeque::new(),
        }
    }

    pub fn uow(&self) -> &U {
        &self.uow
    }

    pub fn uow_mut(&mut self) -> &mut U {
        &mut self.uow
    }

    pub fn into_uow(self) -> U {
        self.uow
    }

    pub fn config(&self) -> &MessageBusConfig {
        &self.config
    }

    /// 派发一条命令及其引发的全部事件
    pub fn send(&mut self, command: C) -> AppResult<()> {
        self.handle(Message::Command(command))
    }

    /// 派发一条事件及其引发的全部事件
    pub fn publish(&mut self, event: U::Event) -> AppResult<()> {
        self.handle(Message::Event(event))
    }

    pub fn handle(&mut self, message: Message<C, U::Event>) -> AppResult<()> {
        self.queue.clear();
        self.queue.push_back(message);

        let mut dispatched = 0usize;
        while let Some(message) = self.next_message() {
            match &message {
                Message::Command(command) => {
                    dispatch_command(&self.handlers, &mut self.uow, command)?
                }
                Message::Event(event) => dispatch_event(&self.handlers, &mut self.uow, event)?,
            }
            dispatched += 1;
            self.queue
                .extend(self.uow.pull_events().map(Message::Event));
        }

        tracing::debug!(dispatched, "message cascade finished");
        Ok(())
    }

    fn next_message(&mut self) -> Option<Message<C, U::Event>> {
        match self.config.order {
            DispatchOrder::Lifo => self.queue.pop_back(),
            DispatchOrder::Fifo => self.queue.pop_front(),
        }
    }
}

fn dispatch_command<C: Command, U: UnitOfWork>(
    handlers: &HandlerRegistry<C, U>,
    uow: &mut U,
    command: &C,
) -> AppResult<()> {
    let command_type = command.command_type();
    let Some(handler) = handlers.command_handler(command_type) else {
        return Err(AppError::HandlerNotFound(command_type.to_string()));
    };
    tracing::debug!(command = command_type, "handling command");
    handler.handle(command, uow)
}

fn dispatch_event<C, U: UnitOfWork>(
    handlers: &HandlerRegistry<C, U>,
    uow: &mut U,
    event: &U::Event,
) -> AppResult<()> {
    let event_type = event.event_type();
    let registered = handlers.event_handlers(event_type);
    if registered.is_empty() {
        tracing::trace!(event = event_type, "no handlers for event, skipping");
        return Ok(());
    }
    tracing::debug!(
        event = event_type,
        handlers = registered.len(),
        "handling event"
    );
    for handler in registered {
        handler.handle(event, uow)?;
    }
    Ok(())
}
