use crate::command_handler::CommandHandler;
use crate::error::{AppError, AppResult};
use crate::event_handler::EventHandler;
use crate::uow::UnitOfWork;
use std::collections::HashMap;

type BoxedCommandHandler<C, U> = Box<dyn CommandHandler<C, U>>;
type BoxedEventHandler<U> = Box<dyn EventHandler<<U as UnitOfWork>::Event, U>>;

/// 处理器注册表
///
/// - 命令：每个命令类型恰好一个处理器，重复注册返回 `AlreadyRegisteredCommand`；
/// - 事件：每个事件类型零到多个处理器，按注册顺序调用。
///
/// 键为 `command_type()`/`event_type()` 返回的类型名，一般取自
/// `#[command]`/`#[event]` 生成的常量。
pub struct HandlerRegistry<C, U: UnitOfWork> {
    commands: HashMap<String, BoxedCommandHandler<C, U>>,
    events: HashMap<String, Vec<BoxedEventHandler<U>>>,
}

impl<C, U: UnitOfWork> Default for HandlerRegistry<C, U> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            events: HashMap::new(),
        }
    }
}

impl<C, U: UnitOfWork> HandlerRegistry<C, U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    pub fn register_command<H>(&mut self, command_type: &str, handler: H) -> AppResult<()>
    where
        H: CommandHandler<C, U> + 'static,
    {
        if self.commands.contains_key(command_type) {
            return Err(AppError::AlreadyRegisteredCommand {
                command: command_type.to_string(),
            });
        }
        self.commands
            .insert(command_type.to_string(), Box::new(handler));
        Ok(())
    }

    /// 以闭包注册命令处理器
    pub fn on_command<F>(&mut self, command_type: &str, handler: F) -> AppResult<()>
    where
        F: Fn(&C, &mut U) -> AppResult<()> + 'static,
    {
        self.register_command(command_type, handler)
    }

    /// 追加一个事件处理器
    pub fn register_event<H>(&mut self, event_type: &str, handler: H)
    where
        H: EventHandler<U::Event, U> + 'static,
    {
        self.events
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// 以闭包追加事件处理器
    pub fn on_event<F>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(&U::Event, &mut U) -> AppResult<()> + 'static,
    {
        self.register_event(event_type, handler);
    }

    pub fn command_handler(&self, command_type: &str) -> Option<&dyn CommandHandler<C, U>> {
        self.commands.get(command_type).map(|h| h.as_ref())
    }

    pub fn event_handlers(&self, event_type: &str) -> &[BoxedEventHandler<U>] {
        self.events
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_command(&self, command_type: &str) -> bool {
        self.commands.contains_key(command_type)
    }
}
