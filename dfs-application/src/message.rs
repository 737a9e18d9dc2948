use crate::command::Command;
use dfs_domain::domain_event::DomainEvent;

/// 总线上流转的消息：命令或领域事件
#[derive(Debug, Clone, PartialEq)]
pub enum Message<C, E> {
    Command(C),
    Event(E),
}

impl<C: Command, E: DomainEvent> Message<C, E> {
    /// 用于路由的类型名
    pub fn kind(&self) -> &str {
        match self {
            Message::Command(command) => command.command_type(),
            Message::Event(event) => event.event_type(),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Message::Command(_))
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Message::Event(_))
    }
}
