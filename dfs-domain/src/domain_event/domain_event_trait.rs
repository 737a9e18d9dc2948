use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// 事件在工作单元与消息总线之间按值流转，因此要求 `Clone + 'static`。
/// 一般由 `#[event]` 宏为事件枚举生成实现。
pub trait DomainEvent: Clone + fmt::Debug + 'static {
    /// 事件类型（形如 `PersonEvent.Renamed`），消息总线据此路由处理器
    fn event_type(&self) -> &str;

    /// 事件载荷版本
    fn event_version(&self) -> usize {
        1
    }
}
