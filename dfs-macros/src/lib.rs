//! 共享内核的过程宏
//!
//! - `#[entity]` / `#[aggregate_root]`：补齐 id 与事件发件箱字段并实现 `Entity`
//! - `#[event]`：为事件枚举/结构体实现 `DomainEvent`，并生成事件类型常量
//! - `#[command]`：为命令枚举/结构体实现 `Command`，并生成命令类型常量
//!
use proc_macro::TokenStream;

mod entity;
mod message;
mod utils;

use message::MessageKind;

/// 实体宏
///
/// ```ignore
/// #[entity(event = PersonEvent)]
/// struct Person {
///     name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item, false)
}

/// 聚合根宏：在 `#[entity]` 的基础上实现 `AggregateRoot`
#[proc_macro_attribute]
pub fn aggregate_root(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item, true)
}

/// 领域事件宏
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand(attr, item, MessageKind::Event)
}

/// 命令宏
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand(attr, item, MessageKind::Command)
}
