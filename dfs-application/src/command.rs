use std::fmt;

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 不返回业务数据，仅表达执行结果（成功/失败）；
/// - 每个命令类型有且只有一个处理器，按 [`Command::command_type`] 路由；
/// - 建议保持语义化的“动宾结构”命名，如 `OpenAccount`、`CloseOrder`。
///
/// 一般通过 `#[command]` 宏实现：枚举的每个变体对应一个命令类型
/// （默认 `Enum.Variant`），并生成同名常量供注册处理器时使用。
pub trait Command: fmt::Debug + 'static {
    /// 命令的稳定名称（不随重构变化）
    fn command_type(&self) -> &str;
}
