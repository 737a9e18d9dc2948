use crate::error::AppResult;

/// 命令处理器
///
/// 处理器拿到工作单元的可变借用，在其中读写仓储、记录事件；
/// 处理完成后由总线收集新产生的事件。闭包 `Fn(&C, &mut U) -> AppResult<()>`
/// 自动实现该 trait。
pub trait CommandHandler<C, U: ?Sized> {
    fn handle(&self, command: &C, uow: &mut U) -> AppResult<()>;
}

impl<C, U, F> CommandHandler<C, U> for F
where
    U: ?Sized,
    F: Fn(&C, &mut U) -> AppResult<()>,
{
    fn handle(&self, command: &C, uow: &mut U) -> AppResult<()> {
        self(command, uow)
    }
}
