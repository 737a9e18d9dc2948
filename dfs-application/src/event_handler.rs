use crate::error::AppResult;

/// 领域事件处理器
///
/// 同一事件类型可以注册任意多个处理器，按注册顺序依次调用。
pub trait EventHandler<E, U: ?Sized> {
    fn handle(&self, event: &E, uow: &mut U) -> AppResult<()>;
}

impl<E, U, F> EventHandler<E, U> for F
where
    U: ?Sized,
    F: Fn(&E, &mut U) -> AppResult<()>,
{
    fn handle(&self, event: &E, uow: &mut U) -> AppResult<()> {
        self(event, uow)
    }
}
