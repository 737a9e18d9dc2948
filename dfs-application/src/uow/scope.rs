use super::UnitOfWork;
use std::ops::{Deref, DerefMut};

/// 工作单元作用域守卫
///
/// 通过 [`UnitOfWork::enter`] 获得，可像工作单元本身一样使用。离开作用域时
/// 无论是否已经提交、是否发生错误都会执行 `rollback`，回滚失败只记录日志。
pub struct UnitOfWorkScope<'a, U: UnitOfWork> {
    uow: &'a mut U,
}

impl<'a, U: UnitOfWork> UnitOfWorkScope<'a, U> {
    pub fn new(uow: &'a mut U) -> Self {
        Self { uow }
    }
}

impl<U: UnitOfWork> Deref for UnitOfWorkScope<'_, U> {
    type Target = U;

    fn deref(&self) -> &U {
        self.uow
    }
}

impl<U: UnitOfWork> DerefMut for UnitOfWorkScope<'_, U> {
    fn deref_mut(&mut self) -> &mut U {
        self.uow
    }
}

impl<U: UnitOfWork> Drop for UnitOfWorkScope<'_, U> {
    fn drop(&mut self) {
        if let Err(err) = self.uow.rollback() {
            tracing::warn!(error = %err, "rollback on scope exit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppResult;
    use crate::uow::UnitOfWork;
    use crate::uow::tests::{CounterEvent, CountingUow};

    #[test]
    fn leaving_scope_rolls_back() {
        let mut uow = CountingUow::default();
        {
            let mut scope = uow.enter();
            scope.add_event(CounterEvent::Reset);
        }
        assert_eq!(uow.rollbacks, 1);
        assert_eq!(uow.commits, 0);
        assert_eq!(uow.collector.pending(), 1);
    }

    #[test]
    fn rolls_back_even_after_commit_or_error() {
        fn work(uow: &mut CountingUow, fail: bool) -> AppResult<()> {
            let mut scope = uow.enter();
            scope.commit()?;
            if fail {
                return Err(crate::error::AppError::Validation("boom".into()));
            }
            Ok(())
        }

        let mut uow = CountingUow::default();
        assert!(work(&mut uow, false).is_ok());
        assert!(work(&mut uow, true).is_err());
        assert_eq!(uow.commits, 2);
        assert_eq!(uow.rollbacks, 2);
    }
}
