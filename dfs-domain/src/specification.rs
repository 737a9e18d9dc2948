//! 查询条件
//!
//! 仓储的 `get_by_spec` 接收 `&dyn Specification<T>`，按记录的存储顺序逐个检查，
//! 返回第一个满足条件的实体，不会把结果记入已见集合。常见写法是用闭包构造
//! [`Criteria`]；需要复用或组合时，再用 `and`/`or`/`not` 拼接。
//!
use std::fmt;

pub trait Specification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    fn and<S>(self, other: S) -> And<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        And(self, other)
    }

    fn or<S>(self, other: S) -> Or<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        Or(self, other)
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<T, S: Specification<T> + ?Sized> Specification<T> for Box<S> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }
}

impl<T, S: Specification<T> + ?Sized> Specification<T> for &S {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }
}

/// 由闭包给出的查询条件
///
/// ```
/// use dfs_domain::specification::{Criteria, Specification};
///
/// let even = Criteria::new(|n: &i32| n % 2 == 0);
/// assert!(even.is_satisfied_by(&4));
/// assert!(!even.or(Criteria::new(|n: &i32| *n > 10)).is_satisfied_by(&3));
/// ```
pub struct Criteria<T> {
    predicate: Box<dyn Fn(&T) -> bool>,
}

impl<T> Criteria<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl<T> Specification<T> for Criteria<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

impl<T> fmt::Debug for Criteria<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Criteria(..)")
    }
}

/// 两者都满足；左侧不满足时不再检查右侧
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<T, A: Specification<T>, B: Specification<T>> Specification<T> for And<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) && self.1.is_satisfied_by(candidate)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<T, A: Specification<T>, B: Specification<T>> Specification<T> for Or<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) || self.1.is_satisfied_by(candidate)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Not<S>(S);

impl<T, S: Specification<T>> Specification<T> for Not<S> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.0.is_satisfied_by(candidate)
    }
}
