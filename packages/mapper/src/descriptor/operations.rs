//! Explicit operation tables replacing name-based reflection.
//!
//! Every descriptor type publishes one static [`Operations`] table listing
//! the setters and adders reachable by name. The resolver only sees the
//! type-erased [`OperationSet`] view.

use std::any::{Any, TypeId};
use std::fmt;

use super::value::{JndiName, ScalarValue, ValueKind};
use super::Descriptor;
use crate::error::InvocationError;

/// Result of invoking one operation.
pub type InvokeResult = Result<(), InvocationError>;

/// Type-erased view of a descriptor's operation table.
pub trait OperationSet: Send + Sync {
    /// Check whether `operation` is declared for values of `kind`.
    fn declares(&self, operation: &str, kind: ValueKind) -> bool;

    /// Invoke the setter `operation` matching the kind of `value`.
    fn invoke(&self, target: &mut dyn Any, operation: &str, value: ScalarValue) -> InvokeResult;

    /// Find the adder `operation` for `child`: an exact type match first,
    /// then any adder whose predicate accepts the child.
    fn find_adder(&self, operation: &str, child: &dyn Descriptor) -> Option<usize>;

    /// Invoke an adder found by [`OperationSet::find_adder`].
    fn invoke_adder(
        &self,
        target: &mut dyn Any,
        index: usize,
        child: Box<dyn Descriptor>,
    ) -> InvokeResult;
}

enum SetterFn<D> {
    String(fn(&mut D, String) -> InvokeResult),
    JndiName(fn(&mut D, JndiName) -> InvokeResult),
    Int(fn(&mut D, i32) -> InvokeResult),
    Long(fn(&mut D, i64) -> InvokeResult),
    Bool(fn(&mut D, bool) -> InvokeResult),
}

impl<D> SetterFn<D> {
    fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::JndiName(_) => ValueKind::JndiName,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    fn call(&self, target: &mut D, value: ScalarValue) -> InvokeResult {
        match (self, value) {
            (Self::String(f), ScalarValue::String(v)) => f(target, v),
            (Self::JndiName(f), ScalarValue::JndiName(v)) => f(target, v),
            (Self::Int(f), ScalarValue::Int(v)) => f(target, v),
            (Self::Long(f), ScalarValue::Long(v)) => f(target, v),
            (Self::Bool(f), ScalarValue::Bool(v)) => f(target, v),
            (setter, value) => Err(InvocationError::Failed(format!(
                "{} value passed to {} setter",
                value.kind(),
                setter.kind()
            ))),
        }
    }
}

type ExactAdder<D> = Box<dyn Fn(&mut D, Box<dyn Any>) -> InvokeResult + Send + Sync>;

enum Acceptance<D> {
    Exact { type_id: TypeId, apply: ExactAdder<D> },
    Matching {
        accepts: fn(&dyn Descriptor) -> bool,
        apply: fn(&mut D, Box<dyn Descriptor>) -> InvokeResult,
    },
}

struct Adder<D> {
    name: &'static str,
    acceptance: Acceptance<D>,
}

/// Operation table of descriptor type `D`.
///
/// # Examples
/// ```
/// use descriptor_mapper::descriptor::{Operations, OperationSet, ValueKind};
/// use descriptor_mapper::model::MailSession;
///
/// let ops = Operations::<MailSession>::new()
///     .string("set_host", |d, v| {
///         d.host = Some(v);
///         Ok(())
///     });
/// assert!(ops.declares("set_host", ValueKind::String));
/// assert!(!ops.declares("set_host", ValueKind::Int));
/// ```
pub struct Operations<D> {
    setters: Vec<(&'static str, SetterFn<D>)>,
    adders: Vec<Adder<D>>,
}

impl<D: Descriptor> Operations<D> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            setters: Vec::new(),
            adders: Vec::new(),
        }
    }

    /// Declare a string setter.
    #[must_use]
    pub fn string(mut self, name: &'static str, f: fn(&mut D, String) -> InvokeResult) -> Self {
        self.setters.push((name, SetterFn::String(f)));
        self
    }

    /// Declare a JNDI name setter.
    #[must_use]
    pub fn jndi_name(
        mut self,
        name: &'static str,
        f: fn(&mut D, JndiName) -> InvokeResult,
    ) -> Self {
        self.setters.push((name, SetterFn::JndiName(f)));
        self
    }

    /// Declare an `i32` setter.
    #[must_use]
    pub fn int(mut self, name: &'static str, f: fn(&mut D, i32) -> InvokeResult) -> Self {
        self.setters.push((name, SetterFn::Int(f)));
        self
    }

    /// Declare an `i64` setter.
    #[must_use]
    pub fn long(mut self, name: &'static str, f: fn(&mut D, i64) -> InvokeResult) -> Self {
        self.setters.push((name, SetterFn::Long(f)));
        self
    }

    /// Declare a boolean setter.
    #[must_use]
    pub fn bool(mut self, name: &'static str, f: fn(&mut D, bool) -> InvokeResult) -> Self {
        self.setters.push((name, SetterFn::Bool(f)));
        self
    }

    /// Declare an adder taking exactly descriptor type `C`.
    #[must_use]
    pub fn adder<C: Descriptor>(
        mut self,
        name: &'static str,
        f: fn(&mut D, C) -> InvokeResult,
    ) -> Self {
        let apply: ExactAdder<D> = Box::new(move |target, child| match child.downcast::<C>() {
            Ok(child) => f(target, *child),
            Err(_) => Err(InvocationError::Failed(format!(
                "argument is not a {}",
                std::any::type_name::<C>()
            ))),
        });
        self.adders.push(Adder {
            name,
            acceptance: Acceptance::Exact {
                type_id: TypeId::of::<C>(),
                apply,
            },
        });
        self
    }

    /// Declare an adder taking any descriptor `accepts` approves of.
    #[must_use]
    pub fn adder_matching(
        mut self,
        name: &'static str,
        accepts: fn(&dyn Descriptor) -> bool,
        f: fn(&mut D, Box<dyn Descriptor>) -> InvokeResult,
    ) -> Self {
        self.adders.push(Adder {
            name,
            acceptance: Acceptance::Matching { accepts, apply: f },
        });
        self
    }

    fn target<'a>(&self, target: &'a mut dyn Any) -> Result<&'a mut D, InvocationError> {
        target.downcast_mut::<D>().ok_or_else(|| {
            InvocationError::Failed(format!(
                "operations of {} applied to another type",
                std::any::type_name::<D>()
            ))
        })
    }
}

impl<D: Descriptor> Default for Operations<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Descriptor> OperationSet for Operations<D> {
    fn declares(&self, operation: &str, kind: ValueKind) -> bool {
        self.setters
            .iter()
            .any(|(name, setter)| *name == operation && setter.kind() == kind)
    }

    fn invoke(&self, target: &mut dyn Any, operation: &str, value: ScalarValue) -> InvokeResult {
        let kind = value.kind();
        let Some((_, setter)) = self
            .setters
            .iter()
            .find(|(name, setter)| *name == operation && setter.kind() == kind)
        else {
            return Err(InvocationError::Failed(format!(
                "no {kind} setter '{operation}'"
            )));
        };
        setter.call(self.target(target)?, value)
    }

    fn find_adder(&self, operation: &str, child: &dyn Descriptor) -> Option<usize> {
        let child_type = child.as_any().type_id();
        let named = || {
            self.adders
                .iter()
                .enumerate()
                .filter(move |(_, adder)| adder.name == operation)
        };

        named()
            .find(|(_, adder)| {
                matches!(adder.acceptance, Acceptance::Exact { type_id, .. } if type_id == child_type)
            })
            .or_else(|| {
                named().find(|(_, adder)| {
                    matches!(adder.acceptance, Acceptance::Matching { accepts, .. } if accepts(child))
                })
            })
            .map(|(index, _)| index)
    }

    fn invoke_adder(
        &self,
        target: &mut dyn Any,
        index: usize,
        child: Box<dyn Descriptor>,
    ) -> InvokeResult {
        let adder = self
            .adders
            .get(index)
            .ok_or_else(|| InvocationError::Failed(format!("no adder #{index}")))?;
        let target = self.target(target)?;
        match &adder.acceptance {
            Acceptance::Exact { apply, .. } => apply(target, child.into_any()),
            Acceptance::Matching { apply, .. } => apply(target, child),
        }
    }
}

impl<D> fmt::Debug for Operations<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operations")
            .field(
                "setters",
                &self
                    .setters
                    .iter()
                    .map(|(name, setter)| format!("{name}({})", setter.kind()))
                    .collect::<Vec<_>>(),
            )
            .field(
                "adders",
                &self.adders.iter().map(|adder| adder.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorInfo;
    use std::sync::LazyLock;

    #[derive(Debug, Default)]
    struct Pool {
        info: DescriptorInfo,
        size: Option<i32>,
        members: Vec<String>,
        others: usize,
    }

    #[derive(Debug, Default)]
    struct Member {
        info: DescriptorInfo,
        name: String,
    }

    static POOL_OPERATIONS: LazyLock<Operations<Pool>> = LazyLock::new(|| {
        Operations::<Pool>::new()
            .int("set_size", |d, v| {
                d.size = Some(v);
                Ok(())
            })
            .adder_matching(
                "add",
                |_| true,
                |d, _| {
                    d.others += 1;
                    Ok(())
                },
            )
            .adder::<Member>("add", |d, m| {
                d.members.push(m.name);
                Ok(())
            })
    });

    static MEMBER_OPERATIONS: LazyLock<Operations<Member>> = LazyLock::new(Operations::new);

    impl Descriptor for Pool {
        fn operations(&self) -> &'static dyn OperationSet {
            &*POOL_OPERATIONS
        }
        fn info(&self) -> &DescriptorInfo {
            &self.info
        }
        fn info_mut(&mut self) -> &mut DescriptorInfo {
            &mut self.info
        }
    }

    impl Descriptor for Member {
        fn operations(&self) -> &'static dyn OperationSet {
            &*MEMBER_OPERATIONS
        }
        fn info(&self) -> &DescriptorInfo {
            &self.info
        }
        fn info_mut(&mut self) -> &mut DescriptorInfo {
            &mut self.info
        }
    }

    #[test]
    fn test_setter_declared_by_kind() {
        let ops = &*POOL_OPERATIONS;
        assert!(ops.declares("set_size", ValueKind::Int));
        assert!(!ops.declares("set_size", ValueKind::String));

        let mut pool = Pool::default();
        ops.invoke(&mut pool, "set_size", ScalarValue::Int(8)).unwrap();
        assert_eq!(pool.size, Some(8));
    }

    #[test]
    fn test_invoke_with_wrong_kind_fails() {
        let mut pool = Pool::default();
        let err = POOL_OPERATIONS
            .invoke(&mut pool, "set_size", ScalarValue::Bool(true))
            .unwrap_err();
        assert!(!err.is_illegal_argument());
    }

    #[test]
    fn test_exact_adder_preferred_over_matching() {
        let ops = &*POOL_OPERATIONS;
        let member = Member {
            name: "a".to_string(),
            ..Member::default()
        };
        let index = ops.find_adder("add", &member).unwrap();

        let mut pool = Pool::default();
        ops.invoke_adder(&mut pool, index, Box::new(member)).unwrap();
        assert_eq!(pool.members, vec!["a".to_string()]);
        assert_eq!(pool.others, 0);

        let index = ops.find_adder("add", &Pool::default()).unwrap();
        ops.invoke_adder(&mut pool, index, Box::new(Pool::default()))
            .unwrap();
        assert_eq!(pool.others, 1);
    }

    #[test]
    fn test_unknown_adder() {
        assert!(POOL_OPERATIONS.find_adder("remove", &Member::default()).is_none());
    }
}
