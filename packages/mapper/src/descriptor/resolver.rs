//! Compatible-setter resolution.

use super::value::ValueKind;
use super::Descriptor;
use crate::error::ResolveError;

/// Find and invoke the setter `operation` on `target` for a raw value.
///
/// Candidate kinds are tried in [`ValueKind::CANDIDATES`] order. A kind the
/// target does not declare is skipped; a declared kind the value does not
/// coerce to is recorded and skipped. The first invocation decides the
/// outcome, successful or not.
///
/// # Returns
/// The kind the value was passed as.
///
/// # Errors
/// - `NotFound` if no candidate kind is declared
/// - `Coercion` if declared kinds exist but the value fits none
/// - `Invocation` if the chosen setter failed
///
/// # Examples
/// ```
/// use descriptor_mapper::descriptor::{resolve_and_invoke, ValueKind};
/// use descriptor_mapper::model::DataSourceDefinition;
///
/// let mut ds = DataSourceDefinition::default();
/// assert_eq!(resolve_and_invoke(&mut ds, "set_port_number", "5432"), Ok(ValueKind::Int));
/// assert_eq!(ds.port_number, Some(5432));
/// assert!(resolve_and_invoke(&mut ds, "set_port_number", "x").is_err());
/// ```
pub fn resolve_and_invoke(
    target: &mut dyn Descriptor,
    operation: &str,
    raw: &str,
) -> Result<ValueKind, ResolveError> {
    let operations = target.operations();
    let mut declared = false;
    let mut failures = Vec::new();

    for kind in ValueKind::CANDIDATES {
        if !operations.declares(operation, kind) {
            continue;
        }
        declared = true;

        let value = match kind.coerce(raw) {
            Ok(value) => value,
            Err(err) => {
                failures.push(err);
                continue;
            }
        };

        return operations
            .invoke(target.as_any_mut(), operation, value)
            .map(|()| kind)
            .map_err(|source| ResolveError::Invocation {
                operation: operation.to_string(),
                descriptor: target.type_name(),
                source,
            });
    }

    if declared {
        Err(ResolveError::Coercion {
            operation: operation.to_string(),
            descriptor: target.type_name(),
            value: raw.to_string(),
            failures,
        })
    } else {
        Err(ResolveError::NotFound {
            operation: operation.to_string(),
            descriptor: target.type_name(),
        })
    }
}

/// Find and invoke the adder `operation` on `target` for a completed child.
///
/// An adder declared for the child's exact type wins over one whose
/// predicate merely accepts it.
///
/// # Errors
/// `NotFound` if no adder accepts the child, `Invocation` if it failed.
pub fn resolve_and_invoke_add(
    target: &mut dyn Descriptor,
    operation: &str,
    child: Box<dyn Descriptor>,
) -> Result<(), ResolveError> {
    let operations = target.operations();
    let Some(index) = operations.find_adder(operation, child.as_ref()) else {
        return Err(ResolveError::NotFound {
            operation: format!("{operation}({})", child.type_name()),
            descriptor: target.type_name(),
        });
    };

    operations
        .invoke_adder(target.as_any_mut(), index, child)
        .map_err(|source| ResolveError::Invocation {
            operation: operation.to_string(),
            descriptor: target.type_name(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorInfo, OperationSet, Operations};
    use crate::error::InvocationError;
    use std::sync::LazyLock;

    #[derive(Debug, Default)]
    struct Gadget {
        info: DescriptorInfo,
        calls: Vec<String>,
    }

    static GADGET_OPERATIONS: LazyLock<Operations<Gadget>> = LazyLock::new(|| {
        Operations::<Gadget>::new()
            // declared as bool before int: the fixed order still prefers int
            .bool("set_flag_or_count", |d, v| {
                d.calls.push(format!("bool {v}"));
                Ok(())
            })
            .int("set_flag_or_count", |d, v| {
                d.calls.push(format!("int {v}"));
                Ok(())
            })
            .jndi_name("set_name", |d, v| {
                d.calls.push(format!("jndi {v}"));
                Ok(())
            })
            .string("set_name", |d, v| {
                d.calls.push(format!("string {v}"));
                Ok(())
            })
            .long("set_limit", |_, v| {
                if v < 0 {
                    Err(InvocationError::IllegalArgument(format!("{v} < 0")))
                } else {
                    Ok(())
                }
            })
            .string("explode", |_, _| Err(InvocationError::Failed("boom".into())))
    });

    impl Descriptor for Gadget {
        fn operations(&self) -> &'static dyn OperationSet {
            &*GADGET_OPERATIONS
        }
        fn info(&self) -> &DescriptorInfo {
            &self.info
        }
        fn info_mut(&mut self) -> &mut DescriptorInfo {
            &mut self.info
        }
    }

    #[test]
    fn test_first_kind_in_fixed_order_wins() {
        let mut gadget = Gadget::default();
        assert_eq!(
            resolve_and_invoke(&mut gadget, "set_name", "jdbc/x"),
            Ok(ValueKind::String)
        );
        assert_eq!(
            resolve_and_invoke(&mut gadget, "set_flag_or_count", "1"),
            Ok(ValueKind::Int)
        );
        assert_eq!(
            resolve_and_invoke(&mut gadget, "set_flag_or_count", "true"),
            Ok(ValueKind::Bool)
        );
        assert_eq!(gadget.calls, vec!["string jdbc/x", "int 1", "bool true"]);
    }

    #[test]
    fn test_coercion_failure_is_recoverable() {
        let mut gadget = Gadget::default();
        let err = resolve_and_invoke(&mut gadget, "set_flag_or_count", "many").unwrap_err();
        let ResolveError::Coercion { failures, .. } = &err else {
            panic!("expected coercion error, got {err:?}");
        };
        assert_eq!(failures.len(), 2);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_operation_is_structural() {
        let mut gadget = Gadget::default();
        let err = resolve_and_invoke(&mut gadget, "set_missing", "x").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { descriptor: "Gadget", .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invocation_failures() {
        let mut gadget = Gadget::default();
        let err = resolve_and_invoke(&mut gadget, "set_limit", "-1").unwrap_err();
        assert!(err.is_recoverable());

        let err = resolve_and_invoke(&mut gadget, "explode", "x").unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_add_without_adder() {
        let mut gadget = Gadget::default();
        let child = Box::new(Gadget::default());
        let err = resolve_and_invoke_add(&mut gadget, "add_gadget", child).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert!(err.to_string().contains("add_gadget(Gadget)"));
    }
}
