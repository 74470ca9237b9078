//! Command resolution, arity validation, and action invocation.

use control_shell_contract::{ShellError, ShellExit};
use log::debug;

use crate::registry::{ActionContext, ActionOutcome, CommandRegistry, RegisteredCommand};

/// Status of one dispatched command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Status reported to batch callers.
    pub exit: ShellExit,
    /// Whether the action asked the interpreter to stop.
    pub quit_requested: bool,
}

/// Resolves `tokens[0]` and checks the argument count against the registered arity.
pub fn validate<'r>(
    registry: &'r CommandRegistry,
    tokens: &[String],
) -> Result<&'r RegisteredCommand, ShellError> {
    let Some((name, args)) = tokens.split_first() else {
        return Err(ShellError::unknown_command(""));
    };
    let command = registry
        .lookup(name)
        .ok_or_else(|| ShellError::unknown_command(name))?;
    if !command.descriptor.accepts(args.len()) {
        return Err(ShellError::invalid_argument_count(
            &command.descriptor,
            args.len(),
        ));
    }
    Ok(command)
}

/// Validates `tokens` and runs the matching action.
///
/// Lookup and arity errors are written to the console and mapped to their stable status codes.
pub fn dispatch(ctx: &mut ActionContext<'_>, tokens: &[String]) -> Dispatched {
    let registry = ctx.registry;
    match validate(registry, tokens) {
        Err(err) => {
            ctx.say(&err.message);
            Dispatched {
                exit: err.to_exit(),
                quit_requested: false,
            }
        }
        Ok(command) => {
            debug!(
                "dispatching {} with {} arguments",
                command.descriptor.name,
                tokens.len() - 1
            );
            let outcome = (command.action)(ctx, &tokens[1..]);
            Dispatched {
                exit: outcome.exit(),
                quit_requested: outcome == ActionOutcome::Exit,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_shell_contract::{ArgCompletion, CommandDescriptor};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::default();
        registry.register(
            CommandDescriptor::new("probe", "probes")
                .arg("system name", ArgCompletion::KnownSystems)
                .arg("participant name", ArgCompletion::LastSystemParticipants)
                .optional_trailing(1),
            Rc::new(|_, _| ActionOutcome::Success),
        );
        registry
    }

    fn tokens(line: &[&str]) -> Vec<String> {
        line.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn accepts_counts_within_bounds() {
        let registry = registry();
        assert!(validate(&registry, &tokens(&["probe", "a"])).is_ok());
        assert!(validate(&registry, &tokens(&["probe", "a", "b"])).is_ok());
    }

    #[test]
    fn rejects_counts_outside_bounds_with_range_message() {
        let registry = registry();
        let too_few = validate(&registry, &tokens(&["probe"]))
            .err()
            .expect("too few");
        assert_eq!(too_few.exit_code(), -3);
        assert!(too_few.message.contains("(0 instead of 1..2)"));

        let too_many = validate(&registry, &tokens(&["probe", "a", "b", "c"]))
            .err()
            .expect("too many");
        assert!(too_many.message.contains("(3 instead of 1..2)"));
    }

    #[test]
    fn unknown_command_is_not_found() {
        let err = validate(&registry(), &tokens(&["Probe"]))
            .err()
            .expect("unknown");
        assert_eq!(err.exit_code(), -2);
        assert_eq!(
            err.message,
            "Invalid command \"Probe\", use \"help\" for valid commands"
        );
    }
}
