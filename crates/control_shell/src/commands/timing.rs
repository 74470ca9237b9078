use control_host::{ServiceResult, SystemHandle};
use control_shell_contract::{ArgCompletion, CommandDescriptor};

use super::{registered, resolve_system};
use crate::registry::{ActionContext, ActionOutcome, RegisteredCommand};

/// Interpolation period used when participants follow the master's clock.
const SYSTEM_TIME_INTERPOLATION_MS: u64 = 100;

fn timing_command(name: &str, summary: &str) -> CommandDescriptor {
    CommandDescriptor::new(name, summary).arg("system name", ArgCompletion::KnownSystems)
}

/// Resolves `token` and runs one timing call, reporting failures.
fn configure(
    ctx: &mut ActionContext<'_>,
    token: &str,
    apply: impl FnOnce(&SystemHandle) -> ServiceResult<()>,
) -> ActionOutcome {
    let Some(system) = resolve_system(ctx, token) else {
        return ActionOutcome::Failure;
    };
    match apply(&system) {
        Ok(()) => ActionOutcome::Success,
        Err(err) => {
            ctx.say(format!("cannot set timing for \"{token}\", error: {err}"));
            ActionOutcome::Failure
        }
    }
}

pub(super) fn system_time() -> RegisteredCommand {
    registered(
        timing_command(
            "configureTiming3SystemTime",
            "configures the given system for timing System Time (Sync only to the master)",
        )
        .arg("master participant name", ArgCompletion::LastSystemParticipants),
        |ctx, args| {
            let master = &args[1];
            configure(ctx, &args[0], |system| {
                system.configure_timing_system_time(master, SYSTEM_TIME_INTERPOLATION_MS)
            })
        },
    )
}

pub(super) fn discrete_time() -> RegisteredCommand {
    registered(
        timing_command(
            "configureTiming3DiscreteTime",
            "configures the given system for timing Discrete Time (for AFAP use 0.0 as factor)",
        )
        .arg("master participant name", ArgCompletion::LastSystemParticipants)
        .arg("factor", ArgCompletion::None)
        .arg("step size (in ms)", ArgCompletion::None),
        |ctx, args| {
            let (master, factor, step_size) = (&args[1], &args[2], &args[3]);
            configure(ctx, &args[0], |system| {
                system.configure_timing_discrete(master, step_size, factor)
            })
        },
    )
}

pub(super) fn no_sync() -> RegisteredCommand {
    registered(
        timing_command("configureTiming3NoSync", "resets the timing configuration"),
        |ctx, args| configure(ctx, &args[0], |system| system.configure_timing_no_sync()),
    )
}

pub(super) fn current_master() -> RegisteredCommand {
    registered(
        timing_command(
            "getCurrentTimingMaster",
            "retrieves the timing master from the systems participants",
        ),
        |ctx, args| {
            let token = &args[0];
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            match system.timing_masters() {
                Ok(masters) => {
                    ctx.say(format!("timing masters: {}", masters.join(",")));
                    ActionOutcome::Success
                }
                Err(err) => {
                    ctx.say(format!(
                        "cannot get timing masters for \"{token}\", error: {err}"
                    ));
                    ActionOutcome::Failure
                }
            }
        },
    )
}
