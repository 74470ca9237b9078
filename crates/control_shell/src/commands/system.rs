use std::path::Path;

use control_host::{SystemHandle, SystemState, Transition};
use control_shell_contract::{ArgCompletion, CommandDescriptor};
use log::debug;

use super::{registered, resolve_system};
use crate::registry::{ActionContext, ActionOutcome, RegisteredCommand};

fn system_command(name: &str, summary: &str) -> CommandDescriptor {
    CommandDescriptor::new(name, summary).arg("system name", ArgCompletion::KnownSystems)
}

/// `<verb>System`, e.g. `loadSystem`.
pub(super) fn transition(transition: Transition) -> RegisteredCommand {
    let summary = match transition {
        Transition::Shutdown => "shutdown the given system".to_string(),
        other => format!("{}s the given system", other.verb()),
    };
    registered(
        system_command(&format!("{}System", transition.verb()), &summary),
        move |ctx, args| run_transition(ctx, &args[0], transition),
    )
}

/// Applies `transition` to the system named `token`. A successful shutdown forgets the system.
fn run_transition(ctx: &mut ActionContext<'_>, token: &str, transition: Transition) -> ActionOutcome {
    let Some(system) = resolve_system(ctx, token) else {
        return ActionOutcome::Failure;
    };
    if let Err(err) = system.transition(transition) {
        ctx.say(format!(
            "cannot {} system \"{token}\", error: {err}",
            transition.verb()
        ));
        return ActionOutcome::Failure;
    }
    if transition == Transition::Shutdown {
        ctx.session.remove_system(token);
    }
    ctx.say(format!("{token} {}", transition.past_tense()));
    ActionOutcome::Success
}

pub(super) fn start_monitoring() -> RegisteredCommand {
    registered(
        system_command(
            "startMonitoringSystem",
            "monitor logging messages of the given system",
        ),
        |ctx, args| {
            let token = &args[0];
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            if let Err(err) = system.stop_monitoring() {
                debug!("no previous monitor on {token:?}: {err}");
            }
            match system.start_monitoring(ctx.monitor.clone()) {
                Ok(()) => ActionOutcome::Success,
                Err(err) => {
                    ctx.say(format!(
                        "cannot start monitoring system \"{token}\", error: {err}"
                    ));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn stop_monitoring() -> RegisteredCommand {
    registered(
        system_command(
            "stopMonitoringSystem",
            "stop monitoring logging messages of the given system",
        ),
        |ctx, args| {
            let token = &args[0];
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            if let Err(err) = system.stop_monitoring() {
                debug!("no monitor to stop on {token:?}: {err}");
            }
            ActionOutcome::Success
        },
    )
}

pub(super) fn get_state() -> RegisteredCommand {
    registered(
        system_command("getSystemState", "retrieves the state of the given system"),
        |ctx, args| match resolve_system(ctx, &args[0]) {
            Some(system) => print_state(ctx, &args[0], &system).into(),
            None => ActionOutcome::Failure,
        },
    )
}

/// Prints `<code> - <name> - homogeneous : <0|1>`.
fn print_state(ctx: &mut ActionContext<'_>, token: &str, system: &SystemHandle) -> bool {
    match system.state() {
        Ok(aggregated) => {
            ctx.say(format!(
                "{} - {} - homogeneous : {}",
                aggregated.state.code(),
                aggregated.state.name(),
                u8::from(aggregated.homogeneous)
            ));
            true
        }
        Err(err) => {
            ctx.say(format!(
                "cannot get system state for \"{token}\", error: {err}"
            ));
            false
        }
    }
}

pub(super) fn set_state() -> RegisteredCommand {
    registered(
        system_command("setSystemState", "sets the given system state")
            .arg("system state", ArgCompletion::StateNames),
        |ctx, args| {
            let (token, requested) = (&args[0], &args[1]);
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            let target = SystemState::from_requested(requested);
            let staged = if target == SystemState::Unreachable {
                SystemState::Unloaded
            } else {
                target
            };
            if let Err(err) = system.set_state(staged) {
                ctx.say(format!(
                    "cannot set system state \"{requested}\" for \"{token}\", error: {err}"
                ));
                return ActionOutcome::Failure;
            }
            if target == SystemState::Unreachable {
                return run_transition(ctx, token, Transition::Shutdown);
            }
            print_state(ctx, token, &system).into()
        },
    )
}

pub(super) fn configure() -> RegisteredCommand {
    registered(
        system_command("configureSystem", "configures the given system")
            .arg("system properties file", ArgCompletion::LocalFiles),
        |ctx, args| {
            let (token, file) = (&args[0], &args[1]);
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            match system.configure_properties(Path::new(file)) {
                Ok(()) => {
                    ctx.say("properties set");
                    ActionOutcome::Success
                }
                Err(err) => {
                    ctx.say(format!(
                        "cannot set properties for \"{token}\" from file \"{file}\", error: {err}"
                    ));
                    ActionOutcome::Failure
                }
            }
        },
    )
}
