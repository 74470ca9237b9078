//! Built-in control commands and the helpers they share.
//!
//! Actions report every expected failure on the console themselves and only hand a failure
//! outcome back to the dispatcher.

mod discovery;
mod general;
mod participant;
mod system;
mod timing;

use std::rc::Rc;

use control_host::{RemoteParticipant, ServiceResult, SystemHandle, Transition};
use control_shell_contract::CommandDescriptor;
use log::debug;

use crate::{
    registry::{ActionContext, ActionOutcome, CommandRegistry, RegisteredCommand},
    session::{service_system_name, system_key},
};

/// Registry with every built-in command, in help order.
pub fn builtin_registry() -> CommandRegistry {
    let mut commands = vec![
        general::exit(),
        general::quit(),
        discovery::discover_all_systems(),
        discovery::discover_system(),
        general::set_current_working_directory(),
        general::get_current_working_directory(),
        discovery::connect_system(),
        general::help(),
    ];
    commands.extend(Transition::ALL.into_iter().map(system::transition));
    commands.push(system::start_monitoring());
    commands.push(system::stop_monitoring());
    commands.extend(
        Transition::ALL
            .into_iter()
            .filter(|transition| *transition != Transition::Shutdown)
            .map(participant::transition),
    );
    commands.extend([
        participant::rpc_objects(),
        participant::rpc_object_iids(),
        participant::rpc_interface_definition(),
        participant::transition(Transition::Shutdown),
        system::get_state(),
        system::set_state(),
        participant::get_state(),
        participant::set_state(),
        discovery::get_participants(),
        system::configure(),
        timing::system_time(),
        timing::discrete_time(),
        timing::no_sync(),
        timing::current_master(),
        general::enable_auto_discovery(),
        general::disable_auto_discovery(),
    ]);

    let mut registry = CommandRegistry::default();
    for command in commands {
        registry.register(command.descriptor, command.action);
    }
    registry
}

fn registered(
    descriptor: CommandDescriptor,
    action: impl Fn(&mut ActionContext<'_>, &[String]) -> ActionOutcome + 'static,
) -> RegisteredCommand {
    RegisteredCommand {
        descriptor,
        action: Rc::new(action),
    }
}

/// Looks `token` up in the session, discovering it first when auto-discovery is on.
///
/// Prints `system "<token>" is not connected` when the lookup still fails.
fn resolve_system(ctx: &mut ActionContext<'_>, token: &str) -> Option<SystemHandle> {
    if let Some(system) = ctx.session.system(token) {
        ctx.session.set_last_system_name(token);
        return Some(system);
    }
    if ctx.session.auto_discovery_enabled() {
        debug!("auto-discovering system {token:?}");
        if let Err(err) = discover_and_register(ctx, token) {
            ctx.say(format!("cannot discover system \"{token}\", error: {err}"));
        }
        if let Some(system) = ctx.session.system(token) {
            ctx.session.set_last_system_name(token);
            return Some(system);
        }
    }
    ctx.say(format!("system \"{token}\" is not connected"));
    None
}

/// Discovers `token` and registers the result under the name the system reports.
fn discover_and_register(ctx: &mut ActionContext<'_>, token: &str) -> ServiceResult<SystemHandle> {
    ctx.session.set_last_system_name(token);
    let system = ctx.service.discover_system(service_system_name(token))?;
    ctx.session
        .insert_system(system_key(&system.name()), system.clone());
    Ok(system)
}

/// Prints `<key> : <p1>, <p2>`.
fn dump_participants(ctx: &mut ActionContext<'_>, system: &SystemHandle) -> bool {
    let key = system_key(&system.name());
    match system.participants() {
        Ok(participants) => {
            ctx.say(format!("{key} : {}", participants.join(", ")));
            true
        }
        Err(err) => {
            ctx.say(format!(
                "cannot get participants of system \"{key}\", error: {err}"
            ));
            false
        }
    }
}

/// Looks a participant up, reporting absence and lookup errors.
///
/// `failure` names the attempted operation in the error message, e.g. `load participant`.
fn find_participant(
    ctx: &mut ActionContext<'_>,
    system: &SystemHandle,
    system_token: &str,
    participant: &str,
    failure: &str,
) -> Option<Rc<dyn RemoteParticipant>> {
    match system.participant(participant) {
        Ok(Some(found)) => Some(found),
        Ok(None) => {
            ctx.say(format!(
                "participant \"{participant}\" is not in system \"{system_token}\""
            ));
            None
        }
        Err(err) => {
            ctx.say(format!(
                "cannot {failure} \"{participant}@{system_token}\", error: {err}"
            ));
            None
        }
    }
}
