use std::path::Path;

use control_shell_contract::{ArgCompletion, CommandDescriptor};

use super::{discover_and_register, dump_participants, registered, resolve_system};
use crate::{
    registry::{ActionOutcome, RegisteredCommand},
    session::system_key,
};

pub(super) fn discover_all_systems() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "discoverAllSystems",
            "discovers all systems and lists their participants",
        ),
        |ctx, _args| {
            let systems = match ctx.service.discover_all_systems() {
                Ok(systems) => systems,
                Err(err) => {
                    ctx.say(format!("cannot discover systems, error: {err}"));
                    return ActionOutcome::Failure;
                }
            };
            let mut listed = true;
            for system in systems {
                listed &= dump_participants(ctx, &system);
                let key = system_key(&system.name());
                ctx.session.insert_system(key.clone(), system);
                ctx.session.set_last_system_name(key);
            }
            listed.into()
        },
    )
}

pub(super) fn discover_system() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "discoverSystem",
            "discovers one system with the given name and lists its participants",
        )
        .arg("system name", ArgCompletion::None),
        |ctx, args| match discover_and_register(ctx, &args[0]) {
            Ok(system) => dump_participants(ctx, &system).into(),
            Err(err) => {
                ctx.say(format!(
                    "cannot discover system \"{}\", error: {err}",
                    args[0]
                ));
                ActionOutcome::Failure
            }
        },
    )
}

pub(super) fn connect_system() -> RegisteredCommand {
    registered(
        CommandDescriptor::new("connectSystem", "connects the given system")
            .arg("system descriptor (json) file name", ArgCompletion::LocalFiles),
        |ctx, args| {
            let file = &args[0];
            let system = match ctx.service.connect_system(Path::new(file)) {
                Ok(system) => system,
                Err(err) => {
                    ctx.say(format!(
                        "cannot connect system from file \"{file}\", error: {err}"
                    ));
                    return ActionOutcome::Failure;
                }
            };
            let key = system_key(&system.name());
            ctx.session.set_last_system_name(key.clone());
            dump_participants(ctx, &system);
            if !ctx.session.insert_new_system(key.clone(), system) {
                ctx.say(format!(
                    "connect system returned an already existing system name \"{key}\" for \"{file}\""
                ));
                return ActionOutcome::Failure;
            }
            ActionOutcome::Success
        },
    )
}

pub(super) fn get_participants() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "getParticipants",
            "lists the participants of the given system",
        )
        .arg("system name", ArgCompletion::KnownSystems),
        |ctx, args| match resolve_system(ctx, &args[0]) {
            Some(system) => dump_participants(ctx, &system).into(),
            None => ActionOutcome::Failure,
        },
    )
}
