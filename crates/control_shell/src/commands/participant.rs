use std::rc::Rc;

use control_host::{ParticipantInfo, SystemState, Transition};
use control_shell_contract::{ArgCompletion, CommandDescriptor};

use super::{find_participant, registered, resolve_system};
use crate::registry::{ActionContext, ActionOutcome, RegisteredCommand};

fn participant_command(name: &str, summary: &str) -> CommandDescriptor {
    CommandDescriptor::new(name, summary)
        .arg("system name", ArgCompletion::KnownSystems)
        .arg("participant name", ArgCompletion::LastSystemParticipants)
}

/// `<verb>Participant`, e.g. `loadParticipant`.
pub(super) fn transition(transition: Transition) -> RegisteredCommand {
    let summary = match transition {
        Transition::Shutdown => "shutdown the given participant".to_string(),
        other => format!("{}s the given participant", other.verb()),
    };
    registered(
        participant_command(&format!("{}Participant", transition.verb()), &summary),
        move |ctx, args| run_transition(ctx, &args[0], &args[1], transition),
    )
}

fn run_transition(
    ctx: &mut ActionContext<'_>,
    token: &str,
    name: &str,
    transition: Transition,
) -> ActionOutcome {
    let Some(system) = resolve_system(ctx, token) else {
        return ActionOutcome::Failure;
    };
    let failure = format!("{} participant", transition.verb());
    let Some(participant) = find_participant(ctx, &system, token, name, &failure) else {
        return ActionOutcome::Failure;
    };
    let Some(state_machine) = participant.state_machine() else {
        ctx.say(format!("participant \"{name}@{token}\" has no state machine"));
        return ActionOutcome::Failure;
    };
    match state_machine.transition(transition) {
        Ok(()) => {
            ctx.say(format!("{name}@{token} {}", transition.past_tense()));
            ActionOutcome::Success
        }
        Err(err) => {
            ctx.say(format!("cannot {failure} \"{name}@{token}\", error: {err}"));
            ActionOutcome::Failure
        }
    }
}

pub(super) fn get_state() -> RegisteredCommand {
    registered(
        participant_command(
            "getParticipantState",
            "retrieves the given participants state",
        ),
        |ctx, args| {
            let (token, name) = (&args[0], &args[1]);
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            let failure = "get participant state for participant";
            let Some(participant) = find_participant(ctx, &system, token, name, failure) else {
                return ActionOutcome::Failure;
            };
            let Some(state_machine) = participant.state_machine() else {
                ctx.say(format!("participant \"{name}@{token}\" has no state machine"));
                return ActionOutcome::Failure;
            };
            match state_machine.state() {
                Ok(state) => {
                    ctx.say(format!("{} - {}", state.code(), state.name()));
                    ActionOutcome::Success
                }
                Err(err) => {
                    ctx.say(format!("cannot {failure} \"{name}@{token}\", error: {err}"));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn set_state() -> RegisteredCommand {
    registered(
        participant_command(
            "setParticipantState",
            "sets the given participants system state",
        )
        .arg("participant state", ArgCompletion::StateNames),
        |ctx, args| {
            let (token, name, requested) = (&args[0], &args[1], &args[2]);
            let Some(system) = resolve_system(ctx, token) else {
                return ActionOutcome::Failure;
            };
            let failure = format!("set participant state \"{requested}\" for participant");
            if find_participant(ctx, &system, token, name, &failure).is_none() {
                return ActionOutcome::Failure;
            }
            let target = SystemState::from_requested(requested);
            let applied = system.subset(std::slice::from_ref(name)).and_then(|single| {
                if target == SystemState::Unreachable {
                    single.set_state(SystemState::Unloaded)?;
                    single.transition(Transition::Shutdown)
                } else {
                    single.set_state(target)
                }
            });
            match applied {
                Ok(()) => {
                    ctx.say(format!("{} - {}", target.code(), target.name()));
                    ActionOutcome::Success
                }
                Err(err) => {
                    ctx.say(format!("cannot {failure} \"{name}@{token}\", error: {err}"));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn rpc_objects() -> RegisteredCommand {
    registered(
        participant_command(
            "getParticipantRPCObjects",
            "retrieve the RPC Objects of the given participant",
        ),
        |ctx, args| {
            let (token, name) = (&args[0], &args[1]);
            let failure = "get RPC objects of participant";
            let Some(info) = participant_info(ctx, token, name, failure) else {
                return ActionOutcome::Failure;
            };
            match info.rpc_objects() {
                Ok(objects) => {
                    ctx.say(objects.join(","));
                    ActionOutcome::Success
                }
                Err(err) => {
                    ctx.say(format!("cannot {failure} \"{name}@{token}\", error: {err}"));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn rpc_object_iids() -> RegisteredCommand {
    registered(
        participant_command(
            "getParticipantRPCObjectIIDs",
            "retrieve the RPC IIDs of a concrete RPC Objects of the given participant",
        )
        .arg("object name", ArgCompletion::None),
        |ctx, args| {
            let (token, name, object) = (&args[0], &args[1], &args[2]);
            let Some(info) = participant_info(ctx, token, name, "get RPC object IIDs of participant")
            else {
                return ActionOutcome::Failure;
            };
            match info.rpc_object_iids(object) {
                Ok(iids) => {
                    ctx.say(iids.join(","));
                    ActionOutcome::Success
                }
                Err(_) => {
                    ctx.say(format!(
                        "participant \"{name}@{token}\" IID info can not be retrieved"
                    ));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn rpc_interface_definition() -> RegisteredCommand {
    registered(
        participant_command(
            "getParticipantRPCObjectIIDDefinition",
            "retrieve the RPC Definition of an IID of a concrete RPC Objects of the given participant",
        )
        .arg("object name", ArgCompletion::None)
        .arg("interface id", ArgCompletion::None),
        |ctx, args| {
            let (token, name, object, iid) = (&args[0], &args[1], &args[2], &args[3]);
            let failure = "get RPC interface definition of participant";
            let Some(info) = participant_info(ctx, token, name, failure) else {
                return ActionOutcome::Failure;
            };
            match info.rpc_interface_definition(object, iid) {
                Ok(definition) => {
                    ctx.say(definition);
                    ActionOutcome::Success
                }
                Err(_) => {
                    ctx.say(format!(
                        "participant \"{name}@{token}\" IID info can not be retrieved"
                    ));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

fn participant_info(
    ctx: &mut ActionContext<'_>,
    token: &str,
    name: &str,
    failure: &str,
) -> Option<Rc<dyn ParticipantInfo>> {
    let system = resolve_system(ctx, token)?;
    let participant = find_participant(ctx, &system, token, name, failure)?;
    let info = participant.rpc_info();
    if info.is_none() {
        ctx.say(format!("participant \"{name}@{token}\" has no RPC Info"));
    }
    info
}
