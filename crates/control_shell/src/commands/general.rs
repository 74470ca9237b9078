use std::{env, io, path::Path};

use control_shell_contract::{ArgCompletion, CommandDescriptor};

use super::registered;
use crate::registry::{ActionContext, ActionOutcome, RegisteredCommand};

pub(super) fn exit() -> RegisteredCommand {
    registered(CommandDescriptor::new("exit", "quits this program"), say_goodbye)
}

pub(super) fn quit() -> RegisteredCommand {
    registered(CommandDescriptor::new("quit", "quits this program"), say_goodbye)
}

fn say_goodbye(ctx: &mut ActionContext<'_>, _args: &[String]) -> ActionOutcome {
    ctx.say("bye bye");
    ActionOutcome::Exit
}

pub(super) fn help() -> RegisteredCommand {
    registered(
        CommandDescriptor::new("help", "prints out the description of the commands")
            .arg("command name", ArgCompletion::CommandNames)
            .optional_trailing(1),
        |ctx, args| {
            let registry = ctx.registry;
            let Some(name) = args.first() else {
                for descriptor in registry.descriptors() {
                    ctx.say(format!("{} : {}", descriptor.name, descriptor.summary));
                }
                return ActionOutcome::Success;
            };
            match registry.lookup(name) {
                Some(command) => {
                    ctx.say(command.descriptor.usage());
                    ActionOutcome::Success
                }
                None => {
                    ctx.say(format!("no such command as \"{name}\""));
                    ActionOutcome::Failure
                }
            }
        },
    )
}

pub(super) fn set_current_working_directory() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "setCurrentWorkingDirectory",
            "changes the current working dir of this system_control instance",
        )
        .arg("directory name", ArgCompletion::None),
        |ctx, args| match change_directory(Path::new(&args[0])) {
            Ok(path) => {
                ctx.say(format!("working directory : {path}"));
                ActionOutcome::Success
            }
            Err((path, code)) => {
                ctx.say(format!(
                    "cannot set working directory to \"{path}\", error code = {}",
                    code.as_str()
                ));
                ActionOutcome::Failure
            }
        },
    )
}

pub(super) fn get_current_working_directory() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "getCurrentWorkingDirectory",
            "prints the current working dir of this system_control instance",
        ),
        |ctx, _args| match env::current_dir() {
            Ok(path) => {
                ctx.say(format!("working directory : {}", path.display()));
                ActionOutcome::Success
            }
            Err(err) => {
                ctx.say(format!(
                    "cannot get working directory, error code = {}",
                    FsErrorCode::from_io(&err).as_str()
                ));
                ActionOutcome::Failure
            }
        },
    )
}

pub(super) fn enable_auto_discovery() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "enableAutoDiscovery",
            "enable the auto discovery for commands on systems",
        ),
        |ctx, _args| {
            ctx.session.set_auto_discovery(true);
            ctx.say("auto_discovery: enabled");
            ActionOutcome::Success
        },
    )
}

pub(super) fn disable_auto_discovery() -> RegisteredCommand {
    registered(
        CommandDescriptor::new(
            "disableAutoDiscovery",
            "disable the auto discovery for commands on systems",
        ),
        |ctx, _args| {
            ctx.session.set_auto_discovery(false);
            ctx.say("auto_discovery: disabled");
            ActionOutcome::Success
        },
    )
}

/// Filesystem failure class printed by the working-directory commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FsErrorCode {
    OpenFailed,
    GeneralFailure,
    IoError,
    InvalidPath,
    AccessDenied,
}

impl FsErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            FsErrorCode::OpenFailed => "OPEN_FAILED",
            FsErrorCode::GeneralFailure => "GENERAL_FAILURE",
            FsErrorCode::IoError => "IO_ERROR",
            FsErrorCode::InvalidPath => "INVALID_PATH",
            FsErrorCode::AccessDenied => "ACCESS_DENIED",
        }
    }

    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => FsErrorCode::InvalidPath,
            io::ErrorKind::PermissionDenied => FsErrorCode::AccessDenied,
            _ if err.raw_os_error().is_some() => FsErrorCode::IoError,
            _ => FsErrorCode::GeneralFailure,
        }
    }
}

/// Canonicalizes `target` and makes it the process working directory.
///
/// Errors carry the path as it should be shown to the operator.
fn change_directory(target: &Path) -> Result<String, (String, FsErrorCode)> {
    let canonical = target
        .canonicalize()
        .map_err(|err| (target.display().to_string(), FsErrorCode::from_io(&err)))?;
    let shown = canonical.display().to_string();
    if !canonical.is_dir() {
        return Err((shown, FsErrorCode::OpenFailed));
    }
    env::set_current_dir(&canonical).map_err(|err| (shown.clone(), FsErrorCode::from_io(&err)))?;
    Ok(shown)
}
