use std::{
    fs,
    path::PathBuf,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use control_host::{
    standard_rpc_objects, LogSeverity, MemoryControlService, ParticipantDescriptor,
    SystemDescriptor, SystemState, TimingConfig,
};
use control_shell::{ControlShell, MemoryOutput};
use pretty_assertions::assert_eq;

fn demo_service() -> MemoryControlService {
    let service = MemoryControlService::new();
    service.announce(SystemDescriptor::new(
        "demo",
        [
            ParticipantDescriptor::new("alpha"),
            ParticipantDescriptor::new("beta"),
        ],
    ));
    service
}

fn shell_for(service: &MemoryControlService) -> (ControlShell, MemoryOutput) {
    let output = MemoryOutput::new();
    let shell = ControlShell::new(Rc::new(service.clone()), output.console());
    (shell, output)
}

fn run(shell: &mut ControlShell, output: &MemoryOutput, line: &str) -> (i32, Vec<String>) {
    let exit = shell.execute_line(line);
    let printed = output.take().lines().map(str::to_string).collect();
    (exit.code, printed)
}

fn unique_test_root() -> PathBuf {
    std::env::temp_dir().join(format!(
        "control-shell-session-test-{}-{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos()
    ))
}

#[test]
fn help_lists_every_command_once_in_registration_order() {
    let (mut shell, output) = shell_for(&MemoryControlService::new());
    let (code, lines) = run(&mut shell, &output, "help");
    assert_eq!(code, 0);
    assert_eq!(lines.len(), shell.registry().len());
    assert_eq!(lines[0], "exit : quits this program");
    assert_eq!(
        lines.last().map(String::as_str),
        Some("disableAutoDiscovery : disable the auto discovery for commands on systems")
    );
    let expected: Vec<String> = shell
        .registry()
        .descriptors()
        .map(|descriptor| format!("{} : {}", descriptor.name, descriptor.summary))
        .collect();
    assert_eq!(lines, expected);
}

#[test]
fn help_for_one_command_shows_argument_placeholders() {
    let (mut shell, output) = shell_for(&MemoryControlService::new());
    assert_eq!(
        run(&mut shell, &output, "help getParticipantState"),
        (
            0,
            vec![
                "getParticipantState <system name> <participant name> : retrieves the given participants state"
                    .to_string()
            ]
        )
    );
    assert_eq!(
        run(&mut shell, &output, "help bogus"),
        (1, vec!["no such command as \"bogus\"".to_string()])
    );
}

#[test]
fn lookup_and_arity_errors_use_stable_status_codes() {
    let (mut shell, output) = shell_for(&MemoryControlService::new());
    assert_eq!(
        run(&mut shell, &output, "startsystem demo"),
        (
            -2,
            vec!["Invalid command \"startsystem\", use \"help\" for valid commands".to_string()]
        )
    );
    assert_eq!(
        run(&mut shell, &output, "startSystem"),
        (
            -3,
            vec![
                "Invalid number of arguments for \"startSystem\" (0 instead of 1), use \"help\" for more information"
                    .to_string()
            ]
        )
    );
    assert_eq!(
        run(&mut shell, &output, "help a b").1,
        vec![
            "Invalid number of arguments for \"help\" (2 instead of 0..1), use \"help\" for more information"
                .to_string()
        ]
    );
}

#[test]
fn discover_then_shutdown_updates_session() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);

    assert_eq!(
        run(&mut shell, &output, "discoverSystem demo"),
        (0, vec!["demo : alpha, beta".to_string()])
    );
    assert!(shell.session().contains_system("demo"));
    assert_eq!(shell.session().last_system_name(), "demo");

    assert_eq!(
        run(&mut shell, &output, "shutdownSystem demo"),
        (0, vec!["demo shutdowned".to_string()])
    );
    assert!(!shell.session().contains_system("demo"));
    assert_eq!(service.participant_state("demo", "alpha"), None);
}

#[test]
fn unknown_systems_fail_unless_auto_discovery_is_enabled() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);

    assert_eq!(
        run(&mut shell, &output, "getSystemState demo"),
        (1, vec!["system \"demo\" is not connected".to_string()])
    );
    assert!(shell.session().is_empty());

    assert_eq!(
        run(&mut shell, &output, "enableAutoDiscovery"),
        (0, vec!["auto_discovery: enabled".to_string()])
    );
    assert_eq!(
        run(&mut shell, &output, "getSystemState demo"),
        (0, vec!["2 - unloaded - homogeneous : 1".to_string()])
    );
    assert!(shell.session().contains_system("demo"));
    assert_eq!(shell.session().last_system_name(), "demo");

    assert_eq!(
        run(&mut shell, &output, "disableAutoDiscovery").1,
        vec!["auto_discovery: disabled".to_string()]
    );
    assert_eq!(
        run(&mut shell, &output, "getParticipants other").1,
        vec!["system \"other\" is not connected".to_string()]
    );
}

#[test]
fn lifecycle_commands_report_states() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    assert_eq!(
        run(&mut shell, &output, "loadSystem demo"),
        (0, vec!["demo loaded".to_string()])
    );
    assert_eq!(
        run(&mut shell, &output, "initializeParticipant demo alpha"),
        (0, vec!["alpha@demo initialized".to_string()])
    );
    assert_eq!(
        run(&mut shell, &output, "getSystemState demo").1,
        vec!["3 - loaded - homogeneous : 0".to_string()]
    );
    assert_eq!(
        run(&mut shell, &output, "getParticipantState demo alpha").1,
        vec!["4 - initialized".to_string()]
    );

    let (code, lines) = run(&mut shell, &output, "startSystem demo");
    assert_eq!(code, 1);
    assert!(lines[0].starts_with("cannot start system \"demo\", error: "));

    assert_eq!(
        run(&mut shell, &output, "stopParticipant demo gamma"),
        (
            1,
            vec!["participant \"gamma\" is not in system \"demo\"".to_string()]
        )
    );
}

#[test]
fn set_system_state_walks_to_the_requested_state() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    assert_eq!(
        run(&mut shell, &output, "setSystemState demo running"),
        (0, vec!["6 - running - homogeneous : 1".to_string()])
    );
    assert_eq!(
        service.participant_state("demo", "beta"),
        Some(SystemState::Running)
    );

    let (code, lines) = run(&mut shell, &output, "setSystemState demo bogus");
    assert_eq!(code, 1);
    assert!(lines[0].starts_with("cannot set system state \"bogus\" for \"demo\", error: "));
}

#[test]
fn shutdowned_state_unloads_then_shuts_down() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");
    run(&mut shell, &output, "setSystemState demo initialized");

    assert_eq!(
        run(&mut shell, &output, "setSystemState demo shutdowned"),
        (0, vec!["demo shutdowned".to_string()])
    );
    assert!(!shell.session().contains_system("demo"));
    assert_eq!(service.participant_state("demo", "alpha"), None);
    assert_eq!(service.participant_state("demo", "beta"), None);
}

#[test]
fn set_participant_state_only_touches_one_participant() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    assert_eq!(
        run(&mut shell, &output, "setParticipantState demo alpha paused"),
        (0, vec!["5 - paused".to_string()])
    );
    assert_eq!(
        service.participant_state("demo", "alpha"),
        Some(SystemState::Paused)
    );
    assert_eq!(
        service.participant_state("demo", "beta"),
        Some(SystemState::Unloaded)
    );

    assert_eq!(
        run(&mut shell, &output, "setParticipantState demo beta shutdowned"),
        (0, vec!["1 - unreachable".to_string()])
    );
    assert_eq!(service.participant_state("demo", "beta"), None);
}

#[test]
fn completion_follows_the_last_referenced_system() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    assert!(shell.complete("getParticipantState demo ").is_empty());

    run(&mut shell, &output, "discoverSystem demo");
    assert_eq!(
        shell.complete("getParticipantState d"),
        vec!["getParticipantState demo"]
    );
    assert_eq!(
        shell.complete("getParticipantState demo "),
        vec!["getParticipantState demo alpha", "getParticipantState demo beta"]
    );
    assert_eq!(
        shell.complete("setSystemState demo r"),
        vec!["setSystemState demo running"]
    );
    assert_eq!(shell.complete("getParticipantS"), vec!["getParticipantState"]);
    assert_eq!(
        shell.complete("getParticipants"),
        vec!["getParticipants"]
    );
    assert!(shell.complete("getparticipant").is_empty());
}

#[test]
fn monitoring_output_is_flushed_on_demand() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");
    assert_eq!(
        run(&mut shell, &output, "startMonitoringSystem demo"),
        (0, Vec::new())
    );

    run(&mut shell, &output, "loadSystem demo");
    assert_eq!(shell.drain_notifications(), 2);
    let printed = output.take();
    assert_eq!(printed.matches("####### state changed! #######").count(), 2);
    assert!(printed.contains("        participant: alpha\n        state: loaded\n"));

    assert!(service.publish_log("demo", "alpha", "core", LogSeverity::Info, "hello"));
    assert_eq!(shell.drain_notifications(), 1);
    let log_line = output.take();
    assert!(log_line.starts_with("    LOG [INFO ] "));
    assert!(log_line.ends_with(" core@alpha :hello\n"));

    assert_eq!(
        run(&mut shell, &output, "stopMonitoringSystem demo"),
        (0, Vec::new())
    );
    assert!(!service.publish_log("demo", "alpha", "core", LogSeverity::Info, "unheard"));
    assert_eq!(
        run(&mut shell, &output, "stopMonitoringSystem demo"),
        (0, Vec::new())
    );
}

#[test]
fn connect_system_refuses_duplicate_names() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    let root = unique_test_root();
    fs::create_dir_all(&root).expect("create root");
    let descriptor = root.join("demo.json");
    fs::write(
        &descriptor,
        r#"{ "name": "demo", "participants": [ { "name": "alpha" } ] }"#,
    )
    .expect("write descriptor");
    let file = descriptor.display().to_string();

    assert_eq!(
        run(&mut shell, &output, &format!("connectSystem \"{file}\"")),
        (0, vec!["demo : alpha".to_string()])
    );
    assert_eq!(shell.session().last_system_name(), "demo");

    let (code, lines) = run(&mut shell, &output, &format!("connectSystem \"{file}\""));
    assert_eq!(code, 1);
    assert_eq!(
        lines.last().map(String::as_str),
        Some(
            format!(
                "connect system returned an already existing system name \"demo\" for \"{file}\""
            )
            .as_str()
        )
    );

    let missing = root.join("missing.json").display().to_string();
    let (code, lines) = run(&mut shell, &output, &format!("connectSystem \"{missing}\""));
    assert_eq!(code, 1);
    assert!(lines[0].starts_with(&format!(
        "cannot connect system from file \"{missing}\", error: "
    )));

    fs::remove_dir_all(&root).expect("cleanup");
}

#[test]
fn rpc_introspection_reports_missing_capabilities() {
    let service = demo_service();
    service.announce(SystemDescriptor::new(
        "demo",
        [ParticipantDescriptor::new("mute").without_rpc_info()],
    ));
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    let objects: Vec<String> = standard_rpc_objects().keys().cloned().collect();
    assert_eq!(
        run(&mut shell, &output, "getParticipantRPCObjects demo alpha"),
        (0, vec![objects.join(",")])
    );
    assert_eq!(
        run(
            &mut shell,
            &output,
            "getParticipantRPCObjectIIDs demo alpha participant_info"
        ),
        (0, vec!["participant_info.control.iid".to_string()])
    );
    assert_eq!(
        run(
            &mut shell,
            &output,
            "getParticipantRPCObjectIIDs demo alpha nothing"
        ),
        (
            1,
            vec!["participant \"alpha@demo\" IID info can not be retrieved".to_string()]
        )
    );
    let (code, lines) = run(
        &mut shell,
        &output,
        "getParticipantRPCObjectIIDDefinition demo alpha logging_service logging_service.control.iid",
    );
    assert_eq!(code, 0);
    assert!(lines[0].starts_with("interface logging_service.control.iid"));
    assert_eq!(
        run(&mut shell, &output, "getParticipantRPCObjects demo mute"),
        (
            1,
            vec!["participant \"mute@demo\" has no RPC Info".to_string()]
        )
    );
}

#[test]
fn timing_commands_configure_the_system() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    assert_eq!(
        run(
            &mut shell,
            &output,
            "configureTiming3DiscreteTime demo alpha 2.0 100"
        ),
        (0, Vec::new())
    );
    assert_eq!(
        service.timing("demo"),
        Some(TimingConfig::Discrete {
            master: "alpha".to_string(),
            step_size_ms: 100.0,
            factor: 2.0,
        })
    );
    assert_eq!(
        run(&mut shell, &output, "getCurrentTimingMaster demo").1,
        vec!["timing masters: alpha".to_string()]
    );

    run(&mut shell, &output, "configureTiming3SystemTime demo beta");
    assert_eq!(
        service.timing("demo"),
        Some(TimingConfig::SystemTime {
            master: "beta".to_string(),
            interpolation_ms: 100,
        })
    );

    let (code, lines) = run(&mut shell, &output, "configureTiming3SystemTime demo nobody");
    assert_eq!(code, 1);
    assert!(lines[0].starts_with("cannot set timing for \"demo\", error: "));

    run(&mut shell, &output, "configureTiming3NoSync demo");
    assert_eq!(
        run(&mut shell, &output, "getCurrentTimingMaster demo").1,
        vec!["timing masters: ".to_string()]
    );
}

#[test]
fn configure_system_applies_properties_file() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");
    let root = unique_test_root();
    fs::create_dir_all(&root).expect("create root");
    let properties = root.join("props.json");
    fs::write(&properties, r#"{ "alpha": { "clock/rate": 10 } }"#).expect("write properties");
    let file = properties.display().to_string();

    assert_eq!(
        run(&mut shell, &output, &format!("configureSystem demo \"{file}\"")),
        (0, vec!["properties set".to_string()])
    );
    assert_eq!(
        service
            .participant_properties("demo", "alpha")
            .get("clock/rate")
            .cloned(),
        Some(serde_json::json!(10))
    );

    fs::remove_dir_all(&root).expect("cleanup");
}

#[test]
fn empty_system_name_is_addressed_with_dash() {
    let service = MemoryControlService::new();
    service.announce(SystemDescriptor::new(
        "",
        [ParticipantDescriptor::new("solo")],
    ));
    let (mut shell, output) = shell_for(&service);

    assert_eq!(
        run(&mut shell, &output, "discoverAllSystems"),
        (0, vec!["- : solo".to_string()])
    );
    assert_eq!(shell.session().system_names(), vec!["-"]);
    assert_eq!(
        run(&mut shell, &output, "getParticipants -"),
        (0, vec!["- : solo".to_string()])
    );
    assert_eq!(
        run(&mut shell, &output, "discoverSystem -"),
        (0, vec!["- : solo".to_string()])
    );
}

#[test]
fn quit_requests_stop_and_shutdown_clears_session() {
    let service = demo_service();
    let (mut shell, output) = shell_for(&service);
    run(&mut shell, &output, "discoverSystem demo");

    assert_eq!(
        run(&mut shell, &output, "exit"),
        (0, vec!["bye bye".to_string()])
    );
    assert!(shell.quit_requested());
    assert!(shell.session().contains_system("demo"));

    shell.shutdown();
    assert!(shell.session().is_empty());
    assert_eq!(shell.session().last_system_name(), "");
}
