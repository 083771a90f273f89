//! Unit tests for cs-process.

use std::collections::HashSet;
use std::path::PathBuf;

use cs_core::{ProcessConfig, SimTime};

use crate::PortCheck;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Port check with a fixed set of busy ports that records every query.
struct ScriptedPorts {
    busy:  HashSet<u16>,
    tried: Vec<u16>,
}

impl ScriptedPorts {
    fn new(busy: &[u16]) -> Self {
        Self { busy: busy.iter().copied().collect(), tried: Vec::new() }
    }
}

impl PortCheck for ScriptedPorts {
    fn is_free(&mut self, port: u16) -> bool {
        self.tried.push(port);
        !self.busy.contains(&port)
    }
}

fn config(path: &str) -> ProcessConfig {
    ProcessConfig { config_path: PathBuf::from(path), ..ProcessConfig::default() }
}

// ── Port selection ────────────────────────────────────────────────────────────

#[cfg(test)]
mod port {
    use super::*;
    use crate::{ProcessError, TcpPortCheck, find_free_port};

    #[test]
    fn skips_busy_ports_and_tries_each_once() {
        let mut ports = ScriptedPorts::new(&[5000, 5001]);
        assert_eq!(find_free_port(&mut ports, 5000).unwrap(), 5002);
        assert_eq!(ports.tried, vec![5000, 5001, 5002]);
    }

    #[test]
    fn preferred_port_used_when_free() {
        let mut ports = ScriptedPorts::new(&[]);
        assert_eq!(find_free_port(&mut ports, 1338).unwrap(), 1338);
        assert_eq!(ports.tried.len(), 1);
    }

    #[test]
    fn exhausting_port_space_is_an_error() {
        let mut ports = ScriptedPorts::new(&[65534, 65535]);
        assert!(matches!(
            find_free_port(&mut ports, 65534),
            Err(ProcessError::PortsExhausted { from: 65534 })
        ));
        assert_eq!(ports.tried, vec![65534, 65535]);
    }

    #[test]
    fn tcp_check_sees_bound_listener() {
        let listener = std::net::TcpListener::bind(("0.0.0.0", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!TcpPortCheck.is_free(port));
        drop(listener);
    }
}

// ── Command line ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod command {
    use super::*;
    use crate::SumoCommand;

    #[test]
    fn default_argument_order() {
        let cmd = SumoCommand::build(&config("scen/highway.sumocfg"), 1338, SimTime(100));
        assert_eq!(cmd.program(), std::path::Path::new("sumo"));
        assert_eq!(
            cmd.args(),
            &[
                "-c", "scen/highway.sumocfg",
                "--remote-port", "1338",
                "--step-length", "0.1",
                "--no-step-log", "true",
                "--start", "--quit-on-end",
            ]
        );
    }

    #[test]
    fn all_options() {
        let cfg = ProcessConfig {
            binary_dir:    PathBuf::from("/opt/sumo/bin"),
            gui:           true,
            error_log:     true,
            step_log:      true,
            seed:          Some(42),
            extra_options: "  --collision.action warn  --lateral-resolution 0.8 ".into(),
            ..config("scen/highway.sumocfg")
        };
        let cmd = SumoCommand::build(&cfg, 5002, SimTime(1_000));
        assert_eq!(cmd.program(), std::path::Path::new("/opt/sumo/bin/sumo-gui"));
        assert_eq!(
            cmd.args(),
            &[
                "-c", "scen/highway.sumocfg",
                "--remote-port", "5002",
                "--step-length", "1",
                "--error-log", "scen/SumoError.log",
                "--no-step-log", "false",
                "--seed", "42",
                "--collision.action", "warn", "--lateral-resolution", "0.8",
                "--start", "--quit-on-end",
            ]
        );
    }

    #[test]
    fn zero_seed_is_omitted() {
        let cfg = ProcessConfig { seed: Some(0), ..config("a.sumocfg") };
        let cmd = SumoCommand::build(&cfg, 1338, SimTime(1_000));
        assert_eq!(cmd.arg_value("--seed"), None);
    }

    #[test]
    fn error_log_next_to_bare_file_name() {
        let cfg = ProcessConfig { error_log: true, ..config("a.sumocfg") };
        let cmd = SumoCommand::build(&cfg, 1338, SimTime(1_000));
        assert_eq!(cmd.arg_value("--error-log"), Some("SumoError.log"));
    }

    #[test]
    fn netns_wrapping() {
        let cmd = SumoCommand::build(&config("a.sumocfg"), 1338, SimTime(1_000)).in_netns("ns1");
        assert_eq!(cmd.program(), std::path::Path::new("sudo"));
        assert_eq!(&cmd.args()[..6], &["ip", "netns", "exec", "ns1", "sumo", "-c"]);
        assert!(cmd.to_string().starts_with("sudo ip netns exec ns1 sumo -c a.sumocfg"));
    }
}

// ── Privilege & config checks ─────────────────────────────────────────────────

#[cfg(test)]
mod prepare {
    use super::*;
    use crate::privilege::{effective_uid, require_netns_privilege};
    use crate::{ProcessError, ProcessManager, SystemLauncher};

    #[test]
    fn netns_without_root_is_config_error() {
        assert!(matches!(
            require_netns_privilege(Some("ns1"), 1000),
            Err(ProcessError::Config(_))
        ));
        assert!(require_netns_privilege(Some("ns1"), 0).is_ok());
        assert!(require_netns_privilege(None, 1000).is_ok());
    }

    #[test]
    fn effective_uid_matches_process_owner() {
        assert_eq!(effective_uid(), nix::unistd::Uid::effective().as_raw());
        let netns = require_netns_privilege(Some("ns1"), effective_uid());
        assert_eq!(netns.is_ok(), effective_uid() == 0);
    }

    #[test]
    fn empty_config_path_rejected_before_port_search() {
        let mut mgr = ProcessManager::with_parts(
            ProcessConfig::default(),
            SimTime(1_000),
            SystemLauncher::new(),
            ScriptedPorts::new(&[]),
        );
        assert!(matches!(mgr.prepare(0), Err(ProcessError::Core(_))));
        assert_eq!(mgr.port(), None);
    }

    #[test]
    fn prepare_records_port_and_command() {
        let cfg = ProcessConfig { port: 5000, netns: Some("ns1".into()), ..config("a.sumocfg") };
        let mut mgr = ProcessManager::with_parts(
            cfg, SimTime(500), SystemLauncher::new(), ScriptedPorts::new(&[5000, 5001]),
        );
        let cmd = mgr.prepare(0).unwrap();
        assert_eq!(mgr.port(), Some(5002));
        assert_eq!(cmd.arg_value("--remote-port"), Some("5002"));
        assert_eq!(cmd.program(), std::path::Path::new("sudo"));
        assert_eq!(mgr.command(), Some(&cmd));
    }
}

// ── Readiness ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod connect {
    use std::io;
    use std::time::Duration;

    use cs_traci::TraciError;

    use crate::{ConnectPolicy, ProcessError, connect_with_retry};

    fn policy(attempts: u32) -> ConnectPolicy {
        ConnectPolicy {
            grace:           Duration::from_secs(1),
            attempts,
            initial_backoff: Duration::from_millis(200),
            max_backoff:     Duration::from_millis(500),
            timeout:         Duration::from_millis(100),
        }
    }

    fn refused() -> TraciError {
        TraciError::Io(io::Error::from(io::ErrorKind::ConnectionRefused))
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let p = policy(5);
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(p.backoff(3), Duration::from_millis(500));
        assert_eq!(p.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn succeeds_after_refusals() {
        let mut sleeps = Vec::new();
        let result = connect_with_retry(&policy(5), 1338, |d| sleeps.push(d), |n| {
            if n < 3 { Err(refused()) } else { Ok(n) }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            sleeps,
            vec![Duration::from_secs(1), Duration::from_millis(200), Duration::from_millis(400)]
        );
    }

    #[test]
    fn exhausted_budget_is_not_ready() {
        let mut calls = 0;
        let result: Result<(), _> = connect_with_retry(&policy(3), 1338, |_| {}, |_| {
            calls += 1;
            Err(refused())
        });
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(ProcessError::NotReady { port: 1338, attempts: 3, .. })));
    }

    #[test]
    fn zero_grace_skips_initial_sleep() {
        let p = ConnectPolicy { grace: Duration::ZERO, ..policy(1) };
        let mut sleeps = Vec::new();
        let result = connect_with_retry(&p, 1, |d| sleeps.push(d), |_| Ok(()));
        assert!(result.is_ok());
        assert!(sleeps.is_empty());
    }
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod manager {
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use cs_core::ConnectConfig;
    use cs_traci::message::read_message;
    use cs_traci::constants::{CMD_CLOSE, RTYPE_OK};

    use super::*;
    use crate::{Connector, Launcher, ProcessError, ProcessManager, ProcessResult, SumoCommand, TcpPortCheck};

    /// Stands in for the simulator: listens on the port named in the command
    /// and answers one close request.
    #[derive(Default)]
    struct FakeSimulator {
        launched:  Vec<SumoCommand>,
        listen:    bool,
        server:    Option<JoinHandle<()>>,
        teardowns: usize,
    }

    impl Launcher for FakeSimulator {
        fn launch(&mut self, command: &SumoCommand) -> ProcessResult<()> {
            self.launched.push(command.clone());
            if self.listen {
                let port: u16 = command.arg_value("--remote-port").unwrap().parse().unwrap();
                let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
                self.server = Some(thread::spawn(move || {
                    let (mut sock, _) = listener.accept().unwrap();
                    let request = read_message(&mut sock).unwrap();
                    assert_eq!(request[1], CMD_CLOSE);
                    // status: len 7, id, OK, empty description
                    let mut reply = 11i32.to_be_bytes().to_vec();
                    reply.extend([7, CMD_CLOSE, RTYPE_OK, 0, 0, 0, 0]);
                    sock.write_all(&reply).unwrap();
                }));
            }
            Ok(())
        }

        fn teardown(&mut self, _grace: Duration) {
            self.teardowns += 1;
        }
    }

    fn free_port() -> u16 {
        TcpListener::bind(("127.0.0.1", 0)).unwrap().local_addr().unwrap().port()
    }

    fn fast_config(port: u16) -> ProcessConfig {
        ProcessConfig {
            host: "127.0.0.1".into(),
            port,
            wait_for_socket_secs: 0.0,
            connect: ConnectConfig {
                attempts: 2, initial_backoff_ms: 1, max_backoff_ms: 1, timeout_ms: 200,
            },
            ..config("a.sumocfg")
        }
    }

    #[test]
    fn start_and_shutdown_against_listener() {
        let launcher = FakeSimulator { listen: true, ..FakeSimulator::default() };
        let mut mgr =
            ProcessManager::with_parts(fast_config(free_port()), SimTime(1_000), launcher, TcpPortCheck);

        let mut channel = mgr.start().unwrap();
        assert_eq!(mgr.launcher().launched.len(), 1);

        mgr.shutdown(&mut channel).unwrap();
        assert!(!channel.is_open());
        assert_eq!(mgr.launcher().teardowns, 1);

        mgr.launcher_mut().server.take().unwrap().join().unwrap();
    }

    #[test]
    fn unreachable_simulator_is_torn_down() {
        let mut mgr = ProcessManager::with_parts(
            fast_config(free_port()), SimTime(1_000), FakeSimulator::default(), TcpPortCheck,
        );
        assert!(matches!(mgr.start(), Err(ProcessError::NotReady { attempts: 2, .. })));
        assert_eq!(mgr.launcher().teardowns, 1);
    }
}
