//! Integration tests for the armada binary.
//!
//! Drives full protocol sessions by spawning the agent process, sending
//! commands via stdin, and checking stdout replies.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use serde_json::{json, Value};

/// Sends a sequence of commands to the agent and collects stdout lines.
fn run_agent(args: &[&str], commands: &[String]) -> (bool, Vec<String>) {
    let exe = env!("CARGO_BIN_EXE_armada");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start armada");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        // The process may already have exited on a fatal config error.
        if writeln!(stdin, "{}", cmd).is_err() {
            break;
        }
    }
    let _ = stdin.flush();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    (status.success(), lines)
}

fn session(commands: &[&str]) -> Vec<String> {
    let commands: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
    let (ok, lines) = run_agent(&[], &commands);
    assert!(ok);
    lines
}

fn map() -> Value {
    json!({
        "width": 200,
        "height": 176,
        "start_location": {"x": 30.0, "y": 30.0},
        "enemy_start_locations": [{"x": 170.0, "y": 146.0}],
        "expansion_sites": [
            {"x": 30.0, "y": 30.0},
            {"x": 60.0, "y": 30.0},
            {"x": 100.0, "y": 90.0},
            {"x": 170.0, "y": 146.0}
        ]
    })
}

fn opening_snapshot(game_loop: u64) -> Value {
    json!({
        "game_loop": game_loop,
        "minerals": 50,
        "vespene": 0,
        "supply_used": 12,
        "supply_cap": 15,
        "structures": [
            {"tag": 1, "kind": "NEXUS", "position": {"x": 30.0, "y": 30.0}, "is_idle": true}
        ],
        "units": [
            {"tag": 10, "kind": "PROBE", "position": {"x": 33.0, "y": 33.0}, "is_collecting": true}
        ]
    })
}

fn orders_of(line: &str) -> Vec<Value> {
    let payload = line.strip_prefix("orders ").expect("orders line");
    serde_json::from_str(payload).expect("orders JSON")
}

#[test]
fn hello_handshake_lists_options() {
    let lines = session(&["hello", "quit"]);
    assert!(lines[0].starts_with("id name armada"));
    assert!(lines.iter().any(|l| l.starts_with("option name Mode type combo")));
    assert!(lines.iter().any(|l| l.starts_with("option name WorkerScout type check")));
    assert_eq!(lines.last().map(String::as_str), Some("hellook"));
}

#[test]
fn isready_replies_readyok() {
    let lines = session(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = session(&["frobnicate", "", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn tick_replies_with_worker_training() {
    let newgame = format!("newgame {}", map());
    let tick = format!("tick {}", opening_snapshot(22));
    let lines = session(&[&newgame, &tick, "quit"]);
    assert_eq!(lines.len(), 1);
    let orders = orders_of(&lines[0]);
    assert!(orders
        .iter()
        .any(|o| o["order"] == "train" && o["kind"] == "PROBE" && o["source"] == 1));
}

#[test]
fn every_tick_gets_one_reply() {
    let newgame = format!("newgame {}", map());
    let ticks: Vec<String> = (1..=5)
        .map(|i| format!("tick {}", opening_snapshot(i * 22)))
        .collect();
    let mut commands = vec![newgame.as_str()];
    commands.extend(ticks.iter().map(String::as_str));
    commands.push("quit");
    let lines = session(&commands);
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.starts_with("orders [")));
}

#[test]
fn malformed_tick_reports_error() {
    let lines = session(&["newgame", "tick {broken", "isready", "quit"]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error "));
    assert_eq!(lines[1], "readyok");
}

#[test]
fn setoption_then_newgame_uses_random_mode() {
    let newgame = format!("newgame {}", map());
    let tick = format!("tick {}", opening_snapshot(22));
    let lines = session(&[
        "setoption name Mode value random",
        "setoption name Seed value 9",
        &newgame,
        &tick,
        "quit",
    ]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("orders "));
}

#[test]
fn unknown_mode_in_config_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.toml");
    std::fs::write(&path, "[player]\nmode = \"berserk\"\n").unwrap();
    let (ok, lines) = run_agent(
        &["--config", path.to_str().unwrap()],
        &["isready".to_string()],
    );
    assert!(!ok);
    assert!(lines.is_empty());
}

#[test]
fn victory_writes_training_data() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let path = dir.path().join("bot.toml");
    std::fs::write(
        &path,
        format!(
            "[player]\nsave_training_data = true\ntraining_data_dir = {:?}\nseed = 3\n",
            data_dir.to_str().unwrap()
        ),
    )
    .unwrap();

    let commands = vec![
        format!("newgame {}", map()),
        format!("tick {}", opening_snapshot(22)),
        format!("tick {}", opening_snapshot(44)),
        "gameover victory".to_string(),
        "quit".to_string(),
    ];
    let (ok, lines) = run_agent(&["--config", path.to_str().unwrap()], &commands);
    assert!(ok);
    assert_eq!(lines.len(), 2);

    let files: Vec<_> = std::fs::read_dir(&data_dir).unwrap().collect();
    assert_eq!(files.len(), 1);
    let text = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
    assert_eq!(text.lines().count(), 2);
}
