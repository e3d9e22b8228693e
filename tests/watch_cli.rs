mod support;

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use support::{tasktracker_bin, tracker_block, TestVault};

const TIMEOUT: Duration = Duration::from_secs(20);

fn spawn_watch(vault: &TestVault, max_events: usize) -> std::io::Result<(Child, Receiver<String>)> {
    let mut child = Command::new(tasktracker_bin())
        .current_dir(vault.path())
        .env_remove("TASKTRACKER_VAULT")
        .env_remove("RUST_LOG")
        .args(["watch", "Dashboard.md", "--max-events"])
        .arg(max_events.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let stdout = child.stdout.take().expect("piped stdout");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    Ok((child, rx))
}

/// Collect output lines until one contains `needle`.
fn read_until(rx: &Receiver<String>, needle: &str) -> Vec<String> {
    let deadline = Instant::now() + TIMEOUT;
    let mut seen = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(line) => {
                let found = line.contains(needle);
                seen.push(line);
                if found {
                    return seen;
                }
            }
            Err(_) => panic!("no line containing {needle:?}; output so far: {seen:#?}"),
        }
    }
}

fn wait_for_exit(child: &mut Child) {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().expect("try_wait") {
            assert!(status.success(), "watch exited with {status}");
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    panic!("watch did not stop after --max-events");
}

/// Replace a note in one step so the watcher never sees a half-written file.
fn replace_note(vault: &TestVault, rel_path: &str, contents: &str) -> std::io::Result<()> {
    let staged = vault.write_file(&format!("{rel_path}.tmp"), contents)?;
    std::fs::rename(staged, vault.path().join(rel_path))
}

#[test]
fn watch_prints_updated_indicator() -> Result<(), Box<dyn std::error::Error>> {
    let vault = TestVault::init()?;
    vault.write_file("Projects/Todo.md", "- [ ] a\n- [x] b\n- [ ] c\n")?;
    vault.write_file(
        "Dashboard.md",
        &tracker_block("path: Projects\nfileName: Todo\n"),
    )?;

    let (mut child, rx) = spawn_watch(&vault, 1)?;
    let initial = read_until(&rx, "33% #D08770");
    assert!(initial.iter().any(|line| line.contains("(1 subscribed)")));

    replace_note(&vault, "Projects/Todo.md", "- [x] a\n- [x] b\n- [X] c\n")?;
    let updated = read_until(&rx, "100% #A3BE8C");
    assert!(updated
        .iter()
        .any(|line| line.contains("tasktracker watch: Projects/Todo.md")));

    wait_for_exit(&mut child);
    Ok(())
}

#[test]
fn watch_remounts_when_host_note_changes() -> Result<(), Box<dyn std::error::Error>> {
    let vault = TestVault::init()?;
    vault.write_file("Projects/Todo.md", "- [ ] a\n- [x] b\n")?;
    vault.write_file("Projects/Done.md", "- [x] a\n")?;
    vault.write_file(
        "Dashboard.md",
        &tracker_block("path: Projects\nfileName: Todo\n"),
    )?;

    let (mut child, rx) = spawn_watch(&vault, 1)?;
    read_until(&rx, "(1 subscribed)");
    read_until(&rx, "50% #D08770");

    let dashboard = format!(
        "{}{}",
        tracker_block("path: Projects\nfileName: Todo\n"),
        tracker_block("path: Projects\nfileName: Done\n"),
    );
    replace_note(&vault, "Dashboard.md", &dashboard)?;
    read_until(&rx, "(2 subscribed)");
    read_until(&rx, "100% #A3BE8C");

    wait_for_exit(&mut child);
    Ok(())
}
