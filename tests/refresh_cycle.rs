use tasktracker::config::TrackerConfig;
use tasktracker::indicator::{ElementRegistry, Surface};
use tasktracker::progress::ORANGE;
use tasktracker::refresh::{mount_block, ChangeHub, RefreshOutcome, Tracker, TrackerState};
use tasktracker::store::{DocumentRef, MemoryVault};
use tasktracker::task;

const BAR_ID: &str = "task-tracker-progression-bar-SprintPlan";
const TEXT_ID: &str = "task-tracker-progression-text-SprintPlan";

fn sprint_vault(text: &str) -> MemoryVault {
    let mut vault = MemoryVault::new();
    vault.insert("Work/Sprint Plan.md", text);
    vault
}

fn sprint_config() -> TrackerConfig {
    TrackerConfig::from_block("path: Work\nfileName: Sprint Plan\n").expect("block")
}

#[test]
fn end_to_end_scenario() {
    let text = "- [ ] a\n- [x] b\n- [ ] c\n";
    let counts = task::parse(text);
    assert_eq!((counts.incomplete, counts.completed), (2, 1));

    let vault = sprint_vault(text);
    let mut surface = ElementRegistry::new();
    let mut tracker = Tracker::new(sprint_config()).expect("tracker");
    let handle = tracker.build(&vault, &mut surface).expect("build");

    assert_eq!(handle.id, BAR_ID);
    assert_eq!(handle.percentage, 33);
    assert_eq!(handle.color, ORANGE);
}

#[test]
fn refresh_twice_with_unchanged_note_is_idempotent() {
    let vault = sprint_vault("- [ ] a\n- [x] b\n");
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();
    mount_block(
        "0",
        "path: Work\nfileName: Sprint Plan\n",
        &vault,
        &mut surface,
        &mut hub,
    )
    .expect("mount");

    let changed = DocumentRef::new("Work/Sprint Plan.md");
    let first = hub.notify(&changed, &vault, &mut surface);
    let snapshot = surface.get(BAR_ID).cloned().expect("bar");
    let second = hub.notify(&changed, &vault, &mut surface);

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    match &second[0].1 {
        RefreshOutcome::Updated { progress } => {
            assert_eq!(progress.percentage, 50);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(surface.get(BAR_ID), Some(&snapshot));
}

#[test]
fn refresh_follows_edits() {
    let mut vault = sprint_vault("- [ ] a\n- [ ] b\n- [ ] c\n- [ ] d\n");
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();
    mount_block(
        "0",
        "path: Work\nfileName: Sprint Plan\nsettings:\n  colors: [\"c0\", \"c1\", \"c2\", \"c3\"]\n",
        &vault,
        &mut surface,
        &mut hub,
    )
    .expect("mount");
    let changed = DocumentRef::new("Work/Sprint Plan.md");

    let steps = [
        ("- [x] a\n- [ ] b\n- [ ] c\n- [ ] d\n", "25%", "c0"),
        ("- [x] a\n- [x] b\n- [ ] c\n- [ ] d\n", "50%", "c1"),
        ("- [x] a\n- [x] b\n- [x] c\n- [ ] d\n", "75%", "c2"),
        ("- [x] a\n- [x] b\n- [x] c\n- [X] d\n", "100%", "c3"),
        ("", "0%", "c0"),
    ];
    for (text, label, color) in steps {
        vault.insert("Work/Sprint Plan.md", text);
        hub.notify(&changed, &vault, &mut surface);

        let bar = surface.get(BAR_ID).expect("bar");
        assert_eq!(bar.style.width.as_deref(), Some(label));
        assert_eq!(bar.style.background_color.as_deref(), Some(color));
        let text = surface.get(TEXT_ID).expect("text");
        assert_eq!(text.text.as_deref(), Some(label));
    }
}

#[test]
fn recreated_surface_reports_stale_until_rerendered() {
    let vault = sprint_vault("- [x] a\n");
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();
    let mounted = mount_block(
        "0",
        "path: Work\nfileName: Sprint Plan\n",
        &vault,
        &mut surface,
        &mut hub,
    )
    .expect("mount");
    let changed = DocumentRef::new("Work/Sprint Plan.md");

    let mut recreated = ElementRegistry::new();
    let outcomes = hub.notify(&changed, &vault, &mut recreated);
    assert_eq!(
        outcomes,
        vec![(
            mounted.subscription,
            RefreshOutcome::Stale {
                id: BAR_ID.to_string()
            }
        )]
    );
    assert!(recreated.is_empty());
    assert_eq!(
        hub.get(mounted.subscription).map(Tracker::state),
        Some(TrackerState::Rendered)
    );

    let mut tracker = Tracker::new(sprint_config()).expect("tracker");
    tracker.build(&vault, &mut recreated).expect("re-render");
    let outcomes = hub.notify(&changed, &vault, &mut recreated);
    assert!(matches!(outcomes[0].1, RefreshOutcome::Updated { .. }));
}

#[test]
fn unreadable_note_fails_one_cycle_only() {
    let mut vault = sprint_vault("- [ ] a\n");
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();
    mount_block(
        "0",
        "path: Work\nfileName: Sprint Plan\n",
        &vault,
        &mut surface,
        &mut hub,
    )
    .expect("mount");
    let changed = DocumentRef::new("Work/Sprint Plan.md");

    vault.set_unreadable("Work/Sprint Plan.md", true);
    let outcomes = hub.notify(&changed, &vault, &mut surface);
    assert!(matches!(outcomes[0].1, RefreshOutcome::Failed { .. }));
    assert_eq!(hub.len(), 1);

    vault.set_unreadable("Work/Sprint Plan.md", false);
    vault.insert("Work/Sprint Plan.md", "- [x] a\n");
    let outcomes = hub.notify(&changed, &vault, &mut surface);
    assert_eq!(
        outcomes[0].1,
        RefreshOutcome::Updated {
            progress: tasktracker::progress::ProgressResult {
                percentage: 100,
                color: "#A3BE8C".to_string(),
            }
        }
    );
}

#[test]
fn failed_builds_never_subscribe() {
    let vault = sprint_vault("- [ ] a\n");
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();

    let blocks = [
        "",
        "fileName: Sprint Plan\n",
        "path: Work\n",
        "path: Missing\nfileName: Sprint Plan\n",
        "path: Work\nfileName: sprint plan\n",
        "path: [unclosed\n",
    ];
    for (index, source) in blocks.iter().enumerate() {
        let key = index.to_string();
        let err = mount_block(&key, source, &vault, &mut surface, &mut hub)
            .expect_err("build should fail");
        assert!(err.is_build_failure(), "{source:?} gave {err:?}");
        let placeholder = surface
            .get(&format!("task-tracker-error-{key}"))
            .expect("placeholder");
        assert!(placeholder
            .text
            .as_deref()
            .unwrap_or_default()
            .starts_with("TaskTrackerError: "));
    }
    assert!(hub.is_empty());
}
