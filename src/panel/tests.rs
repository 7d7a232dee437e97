use super::menus::{self, index, MenuTree};
use super::*;
use crate::files::MemoryFs;
use crate::machine::RecordingMachine;
use crate::registry::MemoryRegistry;
use crate::ui::surface::Recorder;

struct Bench {
    signals: Signals,
    registry: MemoryRegistry,
    machine: RecordingMachine,
    fs: MemoryFs,
    surface: Recorder,
}

impl Bench {
    fn new() -> Self {
        Self {
            signals: Signals::new(),
            registry: MemoryRegistry::new(),
            machine: RecordingMachine::default(),
            fs: MemoryFs {
                paths: std::vec!["/sd/", "/sd/cube.gcode"],
            },
            surface: Recorder::default(),
        }
    }

    fn press(&mut self, panel: &mut Panel<'_>, latch: fn(&Signals) -> &Latch) {
        latch(&self.signals).signal();
        self.poll(panel);
    }

    fn poll(&mut self, panel: &mut Panel<'_>) {
        let mut out = Outputs {
            machine: &mut self.machine,
            registry: &mut self.registry,
        };
        panel
            .poll(&self.signals, &mut out, &self.fs, &mut self.surface)
            .unwrap();
    }
}

fn tree() -> MenuTree {
    menus::build().unwrap()
}

fn panel(tree: &MenuTree) -> Panel<'_> {
    Panel::new(&tree.graph, tree.start(), tree.home(), PreheatSettings::DEFAULT).unwrap()
}

fn select(s: &Signals) -> &Latch {
    &s.select
}
fn down(s: &Signals) -> &Latch {
    &s.down
}
fn second(s: &Signals) -> &Latch {
    &s.second
}

#[test]
fn rejects_unvalidated_graph() {
    let graph = MenuGraph::new();
    let start = Target::new(crate::ui::graph::GroupId(0), 0);
    assert!(Panel::new(&graph, start, start, PreheatSettings::DEFAULT).is_err());
}

#[test]
fn select_leaves_the_logo_for_the_main_menu() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    assert_eq!(panel.current(), tree.start());
    bench.press(&mut panel, select);
    assert_eq!(panel.current(), Target::new(tree.screens.main, index::main::MOVE));
}

#[test]
fn refresh_renders_only_when_dirty() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    bench.signals.refresh.signal();
    bench.poll(&mut panel);
    assert_eq!(bench.surface.frames, 1);
    assert!(bench.surface.texts().contains(&"Motion Panel"));

    // Nothing changed: the next refresh draws nothing.
    bench.signals.refresh.signal();
    bench.poll(&mut panel);
    assert_eq!(bench.surface.frames, 1);

    bench.press(&mut panel, select);
    bench.signals.refresh.signal();
    bench.poll(&mut panel);
    assert_eq!(bench.surface.frames, 2);
    assert!(bench.surface.texts().contains(&"Heat"));
}

#[test]
fn deferred_actions_run_on_the_next_main_loop_pass() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    // Logo → Main(Move) → Move(Back) → Home(Back) → Home Z.
    bench.press(&mut panel, select);
    bench.press(&mut panel, select);
    bench.press(&mut panel, down);
    bench.press(&mut panel, select);
    assert_eq!(panel.current(), Target::new(tree.screens.home, 0));
    bench.press(&mut panel, down);
    bench.press(&mut panel, select);

    // Dispatch happened at the idle point; nothing ran yet.
    assert_eq!(panel.queue().len(), 1);
    assert!(bench.machine.lines.is_empty());

    bench.poll(&mut panel);
    assert!(panel.queue().is_empty());
    assert_eq!(bench.machine.lines, ["G28 Z"]);
}

#[test]
fn idle_timeout_returns_home() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    bench.press(&mut panel, select);
    bench.press(&mut panel, select);
    assert_eq!(panel.current().group, tree.screens.moves);

    for _ in 0..crate::config::SCREEN_IDLE_TIMEOUT_SECS - 1 {
        bench.press(&mut panel, second);
    }
    assert_eq!(panel.current().group, tree.screens.moves);

    bench.press(&mut panel, second);
    assert_eq!(panel.current(), tree.home());
}

#[test]
fn button_activity_resets_the_idle_timer() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    bench.press(&mut panel, select);
    bench.press(&mut panel, select);
    for _ in 0..crate::config::SCREEN_IDLE_TIMEOUT_SECS - 1 {
        bench.press(&mut panel, second);
    }
    bench.press(&mut panel, down);
    bench.press(&mut panel, second);
    assert_eq!(panel.current().group, tree.screens.moves);
}

#[test]
fn screens_without_timeout_stay_put() {
    let tree = tree();
    let mut panel = panel(&tree);
    let mut bench = Bench::new();

    bench.press(&mut panel, select);
    for _ in 0..2 * crate::config::SCREEN_IDLE_TIMEOUT_SECS {
        bench.press(&mut panel, second);
    }
    assert_eq!(panel.current().group, tree.screens.main);
}
