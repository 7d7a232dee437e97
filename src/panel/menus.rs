//! The shipped menu tree.
//!
//! ```text
//!  Logo ──▶ Main ─┬─ Move ──── Home
//!                 ├─ Heat ──── Manual heat
//!                 ├─ Print ─?─ Abort (file playing) | Files
//!                 ├─ Maintenance ─┬─ Extrude ─?─ (hot) | Cold splash
//!                 │               └─ Motors
//!                 ├─ Status
//!                 └─ Options
//! ```
//!
//! Items are `static`; [`build`] adds the groups to a [`MenuGraph`] and
//! wires every link before the graph is validated.

use crate::config::{
    AXIS_CONTROL_MAX, AXIS_CONTROL_MIN, AXIS_CONTROL_STEP, BED_CONTROL_MAX, BED_CONTROL_MIN,
    BED_CONTROL_STEP, FILE_SLOTS, HOTEND_CONTROL_FLOOR, HOTEND_CONTROL_MAX, HOTEND_CONTROL_MIN,
    HOTEND_CONTROL_STEP, SCREEN_IDLE_TIMEOUT_SECS,
};
use crate::error::Error;
use crate::files::ROOT_FOLDER;
use crate::queue::Deferred;
use crate::registry::Registry;
use crate::state::{self, Axis, Heater, FILE_PLAYING, HOTEND_HOT};
use crate::ui::graph::{Group, GroupId, Link, MenuGraph, ScreenHooks, Target};
use crate::ui::item::{Control, InfoText, Item};
use crate::ui::layout::{GRID_6, MODAL_2, ROWS_4, SPLASH, STACK_3, STACK_4, STACK_5};
use crate::ui::widget::Effects;
use crate::ui::Direction;

/// Item positions of the screens other code links into.
pub mod index {
    pub mod main {
        pub const MOVE: usize = 0;
        pub const HEAT: usize = 1;
        pub const PRINT: usize = 2;
        pub const MAINTENANCE: usize = 3;
        pub const STATUS: usize = 4;
        pub const OPTIONS: usize = 5;
    }
    pub mod moves {
        pub const BACK: usize = 0;
        pub const HOME: usize = 1;
        pub const Z: usize = 2;
        pub const X: usize = 3;
        pub const Y: usize = 4;
    }
    pub mod heat {
        pub const BACK: usize = 0;
        pub const PREHEAT_ABS: usize = 1;
        pub const PREHEAT_PLA: usize = 2;
        pub const MANUAL: usize = 3;
        pub const COOL_DOWN: usize = 4;
    }
    pub mod manual_heat {
        pub const BACK: usize = 0;
        pub const HOTEND: usize = 1;
        pub const BED: usize = 2;
    }
    pub mod maintenance {
        pub const BACK: usize = 0;
        pub const MANUAL_EXTRUSION: usize = 1;
        pub const PRIME: usize = 2;
        pub const MOTORS: usize = 3;
    }
    pub mod options {
        pub const BACK: usize = 0;
        pub const IP: usize = 1;
    }
}

// Actions

fn preheat(fx: &mut Effects<'_>, hotend: f32, bed: f32) {
    fx.defer(Deferred::SetTemperature {
        heater: Heater::Hotend,
        celsius: hotend,
    });
    fx.defer(Deferred::SetTemperature {
        heater: Heater::Bed,
        celsius: bed,
    });
}

fn preheat_abs(fx: &mut Effects<'_>) {
    let abs = fx.settings.abs;
    preheat(fx, abs.hotend, abs.bed);
}

fn preheat_pla(fx: &mut Effects<'_>) {
    let pla = fx.settings.pla;
    preheat(fx, pla.hotend, pla.bed);
}

fn cool_down(fx: &mut Effects<'_>) {
    preheat(fx, 0.0, 0.0);
}

fn home_z(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G28 Z"]));
}

fn home_xy(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G28 XY"]));
}

fn home_xyz(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G28 XYZ"]));
}

fn abort_playing_file(fx: &mut Effects<'_>) {
    fx.defer(Deferred::AbortPlayback);
}

fn prime_printhead(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G91", "G1 E60 F100", "G90"]));
}

fn extrude(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G91", "G1 E5 F100", "G90"]));
}

fn retract(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["G91", "G1 E-5 F100", "G90"]));
}

fn motors_on(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["M17"]));
}

fn motors_off(fx: &mut Effects<'_>) {
    fx.defer(Deferred::Script(&["M18"]));
}

// Control accessors

fn hotend_target(registry: &dyn Registry) -> Option<f32> {
    state::hotend_temperatures(registry).map(|t| t.target)
}

fn bed_target(registry: &dyn Registry) -> Option<f32> {
    state::bed_temperatures(registry).map(|t| t.target)
}

fn set_hotend(celsius: f32) -> Deferred {
    Deferred::SetTemperature {
        heater: Heater::Hotend,
        celsius,
    }
}

fn set_bed(celsius: f32) -> Deferred {
    Deferred::SetTemperature {
        heater: Heater::Bed,
        celsius,
    }
}

fn position_x(registry: &dyn Registry) -> Option<f32> {
    state::axis_position(registry, Axis::X)
}

fn position_y(registry: &dyn Registry) -> Option<f32> {
    state::axis_position(registry, Axis::Y)
}

fn position_z(registry: &dyn Registry) -> Option<f32> {
    state::axis_position(registry, Axis::Z)
}

fn move_x(position: f32) -> Deferred {
    Deferred::command(format_args!("G0 X{:4.0}", position))
}

fn move_y(position: f32) -> Deferred {
    Deferred::command(format_args!("G0 Y{:4.0}", position))
}

fn move_z(position: f32) -> Deferred {
    Deferred::command(format_args!("G0 Z{:4.0}", position))
}

fn network(registry: &dyn Registry) -> InfoText {
    state::network_address(registry)
}

const fn axis_control(
    caption: &'static str,
    read: fn(&dyn Registry) -> Option<f32>,
    write: fn(f32) -> Deferred,
) -> Item {
    Item::Control(Control {
        caption,
        read,
        write,
        min: AXIS_CONTROL_MIN,
        max: AXIS_CONTROL_MAX,
        step: AXIS_CONTROL_STEP,
        floor: AXIS_CONTROL_MIN,
    })
}

// Screen hooks

fn reset_file_listing(fx: &mut Effects<'_>) {
    fx.files.open(fx.fs, ROOT_FOLDER);
}

fn scroll_file_listing(fx: &mut Effects<'_>, direction: Direction) -> bool {
    fx.files.shift(direction)
}

// Items

static LOGO_ITEMS: [Item; 1] = [Item::Logo {
    title: "Motion Panel",
    subtitle: "press to start",
}];

static INIT_ITEMS: [Item; 2] = [
    Item::Command {
        caption: "Home all axes",
        action: home_xyz,
    },
    Item::Label {
        caption: "Don't home",
    },
];

static MAIN_ITEMS: [Item; 6] = [
    Item::Label { caption: "Move" },
    Item::Label { caption: "Heat" },
    Item::Label { caption: "Print" },
    Item::Label { caption: "Maint" },
    Item::Label { caption: "Status" },
    Item::Label { caption: "Options" },
];

static MOVE_ITEMS: [Item; 5] = [
    Item::Label { caption: "Back" },
    Item::Label { caption: "Home" },
    axis_control("Z", position_z, move_z),
    axis_control("X", position_x, move_x),
    axis_control("Y", position_y, move_y),
];

static HOME_ITEMS: [Item; 4] = [
    Item::Label { caption: "Back" },
    Item::Command {
        caption: "Home Z",
        action: home_z,
    },
    Item::Command {
        caption: "Home XY",
        action: home_xy,
    },
    Item::Command {
        caption: "Home XYZ",
        action: home_xyz,
    },
];

static HEAT_ITEMS: [Item; 5] = [
    Item::Label { caption: "Back" },
    Item::Command {
        caption: "Preheat ABS",
        action: preheat_abs,
    },
    Item::Command {
        caption: "Preheat PLA",
        action: preheat_pla,
    },
    Item::Label {
        caption: "Manual preheat",
    },
    Item::Command {
        caption: "Cool down",
        action: cool_down,
    },
];

static MANUAL_HEAT_ITEMS: [Item; 3] = [
    Item::Label { caption: "Back" },
    Item::Control(Control {
        caption: "Hotend",
        read: hotend_target,
        write: set_hotend,
        min: HOTEND_CONTROL_MIN,
        max: HOTEND_CONTROL_MAX,
        step: HOTEND_CONTROL_STEP,
        floor: HOTEND_CONTROL_FLOOR,
    }),
    Item::Control(Control {
        caption: "Bed",
        read: bed_target,
        write: set_bed,
        min: BED_CONTROL_MIN,
        max: BED_CONTROL_MAX,
        step: BED_CONTROL_STEP,
        floor: BED_CONTROL_MIN,
    }),
];

static STATUS_ITEMS: [Item; 4] = [
    Item::Progress,
    Item::Time,
    Item::Temperatures {
        caption: "Hotend",
        heater: Heater::Hotend,
    },
    Item::Temperatures {
        caption: "Bed",
        heater: Heater::Bed,
    },
];

static MAINTENANCE_ITEMS: [Item; 4] = [
    Item::Label { caption: "Back" },
    Item::Label {
        caption: "Manual extrusion",
    },
    Item::ConditionalCommand {
        caption: "Prime printhead",
        condition: &HOTEND_HOT,
        action: prime_printhead,
    },
    Item::Label { caption: "Motors" },
];

static EXTRUDE_ITEMS: [Item; 3] = [
    Item::Label { caption: "Back" },
    Item::Command {
        caption: "Extrude 5mm",
        action: extrude,
    },
    Item::Command {
        caption: "Retract 5mm",
        action: retract,
    },
];

static MOTORS_ITEMS: [Item; 3] = [
    Item::Label { caption: "Back" },
    Item::Command {
        caption: "Motors on",
        action: motors_on,
    },
    Item::Command {
        caption: "Motors off",
        action: motors_off,
    },
];

static ABORT_ITEMS: [Item; 2] = [
    Item::Command {
        caption: "Abort print",
        action: abort_playing_file,
    },
    Item::Label {
        caption: "Don't abort",
    },
];

static FILE_ITEMS: [Item; FILE_SLOTS] = [
    Item::File { slot: 0 },
    Item::File { slot: 1 },
    Item::File { slot: 2 },
];

static OPTIONS_ITEMS: [Item; 2] = [
    Item::Label { caption: "Back" },
    Item::Text {
        caption: "IP",
        read: network,
    },
];

static COLD_SPLASH_ITEMS: [Item; 1] = [Item::Label {
    caption: "Too cold to extrude",
}];

/// Handles of every shipped screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screens {
    pub logo: GroupId,
    pub init: GroupId,
    pub main: GroupId,
    pub moves: GroupId,
    pub home: GroupId,
    pub heat: GroupId,
    pub manual_heat: GroupId,
    pub status: GroupId,
    pub maintenance: GroupId,
    pub extrude: GroupId,
    pub motors: GroupId,
    pub abort: GroupId,
    pub files: GroupId,
    pub options: GroupId,
    pub cold_splash: GroupId,
}

pub struct MenuTree {
    pub graph: MenuGraph,
    pub screens: Screens,
}

impl MenuTree {
    /// Where the panel starts: the logo splash.
    pub fn start(&self) -> Target {
        Target::new(self.screens.logo, 0)
    }

    /// Where idle timeouts return to.
    pub fn home(&self) -> Target {
        Target::new(self.screens.status, 0)
    }
}

/// Build, wire and validate the shipped menu tree.
pub fn build() -> Result<MenuTree, Error> {
    let mut graph = MenuGraph::new();
    let timeout = SCREEN_IDLE_TIMEOUT_SECS;

    let screens = Screens {
        logo: graph.add(Group::new("logo", &LOGO_ITEMS, &SPLASH)?)?,
        init: graph.add(Group::new("init", &INIT_ITEMS, &MODAL_2)?)?,
        main: graph.add(Group::new("main", &MAIN_ITEMS, &GRID_6)?)?,
        moves: graph.add(Group::new("move", &MOVE_ITEMS, &STACK_5)?.with_idle_timeout(timeout))?,
        home: graph.add(Group::new("home", &HOME_ITEMS, &STACK_4)?.with_idle_timeout(timeout))?,
        heat: graph.add(Group::new("heat", &HEAT_ITEMS, &STACK_5)?.with_idle_timeout(timeout))?,
        manual_heat: graph.add(
            Group::new("manual heat", &MANUAL_HEAT_ITEMS, &STACK_3)?.with_idle_timeout(timeout),
        )?,
        status: graph.add(Group::new("status", &STATUS_ITEMS, &ROWS_4)?)?,
        maintenance: graph.add(
            Group::new("maintenance", &MAINTENANCE_ITEMS, &STACK_4)?.with_idle_timeout(timeout),
        )?,
        extrude: graph
            .add(Group::new("extrude", &EXTRUDE_ITEMS, &STACK_3)?.with_idle_timeout(timeout))?,
        motors: graph
            .add(Group::new("motors", &MOTORS_ITEMS, &STACK_3)?.with_idle_timeout(timeout))?,
        abort: graph.add(Group::new("abort", &ABORT_ITEMS, &MODAL_2)?.with_idle_timeout(timeout))?,
        files: graph.add(
            Group::new("files", &FILE_ITEMS, &STACK_3)?.with_hooks(ScreenHooks {
                on_enter: Some(reset_file_listing),
                on_edge: Some(scroll_file_listing),
                ..ScreenHooks::default()
            }),
        )?,
        options: graph
            .add(Group::new("options", &OPTIONS_ITEMS, &MODAL_2)?.with_idle_timeout(timeout))?,
        cold_splash: graph.add(
            Group::new("cold splash", &COLD_SPLASH_ITEMS, &SPLASH)?.with_idle_timeout(timeout),
        )?,
    };

    wire(&mut graph, &screens)?;
    graph.validate()?;
    Ok(MenuTree { graph, screens })
}

fn stay_all(graph: &mut MenuGraph, group: GroupId, indices: &[usize]) -> Result<(), Error> {
    indices
        .iter()
        .try_for_each(|&index| graph.set_link(group, index, Link::Stay))
}

fn wire(graph: &mut MenuGraph, s: &Screens) -> Result<(), Error> {
    use index::{heat, main, maintenance, manual_heat, moves, options};

    let link = graph.link_to(s.main, 0)?;
    graph.set_link(s.logo, 0, link)?;

    let link = graph.link_to(s.status, 0)?;
    graph.set_link(s.init, 0, link)?;
    graph.set_link(s.init, 1, link)?;

    // Main
    let link = graph.link_to(s.moves, moves::BACK)?;
    graph.set_link(s.main, main::MOVE, link)?;
    let link = graph.link_to(s.heat, heat::BACK)?;
    graph.set_link(s.main, main::HEAT, link)?;
    graph.set_link(
        s.main,
        main::PRINT,
        Link::when(
            &FILE_PLAYING,
            Target::new(s.abort, 0),
            Target::new(s.files, 0),
        ),
    )?;
    let link = graph.link_to(s.maintenance, maintenance::BACK)?;
    graph.set_link(s.main, main::MAINTENANCE, link)?;
    let link = graph.link_to(s.status, 0)?;
    graph.set_link(s.main, main::STATUS, link)?;
    let link = graph.link_to(s.options, options::BACK)?;
    graph.set_link(s.main, main::OPTIONS, link)?;

    // Move / Home
    let link = graph.link_to(s.main, main::MOVE)?;
    graph.set_link(s.moves, moves::BACK, link)?;
    let link = graph.link_to(s.home, 0)?;
    graph.set_link(s.moves, moves::HOME, link)?;
    stay_all(graph, s.moves, &[moves::Z, moves::X, moves::Y])?;

    let link = graph.link_to(s.moves, moves::BACK)?;
    graph.set_link(s.home, 0, link)?;
    stay_all(graph, s.home, &[1, 2, 3])?;

    // Heat
    let link = graph.link_to(s.main, main::HEAT)?;
    graph.set_link(s.heat, heat::BACK, link)?;
    let link = graph.link_to(s.manual_heat, manual_heat::HOTEND)?;
    graph.set_link(s.heat, heat::MANUAL, link)?;
    stay_all(
        graph,
        s.heat,
        &[heat::PREHEAT_ABS, heat::PREHEAT_PLA, heat::COOL_DOWN],
    )?;

    let link = graph.link_to(s.heat, heat::BACK)?;
    graph.set_link(s.manual_heat, manual_heat::BACK, link)?;
    stay_all(graph, s.manual_heat, &[manual_heat::HOTEND, manual_heat::BED])?;

    // Status
    let link = graph.link_to(s.main, main::STATUS)?;
    for index in 0..STATUS_ITEMS.len() {
        graph.set_link(s.status, index, link)?;
    }

    // Maintenance
    let link = graph.link_to(s.main, main::MAINTENANCE)?;
    graph.set_link(s.maintenance, maintenance::BACK, link)?;
    graph.set_link(
        s.maintenance,
        maintenance::MANUAL_EXTRUSION,
        Link::when(
            &HOTEND_HOT,
            Target::new(s.extrude, 0),
            Target::new(s.cold_splash, 0),
        ),
    )?;
    // Prime only follows its link when the hotend is cold.
    let link = graph.link_to(s.cold_splash, 0)?;
    graph.set_link(s.maintenance, maintenance::PRIME, link)?;
    let link = graph.link_to(s.motors, 0)?;
    graph.set_link(s.maintenance, maintenance::MOTORS, link)?;

    let link = graph.link_to(s.maintenance, maintenance::BACK)?;
    graph.set_link(s.extrude, 0, link)?;
    graph.set_link(s.motors, 0, link)?;
    stay_all(graph, s.extrude, &[1, 2])?;
    stay_all(graph, s.motors, &[1, 2])?;

    // Print
    let link = graph.link_to(s.status, 0)?;
    graph.set_link(s.abort, 0, link)?;
    for slot in 0..FILE_SLOTS {
        graph.set_link(s.files, slot, link)?;
    }
    let link = graph.link_to(s.main, main::PRINT)?;
    graph.set_link(s.abort, 1, link)?;

    // Options
    let link = graph.link_to(s.main, main::OPTIONS)?;
    graph.set_link(s.options, options::BACK, link)?;
    graph.set_link(s.options, options::IP, Link::Stay)?;

    let link = graph.link_to(s.heat, heat::BACK)?;
    graph.set_link(s.cold_splash, 0, link)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    #[test]
    fn shipped_tree_validates() {
        let tree = build().unwrap();
        assert_eq!(tree.graph.len(), 15);
        assert_eq!(tree.graph.validate(), Ok(()));
    }

    #[test]
    fn back_links_return_to_the_opening_item() {
        let tree = build().unwrap();
        let s = tree.screens;
        let registry = MemoryRegistry::new();
        let resolve = |group, index| tree.graph.resolve(Target::new(group, index), &registry);

        assert_eq!(resolve(s.moves, 0), Target::new(s.main, index::main::MOVE));
        assert_eq!(resolve(s.heat, 0), Target::new(s.main, index::main::HEAT));
        assert_eq!(resolve(s.home, 0), Target::new(s.moves, 0));
        assert_eq!(resolve(s.extrude, 0), Target::new(s.maintenance, 0));
        assert_eq!(resolve(s.cold_splash, 0), Target::new(s.heat, 0));
        assert_eq!(resolve(s.abort, 1), Target::new(s.main, index::main::PRINT));
    }

    #[test]
    fn print_and_extrusion_branch_on_machine_state() {
        let tree = build().unwrap();
        let s = tree.screens;
        let registry = MemoryRegistry::new();

        assert_eq!(
            tree.graph
                .resolve(Target::new(s.main, index::main::PRINT), &registry),
            Target::new(s.files, 0)
        );
        assert_eq!(
            tree.graph.resolve(
                Target::new(s.maintenance, index::maintenance::MANUAL_EXTRUSION),
                &registry
            ),
            Target::new(s.cold_splash, 0)
        );
    }

    #[test]
    fn axis_moves_use_fixed_width_positions() {
        assert_eq!(
            move_z(5.0),
            Deferred::command(format_args!("G0 Z   5"))
        );
    }
}
