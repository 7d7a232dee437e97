//! Navigation cursor over a [`MenuGraph`].
//!
//! The widget is the only mutable navigation state. It holds the
//! current (group, index) pair, an optional in-progress edit of a
//! numeric control, and a dirty flag telling the panel to redraw.

use crate::config::COMMAND_QUEUE_CAPACITY;
use crate::error::Error;
use crate::files::{FileBrowser, FileSystem, Selection};
use crate::fmt::debug;
use crate::queue::{CommandQueue, Deferred};
use crate::registry::Registry;
use crate::settings::PreheatSettings;
use crate::ui::graph::{MenuGraph, Target};
use crate::ui::input_logic::{clamp_index, select_next, select_prev};
use crate::ui::item::Item;
use crate::ui::render::{self, Live};
use crate::ui::surface::Surface;
use crate::ui::{Direction, Event};

pub type PanelQueue = CommandQueue<Deferred, COMMAND_QUEUE_CAPACITY>;

/// What item actions and screen hooks may touch while an event is
/// being dispatched. Machine-facing work only goes through `queue`.
pub struct Effects<'a> {
    pub registry: &'a dyn Registry,
    pub fs: &'a dyn FileSystem,
    pub files: &'a mut FileBrowser,
    pub queue: &'a mut PanelQueue,
    pub settings: &'a PreheatSettings,
}

impl Effects<'_> {
    /// Queue an action for the next main-loop pass. On overflow the
    /// action is dropped (and logged by the queue).
    pub fn defer(&mut self, action: Deferred) {
        let _ = self.queue.push(action);
    }
}

pub struct Widget {
    current: Target,
    editing: Option<f32>,
    phase: u8,
    dirty: bool,
}

impl Widget {
    pub const fn new(start: Target) -> Self {
        Self {
            current: start,
            editing: None,
            phase: 0,
            dirty: true,
        }
    }

    pub fn current(&self) -> Target {
        self.current
    }

    /// Value of the control being edited, if any.
    pub fn editing(&self) -> Option<f32> {
        self.editing
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Move to `target`, running the destination's `on_enter` hook when
    /// the group changes. Any edit in progress is abandoned.
    pub fn enter(&mut self, graph: &MenuGraph, target: Target, fx: &mut Effects<'_>) {
        let Ok(group) = graph.group(target.group) else {
            return;
        };
        let changed = target.group != self.current.group;
        self.current = Target::new(target.group, clamp_index(target.index, group.len()));
        self.editing = None;
        self.dirty = true;

        if changed {
            debug!("enter screen {}", group.name());
            if let Some(on_enter) = group.hooks().on_enter {
                on_enter(fx);
            }
        }
    }

    pub fn dispatch(&mut self, graph: &MenuGraph, event: Event, fx: &mut Effects<'_>) {
        let Ok(group) = graph.group(self.current.group) else {
            return;
        };
        let index = self.current.index;
        let Some(item) = group.item(index) else {
            return;
        };

        match event {
            Event::Tick => {
                self.phase = self.phase.wrapping_add(1);
                if group.is_live() || self.editing.is_some() {
                    self.dirty = true;
                }
            }
            Event::Up | Event::Down => {
                let direction = if event == Event::Up {
                    Direction::Up
                } else {
                    Direction::Down
                };
                if let (Some(value), Item::Control(control)) = (self.editing, item) {
                    let steps = if direction == Direction::Up { 1 } else { -1 };
                    self.editing = Some(control.adjust(value, steps));
                    self.dirty = true;
                    return;
                }

                let next = match direction {
                    Direction::Up => select_prev(index),
                    Direction::Down => select_next(index, group.len()),
                };
                if next != index {
                    self.current.index = next;
                    self.dirty = true;
                } else if let Some(on_edge) = group.hooks().on_edge {
                    if on_edge(fx, direction) {
                        self.dirty = true;
                    }
                }
            }
            Event::Ok => self.activate(graph, item, fx),
        }
    }

    fn activate(&mut self, graph: &MenuGraph, item: &Item, fx: &mut Effects<'_>) {
        match item {
            Item::Command { action, .. } => {
                action(fx);
                self.follow(graph, fx);
            }
            Item::ConditionalCommand {
                condition, action, ..
            } => {
                if condition.holds(fx.registry) {
                    action(fx);
                    self.dirty = true;
                } else {
                    self.follow(graph, fx);
                }
            }
            Item::Control(control) => {
                match self.editing.take() {
                    None => self.editing = Some(control.seed(fx.registry)),
                    Some(value) => fx.defer((control.write)(value)),
                }
                self.dirty = true;
            }
            Item::File { slot } => match fx.files.select(*slot, fx.fs) {
                Selection::Navigated => self.dirty = true,
                Selection::Play(path) => {
                    fx.defer(Deferred::play(&path));
                    self.follow(graph, fx);
                }
                Selection::Nothing => {}
            },
            Item::Label { .. }
            | Item::Text { .. }
            | Item::Temperatures { .. }
            | Item::Progress
            | Item::Time
            | Item::Logo { .. } => self.follow(graph, fx),
        }
    }

    fn follow(&mut self, graph: &MenuGraph, fx: &mut Effects<'_>) {
        let target = graph.resolve(self.current, fx.registry);
        if target == self.current {
            self.dirty = true;
        } else {
            self.enter(graph, target, fx);
        }
    }

    /// Draw the current group: clear, one cell per item, flush.
    pub fn render<S: Surface + ?Sized>(
        &self,
        graph: &MenuGraph,
        surface: &mut S,
        registry: &dyn Registry,
        files: &FileBrowser,
    ) -> Result<(), Error> {
        let group = graph.group(self.current.group)?;
        surface.clear();
        for (index, (cell, item, policy)) in group
            .layout()
            .slots(group.items(), self.current.index)
            .enumerate()
        {
            let live = Live {
                registry,
                files,
                editing: if index == self.current.index {
                    self.editing
                } else {
                    None
                },
                blink: self.phase % 2 == 1,
            };
            render::draw(policy, item, &cell.area, surface, &live);
        }
        surface.flush()
    }
}
