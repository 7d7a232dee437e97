//! Panel controller - wires ticks, buttons, the widget, the command
//! queue and rendering together.
//!
//! Two contexts drive the panel:
//!
//! - the periodic context calls [`Sampler`] ticks, which only set
//!   [`Signals`];
//! - the main loop calls [`Panel::on_main_loop`] and [`Panel::on_idle`],
//!   which own everything else: the menu graph, the widget, the queue
//!   and the display.

pub mod menus;
pub mod signals;

pub use signals::{ButtonLevels, Latch, Sampler, Signals};

use crate::error::Error;
use crate::files::{FileBrowser, FileSystem};
use crate::fmt::debug;
use crate::queue::Outputs;
use crate::registry::Registry;
use crate::settings::PreheatSettings;
use crate::ui::graph::{Hook, MenuGraph, ScreenHooks, Target};
use crate::ui::surface::Surface;
use crate::ui::widget::{Effects, PanelQueue, Widget};
use crate::ui::Event;

pub struct Panel<'g> {
    graph: &'g MenuGraph,
    widget: Widget,
    home: Target,
    queue: PanelQueue,
    files: FileBrowser,
    settings: PreheatSettings,
    idle_secs: u32,
}

impl<'g> Panel<'g> {
    /// Validate `graph` and place the cursor on `start`. Idle timeouts
    /// return to `home`.
    pub fn new(
        graph: &'g MenuGraph,
        start: Target,
        home: Target,
        settings: PreheatSettings,
    ) -> Result<Self, Error> {
        graph.validate()?;
        for target in [start, home] {
            graph.link_to(target.group, target.index)?;
        }
        Ok(Self {
            graph,
            widget: Widget::new(start),
            home,
            queue: PanelQueue::new(),
            files: FileBrowser::new(),
            settings,
            idle_secs: 0,
        })
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn current(&self) -> Target {
        self.widget.current()
    }

    pub fn queue(&self) -> &PanelQueue {
        &self.queue
    }

    pub fn files(&self) -> &FileBrowser {
        &self.files
    }

    pub fn settings(&self) -> &PreheatSettings {
        &self.settings
    }

    /// Feed one event to the widget. Button events reset the idle
    /// timer; a Tick advances it and may send the panel home.
    pub fn dispatch(&mut self, event: Event, registry: &dyn Registry, fs: &dyn FileSystem) {
        let mut fx = Effects {
            registry,
            fs,
            files: &mut self.files,
            queue: &mut self.queue,
            settings: &self.settings,
        };
        self.widget.dispatch(self.graph, event, &mut fx);

        if event != Event::Tick {
            self.idle_secs = 0;
            return;
        }

        self.idle_secs = self.idle_secs.saturating_add(1);
        let current = self.widget.current();
        let timeout = self
            .graph
            .group(current.group)
            .ok()
            .and_then(|group| group.idle_timeout_secs());
        if let Some(timeout) = timeout {
            if self.idle_secs >= timeout && current.group != self.home.group {
                debug!("idle for {}s, returning home", self.idle_secs);
                self.widget.enter(self.graph, self.home, &mut fx);
                self.idle_secs = 0;
            }
        }
    }

    /// Idle point of the main loop: turn pending flags into events, then
    /// redraw if a refresh is due.
    pub fn on_idle<S: Surface + ?Sized>(
        &mut self,
        signals: &Signals,
        registry: &dyn Registry,
        fs: &dyn FileSystem,
        surface: &mut S,
    ) -> Result<(), Error> {
        for (latch, event) in [
            (&signals.second, Event::Tick),
            (&signals.up, Event::Up),
            (&signals.down, Event::Down),
            (&signals.select, Event::Ok),
        ] {
            if latch.take() {
                self.dispatch(event, registry, fs);
            }
        }

        if signals.refresh.take() {
            self.refresh(registry, fs, surface)?;
        }
        Ok(())
    }

    /// One main-loop pass: run every deferred action, the screen's
    /// `on_main_loop` hook, then redraw if a refresh is due.
    pub fn on_main_loop<S: Surface + ?Sized>(
        &mut self,
        signals: &Signals,
        out: &mut Outputs<'_>,
        fs: &dyn FileSystem,
        surface: &mut S,
    ) -> Result<(), Error> {
        let executed = self.queue.drain(out);
        if executed > 0 {
            debug!("ran {} deferred actions", executed);
        }

        let registry: &dyn Registry = &*out.registry;
        let hook = self.hook(|g| g.on_main_loop);
        self.run_hook(hook, registry, fs);

        if signals.refresh.take() {
            self.refresh(registry, fs, surface)?;
        }
        Ok(())
    }

    /// Main-loop pass followed by the idle point.
    pub fn poll<S: Surface + ?Sized>(
        &mut self,
        signals: &Signals,
        out: &mut Outputs<'_>,
        fs: &dyn FileSystem,
        surface: &mut S,
    ) -> Result<(), Error> {
        self.on_main_loop(signals, out, fs, surface)?;
        self.on_idle(signals, &*out.registry, fs, surface)
    }

    /// Run the screen's `on_refresh` hook and redraw if anything changed.
    pub fn refresh<S: Surface + ?Sized>(
        &mut self,
        registry: &dyn Registry,
        fs: &dyn FileSystem,
        surface: &mut S,
    ) -> Result<(), Error> {
        let hook = self.hook(|g| g.on_refresh);
        self.run_hook(hook, registry, fs);

        if self.widget.take_dirty() {
            self.widget
                .render(self.graph, surface, registry, &self.files)?;
        }
        Ok(())
    }

    fn hook(&self, pick: impl Fn(&ScreenHooks) -> Option<Hook>) -> Option<Hook> {
        self.graph
            .group(self.widget.current().group)
            .ok()
            .and_then(|group| pick(group.hooks()))
    }

    fn run_hook(&mut self, hook: Option<Hook>, registry: &dyn Registry, fs: &dyn FileSystem) {
        if let Some(hook) = hook {
            let mut fx = Effects {
                registry,
                fs,
                files: &mut self.files,
                queue: &mut self.queue,
                settings: &self.settings,
            };
            hook(&mut fx);
        }
    }
}

#[cfg(test)]
mod tests;
