//! Menu items: the closed set of things a cell can show.
//!
//! Items are immutable `static` data. Anything they do on Ok goes
//! through an [`Action`] that defers work into the command queue.

use heapless::String;

use crate::queue::Deferred;
use crate::registry::Registry;
use crate::state::{Condition, Heater};
use crate::ui::widget::Effects;

/// Work run when an item is activated.
pub type Action = fn(&mut Effects<'_>);

/// Short computed text shown by [`Item::Text`].
pub type InfoText = String<20>;

/// Editable number backed by a registry value.
pub struct Control {
    pub caption: &'static str,
    /// Live value, `None` when the registry has nothing.
    pub read: fn(&dyn Registry) -> Option<f32>,
    /// Deferred action applying an edited value.
    pub write: fn(f32) -> Deferred,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    /// Starting value for an edit when the live value is unknown.
    pub floor: f32,
}

impl Control {
    /// Value an edit starts from.
    pub fn seed(&self, registry: &dyn Registry) -> f32 {
        (self.read)(registry)
            .unwrap_or(self.floor)
            .clamp(self.min, self.max)
    }

    /// `value` moved by `steps` increments, kept within `[min, max]`.
    pub fn adjust(&self, value: f32, steps: i32) -> f32 {
        (value + self.step * steps as f32).clamp(self.min, self.max)
    }
}

pub enum Item {
    Label {
        caption: &'static str,
    },
    /// Defers `action`, then follows the slot's link.
    Command {
        caption: &'static str,
        action: Action,
    },
    /// Defers `action` and stays while `condition` holds; otherwise
    /// follows the slot's link.
    ConditionalCommand {
        caption: &'static str,
        condition: &'static dyn Condition,
        action: Action,
    },
    Control(Control),
    /// Caption with a computed value on the right.
    Text {
        caption: &'static str,
        read: fn(&dyn Registry) -> InfoText,
    },
    /// Target and current temperature of a heater.
    Temperatures {
        caption: &'static str,
        heater: Heater,
    },
    /// Name and percentage of the file being played.
    Progress,
    /// Elapsed and estimated remaining play time.
    Time,
    /// One row of the slot file browser.
    File {
        slot: usize,
    },
    Logo {
        title: &'static str,
        subtitle: &'static str,
    },
}

impl Item {
    pub fn caption(&self) -> &'static str {
        match self {
            Item::Label { caption }
            | Item::Command { caption, .. }
            | Item::ConditionalCommand { caption, .. }
            | Item::Text { caption, .. }
            | Item::Temperatures { caption, .. } => caption,
            Item::Control(control) => control.caption,
            Item::Logo { title, .. } => title,
            Item::Progress => "Progress",
            Item::Time => "Time",
            Item::File { .. } => "",
        }
    }

    /// Whether the item shows machine state that changes on its own.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Item::Control(_)
                | Item::Text { .. }
                | Item::Temperatures { .. }
                | Item::Progress
                | Item::Time
        )
    }
}
