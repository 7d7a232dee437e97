//! The menu graph: an arena of screens connected by links.
//!
//! Screens ([`Group`]) live in a fixed-capacity arena inside
//! [`MenuGraph`] and refer to each other by [`GroupId`] handle, so the
//! graph may be cyclic (every "Back" closes a loop) without any owning
//! references between groups. Construction is two-phase: groups are
//! added with [`Link::Unassigned`] placeholders, then links are patched
//! with [`MenuGraph::set_link`] once every target exists, and finally
//! [`MenuGraph::validate`] checks the whole graph before it is used.

use core::fmt;

use heapless::Vec;

use crate::config::{MAX_GROUPS, MAX_ITEMS};
use crate::error::Error;
use crate::fmt::error;
use crate::registry::Registry;
use crate::state::Condition;
use crate::ui::item::Item;
use crate::ui::layout::Layout;
use crate::ui::widget::Effects;
use crate::ui::Direction;

/// Handle of a group in a [`MenuGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroupId(pub u8);

/// A destination: a group and the item selected on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    pub group: GroupId,
    pub index: usize,
}

impl Target {
    pub const fn new(group: GroupId, index: usize) -> Self {
        Self { group, index }
    }
}

/// Navigation edge leaving one item slot.
#[derive(Clone, Copy)]
pub enum Link {
    /// Placeholder, must be patched before validation.
    Unassigned,
    /// Keep the cursor where it is.
    Stay,
    To(Target),
    /// `primary` while `condition` holds, else `alternate`. Evaluated on
    /// every traversal; without a condition `primary` is taken.
    When {
        condition: Option<&'static dyn Condition>,
        primary: Target,
        alternate: Target,
    },
}

impl Link {
    pub fn when(condition: &'static dyn Condition, primary: Target, alternate: Target) -> Self {
        Link::When {
            condition: Some(condition),
            primary,
            alternate,
        }
    }

    /// Destination when traversed from `from`. Never fails.
    pub fn resolve(&self, from: Target, registry: &dyn Registry) -> Target {
        match *self {
            Link::Unassigned | Link::Stay => from,
            Link::To(target) => target,
            Link::When {
                condition: None,
                primary,
                ..
            } => primary,
            Link::When {
                condition: Some(condition),
                primary,
                alternate,
            } => {
                if condition.holds(registry) {
                    primary
                } else {
                    alternate
                }
            }
        }
    }

    fn targets(&self) -> impl Iterator<Item = Target> {
        let (a, b) = match *self {
            Link::Unassigned | Link::Stay => (None, None),
            Link::To(target) => (Some(target), None),
            Link::When {
                primary, alternate, ..
            } => (Some(primary), Some(alternate)),
        };
        a.into_iter().chain(b)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Unassigned => f.write_str("Unassigned"),
            Link::Stay => f.write_str("Stay"),
            Link::To(target) => f.debug_tuple("To").field(target).finish(),
            Link::When {
                condition,
                primary,
                alternate,
            } => f
                .debug_struct("When")
                .field("conditional", &condition.is_some())
                .field("primary", primary)
                .field("alternate", alternate)
                .finish(),
        }
    }
}

/// Screen-specific callback.
pub type Hook = fn(&mut Effects<'_>);

/// Called on Up at the first item or Down at the last one. Returns
/// whether the screen content changed.
pub type EdgeHook = fn(&mut Effects<'_>, Direction) -> bool;

#[derive(Clone, Copy, Default)]
pub struct ScreenHooks {
    pub on_enter: Option<Hook>,
    pub on_main_loop: Option<Hook>,
    pub on_refresh: Option<Hook>,
    pub on_edge: Option<EdgeHook>,
}

/// A screen: items, one link per item, and the layout drawing them.
pub struct Group {
    name: &'static str,
    items: &'static [Item],
    links: Vec<Link, MAX_ITEMS>,
    layout: &'static Layout,
    hooks: ScreenHooks,
    idle_timeout_secs: Option<u32>,
}

impl Group {
    /// A group whose links are all [`Link::Unassigned`].
    pub fn new(
        name: &'static str,
        items: &'static [Item],
        layout: &'static Layout,
    ) -> Result<Self, Error> {
        let mut links = Vec::new();
        for _ in items {
            links.push(Link::Unassigned).map_err(|_| Error::TooManyItems)?;
        }
        Ok(Self {
            name,
            items,
            links,
            layout,
            hooks: ScreenHooks::default(),
            idle_timeout_secs: None,
        })
    }

    pub fn with_hooks(mut self, hooks: ScreenHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Return home after `secs` seconds without a button press.
    pub fn with_idle_timeout(mut self, secs: u32) -> Self {
        self.idle_timeout_secs = Some(secs);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &'static [Item] {
        self.items
    }

    pub fn item(&self, index: usize) -> Option<&'static Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    pub fn hooks(&self) -> &ScreenHooks {
        &self.hooks
    }

    pub fn idle_timeout_secs(&self) -> Option<u32> {
        self.idle_timeout_secs
    }

    pub fn link_for(&self, index: usize) -> Option<Link> {
        self.links.get(index).copied()
    }

    /// Whether any item shows live machine state.
    pub fn is_live(&self) -> bool {
        self.items.iter().any(Item::is_live)
    }
}

/// Arena of groups.
pub struct MenuGraph {
    groups: Vec<Group, MAX_GROUPS>,
}

impl MenuGraph {
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn add(&mut self, group: Group) -> Result<GroupId, Error> {
        let id = GroupId(u8::try_from(self.groups.len()).map_err(|_| Error::ArenaFull)?);
        self.groups.push(group).map_err(|_| Error::ArenaFull)?;
        Ok(id)
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, Error> {
        self.groups
            .get(usize::from(id.0))
            .ok_or(Error::UnknownGroup(id))
    }

    fn check(&self, target: Target) -> Result<(), Error> {
        let group = self.group(target.group)?;
        if target.index < group.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                group: target.group,
                index: target.index,
            })
        }
    }

    /// Unconditional link landing on `index` of `group`.
    pub fn link_to(&self, group: GroupId, index: usize) -> Result<Link, Error> {
        let target = Target::new(group, index);
        self.check(target)?;
        Ok(Link::To(target))
    }

    /// Edge currently configured for a slot.
    pub fn link_for(&self, group: GroupId, index: usize) -> Result<Link, Error> {
        self.group(group)?
            .link_for(index)
            .ok_or(Error::IndexOutOfRange { group, index })
    }

    pub fn set_link(&mut self, group: GroupId, index: usize, link: Link) -> Result<(), Error> {
        let slot = self
            .groups
            .get_mut(usize::from(group.0))
            .ok_or(Error::UnknownGroup(group))?
            .links
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { group, index })?;
        *slot = link;
        Ok(())
    }

    /// Where Ok on `from` leads, evaluating conditions now.
    pub fn resolve(&self, from: Target, registry: &dyn Registry) -> Target {
        match self.link_for(from.group, from.index) {
            Ok(link) => link.resolve(from, registry),
            Err(_) => from,
        }
    }

    /// Check every group: non-empty, items, links and layout cells of
    /// equal length, every link assigned and every target in range.
    pub fn validate(&self) -> Result<(), Error> {
        self.check_all().inspect_err(|e| error!("menu graph invalid: {}", e))
    }

    fn check_all(&self) -> Result<(), Error> {
        for (id, group) in self.iter() {
            if group.is_empty()
                || group.links.len() != group.items.len()
                || group.layout.len() != group.items.len()
            {
                return Err(Error::LengthMismatch { group: id });
            }
            for (index, link) in group.links.iter().enumerate() {
                if matches!(link, Link::Unassigned) {
                    return Err(Error::UnassignedLink { group: id, index });
                }
                for target in link.targets() {
                    self.check(target)
                        .map_err(|_| Error::DanglingTarget { group: id, index })?;
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, group)| (GroupId(i as u8), group))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for MenuGraph {
    fn default() -> Self {
        Self::new()
    }
}
