//! Static action maps for plural and singleton resources.

use super::{ActionEntry, ActionName, Segment, Verb};

const fn entry(action: ActionName, segment: Segment, verb: Verb) -> ActionEntry {
    ActionEntry { action, segment, verb }
}

/// Routes for a plural resource.
pub static NORMAL_ACTION_MAP: [ActionEntry; 8] = [
    entry(ActionName::Index, Segment::Root, Verb::Get),
    entry(ActionName::New, Segment::New, Verb::Get),
    entry(ActionName::Create, Segment::Root, Verb::Post),
    entry(ActionName::Show, Segment::Id, Verb::Get),
    entry(ActionName::Edit, Segment::IdEdit, Verb::Get),
    entry(ActionName::Update, Segment::Id, Verb::Patch),
    entry(ActionName::Update, Segment::Id, Verb::Put),
    entry(ActionName::Destroy, Segment::Id, Verb::Delete),
];

/// Routes for a singleton resource: no `index`, no `:id`.
pub static SINGLETON_ACTION_MAP: [ActionEntry; 7] = [
    entry(ActionName::New, Segment::New, Verb::Get),
    entry(ActionName::Create, Segment::Root, Verb::Post),
    entry(ActionName::Show, Segment::Root, Verb::Get),
    entry(ActionName::Edit, Segment::Edit, Verb::Get),
    entry(ActionName::Update, Segment::Root, Verb::Patch),
    entry(ActionName::Update, Segment::Root, Verb::Put),
    entry(ActionName::Destroy, Segment::Root, Verb::Delete),
];

/// Every action name, in Normal-map order, without duplicates.
pub static ALL_ACTIONS: [ActionName; 7] = [
    ActionName::Index,
    ActionName::New,
    ActionName::Create,
    ActionName::Show,
    ActionName::Edit,
    ActionName::Update,
    ActionName::Destroy,
];

/// Which action map a controller is mounted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMapFlavor {
    Normal,
    Singleton,
}

impl ActionMapFlavor {
    pub const fn from_singleton(singleton: bool) -> Self {
        if singleton {
            ActionMapFlavor::Singleton
        } else {
            ActionMapFlavor::Normal
        }
    }

    pub fn entries(self) -> &'static [ActionEntry] {
        match self {
            ActionMapFlavor::Normal => &NORMAL_ACTION_MAP,
            ActionMapFlavor::Singleton => &SINGLETON_ACTION_MAP,
        }
    }

    /// The action served by `verb` on `segment`, if any.
    pub fn resolve(self, segment: Segment, verb: Verb) -> Option<ActionName> {
        self.entries()
            .iter()
            .find(|e| e.segment == segment && e.verb == verb)
            .map(|e| e.action)
    }
}
