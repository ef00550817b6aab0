pub mod icons;
pub mod menu;

pub use icons::Icon;
pub use menu::{MenuEntry, MenuTree, ModuleId};
