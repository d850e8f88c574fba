//! Tenant shell state: settings, the versioned descriptor and events.

pub mod descriptor;
pub mod events;
pub mod settings;

pub use descriptor::{ShellDescriptor, ShellDescriptorManager, ShellFeature, ShellParameter};
pub use events::{EventBus, RecipeEventHandler, ShellEventHandler};
pub use settings::{SharedShellSettings, ShellSettings, ShellSettingsStore, TenantState};
