/// Provider API key entity module
pub mod credential;
/// Provider entity module
pub mod provider;
/// Provider model entity module
pub mod provider_model;
/// Rotation settings entity module
pub mod rotation_settings;
/// Usage log entity module
pub mod usage_log;

pub use credential::Entity as Credential;
pub use provider::Entity as Provider;
pub use provider_model::Entity as ProviderModel;
pub use rotation_settings::Entity as RotationSettings;
pub use usage_log::Entity as UsageLog;
