// Domain layer - Plant model, payloads and dashboard view models
pub mod chart;
pub mod dashboard;
pub mod measurement;
pub mod plant;
pub mod schematic;
pub mod settings;
pub mod settings_form;
pub mod telemetry;
