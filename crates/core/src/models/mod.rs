pub mod allocation;
pub mod chart;
pub mod identity;
pub mod notification;
pub mod record;
pub mod settings;
