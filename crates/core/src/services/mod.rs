pub mod allocation_service;
pub mod analysis_service;
pub mod chart_service;
pub mod pagination_service;
pub mod record_service;
pub mod retry_policy;
pub mod sequence_service;
pub mod snapshot_service;
