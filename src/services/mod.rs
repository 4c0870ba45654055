/// Frame-tick driver feeding the coordinator.
pub mod capture_loop;
/// Response classification into query statuses.
pub mod classifier;
/// Resilient query coordinator.
pub mod coordinator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Outbound call execution under a deadline.
pub mod executor;
/// Placeholder hand state extraction.
pub mod hand_state;
/// Health check service.
pub mod health_service;
