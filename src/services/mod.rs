/// CSV and JSON exports and the backup importer.
pub mod backup_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player roster management.
pub mod roster_service;
/// Working round lifecycle: start, edit, scoring, navigation, finalize.
pub mod round_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// History, analytics, leaderboards and course difficulty.
pub mod stats_service;
/// Remote store connection supervisor and degraded-mode tracking.
pub mod storage_supervisor;
/// Local-then-remote commit path and remote document loading.
pub mod sync_service;
