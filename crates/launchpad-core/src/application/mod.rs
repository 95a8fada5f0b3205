/// Flight number allocation
pub mod allocator;

/// Bootstrap sync of provider data
pub mod sync_service;

/// Scheduling of caller-created launches
pub mod schedule_service;

/// Abort of existing launches
pub mod abort_service;

/// Boundary facade used by the routing layer
pub mod launch_service;
