pub mod attendance;
pub mod tenant;
