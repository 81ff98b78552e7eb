//! Access module - tiered feature and course permissions

pub mod control;
pub mod table;

pub use control::{AccessControl, AccessDecision, AccessRequest, ConfigIssue};
pub use table::{
    CourseAllowance, CourseCatalog, CourseRecord, TierPermissionTable, TierPermissions, Track,
};
