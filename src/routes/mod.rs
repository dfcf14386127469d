/// Router Module Index
///
/// Organizes the gateway's pages by access policy. The guard layers are attached per
/// module in `create_router`, so a page's policy follows from the module it lives in.

/// Pages and session flows reachable without a credential.
pub mod public;

/// Pages restricted to the `teacher` role.
pub mod teacher;

/// Pages restricted to the `student` role, further split by topic existence.
pub mod student;
