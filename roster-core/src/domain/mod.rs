//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

pub mod result;
pub mod student;

pub use student::{NewStudent, Student, StudentPatch, StudentStatus, MAJORS};
