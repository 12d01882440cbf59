//! Recorder error types
//!
//! The kernel hooks never fail; these errors only surface from the control
//! surface and from direct registry use.

use core::fmt;

/// Recorder error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderError {
    /// Every registry slot holds a live thread
    RegistryFull,
    /// The handle was never registered or has already exited
    NotRegistered,
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderError::RegistryFull => write!(f, "thread registry is full"),
            RecorderError::NotRegistered => write!(f, "thread is not registered"),
        }
    }
}
