pub mod access;
pub mod role_gate;
