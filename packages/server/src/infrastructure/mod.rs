//! Infrastructure layer: implementations of the domain interfaces and the
//! wire-format DTOs.

pub mod auth;
pub mod dto;
pub mod group_registry;
pub mod repository;
