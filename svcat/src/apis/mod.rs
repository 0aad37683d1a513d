//! Typed resources of the API groups served by the service catalog

pub mod servicecatalog;
