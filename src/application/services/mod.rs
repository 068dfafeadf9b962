//! Application services - Business logic orchestration

pub mod guide_service;

pub use guide_service::GuideService;
