// Application layer - Use cases over the domain
pub mod dashboard_api;
pub mod dashboard_controller;
pub mod simulation_service;
