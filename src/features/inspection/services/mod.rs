mod inspection_service;

pub use inspection_service::InspectionService;
