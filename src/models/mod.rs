pub mod collection;
pub mod company;
pub mod move_request;

// Re-export core models for easy access
pub use collection::{CollectionId, CompanyCollection};
pub use company::{Company, CompanyId, CompanySummary, CompanyView};
pub use move_request::{
    BulkMoveAccepted, MoveAllRequest, MoveCompanyRequest, MoveCompanyResponse, MoveMultipleRequest,
    MoveStatus,
};
