pub mod collections;

pub use collections::{CollectionPage, CollectionService, CompanyPage};
