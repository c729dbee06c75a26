pub mod click;
pub mod mapping;
pub mod offer;
pub mod supplier;

pub use click::Entity as ClickEntity;
pub use mapping::Entity as MappingEntity;
pub use offer::Entity as OfferEntity;
pub use supplier::Entity as SupplierEntity;
