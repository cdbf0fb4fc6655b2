mod catalog;
mod character_detail;
mod location_residents;
mod login;

pub use catalog::CatalogView;
pub use character_detail::CharacterDetailView;
pub use location_residents::LocationResidentsView;
pub use login::LoginView;
