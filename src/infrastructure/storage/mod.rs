mod cloudinary_store;
mod local_store;
mod memory_store;
mod store_factory;

pub use cloudinary_store::{CloudinaryCredentials, CloudinaryMediaStore, sign_params};
pub use local_store::LocalMediaStore;
pub use memory_store::InMemoryMediaStore;
pub use store_factory::MediaStoreFactory;
