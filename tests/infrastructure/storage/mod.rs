mod cloudinary_store_test;
mod local_store_test;
