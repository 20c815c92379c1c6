pub mod dialog;
pub mod filter_form;
pub mod items;
pub mod previews;
pub mod textures;
