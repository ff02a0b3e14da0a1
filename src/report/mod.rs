pub mod html;
pub mod navbar;
pub mod overview;
pub mod zip;
