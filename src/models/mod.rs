pub mod bookmarkmodel;
pub mod chatmodels;
pub mod propertymodel;
pub mod usermodel;
