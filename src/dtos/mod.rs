pub mod bookmarkdtos;
pub mod chatdtos;
pub mod propertydtos;
pub mod userdtos;
