pub mod catalog;
pub mod providers;
pub mod recommendations;
pub mod view;
