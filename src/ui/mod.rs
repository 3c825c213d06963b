pub mod context_menu;
pub mod modal;
