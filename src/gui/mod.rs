// GUI module organization and public exports

// Main application state and UI logic
mod app;
// Reusable UI components (stat cards, section cards, colours)
mod components;

// Export AppState for use in main.rs
pub use app::AppState;
// Export all component functions (stat_card, section_card, colours)
pub use components::*;
