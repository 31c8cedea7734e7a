pub mod heatmap;
pub mod page;
pub mod panels;
pub mod plot;
pub mod table;
