pub mod deal_table;
pub mod kpi_card;
pub mod progress_bar;
pub mod toast;
