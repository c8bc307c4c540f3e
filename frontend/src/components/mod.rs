pub mod user_table;
