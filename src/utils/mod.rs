pub mod data_url;
