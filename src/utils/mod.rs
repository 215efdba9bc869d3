pub mod askama_filter_util;
pub mod humanize;
pub mod jwt;
