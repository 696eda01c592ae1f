pub mod http;
pub mod pagespeed;
