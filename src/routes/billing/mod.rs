pub mod billing_routes;
