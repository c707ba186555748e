use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // Stall tablets and dev frontends connect from arbitrary origins;
        // lock this down when the deployment gets a fixed domain.
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
