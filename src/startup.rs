use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{analyze_route, default_route, health_route},
    services::OpenaiClient,
};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    openai_client: OpenaiClient,
) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);
    let openai_client = web::Data::new(openai_client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(health_route::health)
            .service(analyze_route::analyze)
            .app_data(settings.clone())
            .app_data(openai_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
