mod classify;
mod config;
mod error;
mod provision;
mod routes;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::{error, info};
use shared::ModelFamily;

use classify::model::{Classifier, Engines};
use config::AppConfig;
use routes::configure_routes;

fn fatal(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();

    for artifact in [&config.mobilenet, &config.efficientnet] {
        if let Err(e) = provision::ensure_artifact(artifact).await {
            return Err(fatal(format!(
                "Provisioning {} artifact failed: {}",
                artifact.family, e
            )));
        }
    }

    // Both classifiers load once here and stay resident; a load failure
    // kills the process rather than serving degraded.
    let mobilenet = Classifier::load(ModelFamily::Mobilenet, &config.mobilenet.path)
        .map_err(|e| fatal(format!("Loading mobilenet artifact failed: {:?}", e)))?;
    let efficientnet = Classifier::load(ModelFamily::Efficientnet, &config.efficientnet.path)
        .map_err(|e| fatal(format!("Loading efficientnet artifact failed: {:?}", e)))?;
    let engines = Engines {
        mobilenet,
        efficientnet,
    };

    info!("Models loaded, starting server on {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(engines.clone()))
            .configure(configure_routes)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
