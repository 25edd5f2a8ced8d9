use color_eyre::eyre::{Result, WrapErr};
use lex_simulacra::{CaseFile, OpenAiTransport, app::App, logging, settings::Settings};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let settings = Settings::load().wrap_err("Failed to load settings")?;
    let data_dir = Settings::data_dir()?;
    logging::init(&data_dir, settings.debug_mode).wrap_err("Failed to start the logger")?;
    log::info!("Lex Simulacra start: {}", chrono::Local::now());

    let case = match &settings.case_file {
        Some(path) => CaseFile::load(path)
            .wrap_err_with(|| format!("Failed to load case file {}", path.display()))?,
        None => CaseFile::builtin().wrap_err("The bundled case file is invalid")?,
    };
    log::info!(
        "Case '{}' loaded with {} witnesses",
        case.details.title,
        case.witnesses().len()
    );

    let transport = OpenAiTransport::new(settings.api_key(), &settings.model, settings.temperature);
    if transport.is_online() {
        if let Err(err) = transport.verify_credential().await {
            log::warn!("OpenAI credential check failed: {err}");
        }
    }

    let mut app = App::new(settings, Arc::new(case), transport);
    app.run().await?;

    Ok(())
}
