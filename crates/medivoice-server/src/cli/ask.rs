use crate::app::Services;
use crate::cli::AskArgs;
use crate::config::MediVoiceConfig;
use crate::http::JsonResponse;
use anyhow::Result;
use medivoice_core::InteractionInput;

pub async fn run(args: AskArgs, config: &MediVoiceConfig) -> Result<()> {
    let services = Services::build(config, false)?;
    services.load_seed(config)?;

    let response = services
        .pipeline
        .run(InteractionInput::text(args.text), false)
        .await?;

    eprintln!(
        "answered by {} in {} ms",
        response.provider_used, response.response_time_ms
    );
    println!("{}", serde_json::to_string_pretty(&JsonResponse::ok(response))?);
    Ok(())
}
