use crate::app::Services;
use crate::cli::LoadArgs;
use crate::config::MediVoiceConfig;
use anyhow::Result;
use medivoice_core::load_knowledge;

pub fn run(args: LoadArgs, config: &MediVoiceConfig) -> Result<()> {
    let path = match args.file.or_else(|| config.knowledge.seed_file.clone()) {
        Some(path) => path,
        None => anyhow::bail!("No seed file: pass --file or set [knowledge].seed_file"),
    };

    let services = Services::build(config, false)?;
    let loaded = load_knowledge(&path, &services.knowledge)?;

    if loaded > 0 {
        println!("Loaded {} passages from {}", loaded, path.display());
    } else {
        println!(
            "Nothing loaded from {} ({} passages already indexed)",
            path.display(),
            services.knowledge.count()
        );
    }
    Ok(())
}
