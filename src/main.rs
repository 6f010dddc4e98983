use auto_clicker::args::{Args, Source};
use auto_clicker::detection::{
    DetectionConfig, DetectionEngine, EngineStatus, create_status_channel, load_template_dir,
    spawn_status_drain,
};
use auto_clicker::screen::{ClickDispatcher, LoggingClicker, ReplaySource, ScreenSource};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

type Backends = (Arc<dyn ScreenSource>, Arc<dyn ClickDispatcher>);

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config_file {
        Some(path) => {
            log::info!("⚙️ Loading config from {}", path.display());
            DetectionConfig::load_toml(path)?
        }
        None => DetectionConfig::from_preset(&args.preset)
            .ok_or_else(|| format!("unknown preset '{}'", args.preset))?,
    };
    log::debug!("⚙️ {}", config.summary());

    let templates = load_template_dir(&args.templates_dir)?;
    log::info!(
        "🖼️ {} template images in {}",
        templates.len(),
        args.templates_dir.display()
    );

    let (source, clicker) = backends(&args.source)?;

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let (status_tx, status_rx) = create_status_channel();
    let drain = spawn_status_drain(status_rx, |status| match status {
        s if s.is_error() => log::error!("❌ {}", s),
        s if s.is_warning() => log::warn!("⚠️ {}", s),
        s @ EngineStatus::Clicked { .. } => log::info!("🖱️ {}", s),
        s => log::info!("🤖 {}", s),
    });

    let mut engine = DetectionEngine::new(source, clicker, status_tx, config);
    engine.start(templates)?;

    rt.block_on(wait_for_shutdown(args.timeout_secs));

    engine.stop();
    drop(engine);
    let handled = rt.block_on(drain)?;
    log::debug!("📣 {} status messages handled", handled);
    Ok(())
}

fn backends(source: &Source) -> Result<Backends, Box<dyn Error>> {
    match source {
        Source::Replay(dir) => {
            log::info!("🎞️ Dry run: clicks are only logged");
            let replay = ReplaySource::from_dir(dir)?;
            Ok((Arc::new(replay), Arc::new(LoggingClicker::new())))
        }
        Source::Desktop => desktop_backends(),
    }
}

#[cfg(feature = "desktop")]
fn desktop_backends() -> Result<Backends, Box<dyn Error>> {
    use auto_clicker::screen::{DesktopClicker, DesktopScreen};
    Ok((Arc::new(DesktopScreen::new()), Arc::new(DesktopClicker::new())))
}

#[cfg(not(feature = "desktop"))]
fn desktop_backends() -> Result<Backends, Box<dyn Error>> {
    Err("built without the 'desktop' feature, pass --replay=DIR".into())
}

async fn wait_for_shutdown(timeout_secs: Option<u64>) {
    let timeout = async {
        match timeout_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::pin!(timeout);

    let interrupted = tokio::select! {
        result = tokio::signal::ctrl_c() => Some(result),
        _ = &mut timeout => None,
    };

    match interrupted {
        Some(Ok(())) => log::info!("🛑 Ctrl-C received, stopping"),
        Some(Err(e)) => {
            log::warn!("⚠️ Cannot listen for Ctrl-C: {}", e);
            timeout.await;
            log::info!("⏱️ Timeout reached, stopping");
        }
        None => log::info!("⏱️ Timeout reached, stopping"),
    }
}
