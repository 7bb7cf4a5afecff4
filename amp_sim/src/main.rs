//! Amp Sim - Feedback Module Simulator
//!
//! Opens the amplifier module against an in-memory audio host and replays a
//! sequence of output routes, the way the host would on route changes:
//! feedback is disabled for the old device set, then enabled for the new one.

use std::path::PathBuf;

use amp_core::{
    AmpConfig, AmpDevice, AmplifierDevice, FeedbackEvent, HostContext, SndDevice, UsecaseId,
    AMPLIFIER_HARDWARE_INTERFACE, HAL_MODULE_INFO,
};
use amp_platform::sim::{HostCall, SimCapabilities, SimHost, SimPcm, SimPcmFailure};
use amp_platform::PcmDirection;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossbeam_channel::{unbounded, Receiver};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "amp_core=debug,amp_platform=debug,amp_sim=info";

#[derive(Parser)]
#[command(name = "amp_sim")]
#[command(about = "Replay speaker route changes against a simulated audio host", long_about = None)]
#[command(version)]
struct Cli {
    /// Module configuration (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output routes applied in order
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [
            SndDevice::Speaker,
            SndDevice::Speaker,
            SndDevice::WiredHeadset,
            SndDevice::Speaker,
        ]
    )]
    routes: Vec<SndDevice>,

    /// Failure injected into the simulated host or transport
    #[arg(long, value_enum, default_value_t = Failure::None)]
    fail: Failure,

    /// Sound card of the simulated host
    #[arg(long, default_value_t = 0)]
    card: u32,

    /// Print every host capability call
    #[arg(long)]
    trace_calls: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Failure {
    None,
    /// The platform has no pcm device for the feedback usecase
    PcmId,
    /// The capture stream never becomes ready
    NotReady,
    /// The capture stream refuses to start
    Start,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AmpConfig::load(path),
        None => AmpConfig::default(),
    };

    let mut host = SimHost::new(cli.card);
    let pcm = match cli.fail {
        Failure::NotReady => SimPcm::with_failure(SimPcmFailure::NotReady),
        Failure::Start => SimPcm::with_failure(SimPcmFailure::Start),
        Failure::None | Failure::PcmId => SimPcm::new(),
    };
    if cli.fail == Failure::PcmId {
        host.set_pcm_device(UsecaseId::SpeakerCalibrationTx, PcmDirection::Capture, None);
    }
    let pcm_state = pcm.state();

    let mut device: AmpDevice<SimHost, SimPcm> = HAL_MODULE_INFO
        .open(AMPLIFIER_HARDWARE_INTERFACE, &SimCapabilities::new(), pcm, &config)
        .context("opening amplifier module")?;
    let (tx, rx) = unbounded();
    device.set_event_sender(tx);

    info!(
        "Opened {} {} by {}",
        HAL_MODULE_INFO.id, HAL_MODULE_INFO.module_api_version, HAL_MODULE_INFO.author
    );

    let mut previous: Option<SndDevice> = None;
    for route in &cli.routes {
        info!("Route change: {:?} -> {}", previous.map(|d| d.name()), route);
        if let Some(old) = previous {
            device.set_feedback(&mut host, old, false)?;
        }
        device.set_feedback(&mut host, *route, true)?;
        previous = Some(*route);

        print_events(&rx)?;
        if cli.trace_calls {
            print_calls(&host);
        }
    }

    if let Some(last) = previous {
        device.set_feedback(&mut host, last, false)?;
        print_events(&rx)?;
    }
    device.close();

    let pcm_state = pcm_state.lock();
    println!(
        "usecases left: {}, pcm opens: {}, starts: {}, closes: {}, live: {}",
        host.usecases().len(),
        pcm_state.opens.len(),
        pcm_state.starts,
        pcm_state.closes,
        pcm_state.live
    );
    Ok(())
}

fn print_events(rx: &Receiver<FeedbackEvent>) -> Result<()> {
    for event in rx.try_iter() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn print_calls(host: &SimHost) {
    let calls: Vec<HostCall> = host.calls();
    for call in calls {
        println!("  host: {:?}", call);
    }
    host.clear_calls();
}
