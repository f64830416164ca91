//! Main head tracking executable entry point.
//!
//! # Architecture
//!
//! Three loops run for the process lifetime, connected only through the two
//! shared single-slot stores:
//!
//!     - Transform producer (main thread): resolves the marker pose at a
//!       bounded rate and publishes accepted poses into the shared target
//!     - Joint telemetry consumer: keeps the latest measured head angles
//!       cached for the stop path
//!     - Head control loop: at a fixed rate takes any pending target,
//!       decides a step direction and queues an incremental joint command
//!
//! Shutdown is cooperative: SIGINT clears the shared run flag, every loop
//! observes it within one cycle, and the controller holds the head at its
//! last measured position on the way out. One cycle means one tick for the
//! controller and telemetry loops, but for the transform producer it is one
//! lookup, so producer exit is bounded by the lookup timeout rather than
//! the tick period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use head_lib::{
    head_client::HeadClient,
    head_ctrl::{self, HeadCtrl},
    joints_client,
    params::HeadExecParams,
    shared::{JointStateCache, SharedTarget},
    tf_client,
};
#[cfg(feature = "sim")]
use head_lib::sim_client::{SimEquipment, SimJointsClient};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
#[cfg(feature = "sim")]
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("head_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Marker Focus Head Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: HeadExecParams = util::params::load(
        "head_exec.toml"
    ).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut head_ctrl = HeadCtrl::default();
    head_ctrl
        .init("head_ctrl.toml", &session)
        .wrap_err("Failed to initialise HeadCtrl")?;

    info!("HeadCtrl initialised");

    // ---- SHARED STATE ----

    let run = Arc::new(AtomicBool::new(true));

    {
        let run = run.clone();
        ctrlc::set_handler(move || run.store(false, Ordering::Relaxed))
            .wrap_err("Failed to set the shutdown handler")?;
    }

    let shared_target = SharedTarget::new(exec_params.pose_change_threshold_m);
    let joint_cache = JointStateCache::new();

    let (head_client, cmd_receiver) = HeadClient::new();
    let (joints_sender, joints_receiver) = mpsc::channel();

    // ---- EQUIPMENT ----

    let (sim_eqpt, tf_source) =
        SimEquipment::start(cmd_receiver, joints_sender, run.clone());
    let joints_source = SimJointsClient::new(joints_receiver);

    info!("Simulated equipment started");

    // ---- SPAWN LOOPS ----

    let joints_jh = {
        let cache = joint_cache.clone();
        let run = run.clone();
        thread::spawn(move || {
            joints_client::joint_state_consumer(joints_source, cache, run)
        })
    };

    let ctrl_jh = {
        let target = shared_target.clone();
        let cache = joint_cache.clone();
        let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
        let run = run.clone();
        thread::spawn(move || {
            controller_loop(head_ctrl, target, cache, head_client, cycle_period, run)
        })
    };

    // ---- TRANSFORM PRODUCER ----

    info!("Startup complete, tracking marker {:?}", exec_params.marker_frame);

    // Blocks the main thread until shutdown
    tf_client::transform_producer(
        tf_source,
        shared_target,
        &exec_params.camera_frame,
        &exec_params.marker_frame,
        Duration::from_secs_f64(exec_params.lookup_timeout_s),
        run,
    );

    // ---- SHUTDOWN ----

    info!("Shutdown requested");

    if ctrl_jh.join().is_err() {
        error!("Controller thread panicked");
    }
    if joints_jh.join().is_err() {
        error!("Joint telemetry thread panicked");
    }
    sim_eqpt.join();

    info!("End of execution");

    Ok(())
}

/// Without an equipment stack there is nothing to run against.
#[cfg(not(feature = "sim"))]
fn main() -> Result<(), Report> {
    Err(color_eyre::eyre::eyre!(
        "No equipment stack enabled, rebuild with the `sim` feature or integrate \
         real transform/telemetry/command transports"
    ))
}

/// Fixed-rate head control loop.
///
/// Runs until `run` is cleared, then sends the graceful-stop command holding the head at its
/// current measured position.
#[cfg(feature = "sim")]
fn controller_loop(
    mut head_ctrl: HeadCtrl,
    target: SharedTarget,
    joint_cache: JointStateCache,
    head_client: HeadClient,
    cycle_period: Duration,
    run: Arc<AtomicBool>,
) {
    let mut num_cycle_overruns: u64 = 0;

    while run.load(Ordering::Relaxed) {
        let cycle_start_instant = Instant::now();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let input = head_ctrl::InputData {
            target: target.take_if_dirty(),
        };

        match head_ctrl.proc(&input) {
            Ok((Some(cmd), report)) => {
                debug!("HeadCtrl report: {:?}", report);

                if let Err(e) = head_client.send_demands(&cmd) {
                    error!("Could not send demands to the head server: {}", e);
                    break;
                }
            }
            Ok((None, report)) => {
                if report.degenerate_depth {
                    warn!("Target discarded, depth too small to define a direction");
                }
            }
            Err(e) => warn!("Error during HeadCtrl processing: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    (cycle_dur - cycle_period).as_secs_f64()
                );
                num_cycle_overruns += 1;
            }
        }
    }

    if num_cycle_overruns > 0 {
        info!("Controller saw {} cycle overruns", num_cycle_overruns);
    }

    // ---- GRACEFUL STOP ----

    match head_ctrl.stop_command(joint_cache.read()) {
        Some(cmd) => match head_client.send_demands(&cmd) {
            Ok(_) => info!("Stop command sent, head held at its current position"),
            Err(e) => warn!("Could not send the stop command: {}", e),
        },
        None => warn!("No joint telemetry received, cannot hold the head position"),
    }
}
