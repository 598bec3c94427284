mod driver;
mod input;
mod shutdown;
mod video;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use cathode_core::core::bus::drive_loop;
use cathode_core::core::clock::SyncMode;
use cathode_machines::rom_loader::{BASIC_ROM, CHAR_ROM, KERNAL_ROM, RomImage};
use cathode_machines::vic20::Vic20;
use clap::Parser;
use sdl2::event::Event;

use crate::driver::DemoDriver;
use crate::video::Video;

/// Threaded 8-bit bus backend with VIA 6522 peripherals.
#[derive(Parser)]
#[command(name = "cathode")]
struct Args {
    /// KERNAL ROM image (8 KiB, loaded at 0xE000)
    #[arg(long)]
    kernal: Option<PathBuf>,

    /// BASIC ROM image (8 KiB, loaded at 0xC000)
    #[arg(long)]
    basic: Option<PathBuf>,

    /// Character generator ROM image (4 KiB, loaded at 0x8000)
    #[arg(long)]
    charrom: Option<PathBuf>,

    /// Window scale factor
    #[arg(long, default_value_t = 3)]
    scale: u32,

    /// Stop after this many bus cycles (0 = run until quit)
    #[arg(long, default_value_t = 0)]
    cycles: u64,

    /// Let the IO dispatcher lag behind the bus clock instead of
    /// lock-stepping every tick
    #[arg(long)]
    relaxed_io: bool,

    /// Accept ROM images whose checksum matches no known revision
    #[arg(long)]
    skip_checksum: bool,
}

/// Load one optional ROM image; any load error is a setup failure.
fn load_rom(image: &RomImage, path: &Option<PathBuf>, skip_checksum: bool) -> Option<Vec<u8>> {
    let path = path.as_ref()?;
    match image.load(path, skip_checksum) {
        Ok(data) => Some(data),
        Err(e) => {
            log::error!("failed to load {}: {e}", image.name);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    shutdown::install();
    let args = Args::parse();

    let mode = if args.relaxed_io {
        SyncMode::Relaxed
    } else {
        SyncMode::LockStep
    };
    let vic = Vic20::new(mode);

    if let Some(data) = load_rom(&KERNAL_ROM, &args.kernal, args.skip_checksum) {
        vic.load_kernal(&data);
    } else {
        // No KERNAL: give the scripted driver's reset fetch something
        // sane to read.
        vic.install_reset_vector(0x1000);
        vic.install_irq_vector(0x2000);
    }
    if let Some(data) = load_rom(&BASIC_ROM, &args.basic, args.skip_checksum) {
        vic.load_basic(&data);
    }
    match load_rom(&CHAR_ROM, &args.charrom, args.skip_checksum) {
        Some(data) => vic.load_char_rom(&data),
        None => log::warn!("no character ROM loaded; the screen will render blank glyphs"),
    }

    let clock = vic.clock();

    // Startup barrier, in dependency order: the IO dispatcher must be
    // ready before the bus clock can move, the bus thread before the
    // presentation loop starts sampling.
    let io_ready = Arc::new(AtomicBool::new(false));
    let dispatcher = vic.dispatcher();
    let io_thread = {
        let ready = Arc::clone(&io_ready);
        let spawned = thread::Builder::new().name("io-dispatch".into()).spawn(move || {
            ready.store(true, Ordering::Release);
            dispatcher.run();
        });
        match spawned {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("failed to spawn io thread: {e}");
                process::exit(1);
            }
        }
    };
    while !io_ready.load(Ordering::Acquire) {
        std::hint::spin_loop();
    }
    log::info!("io thread running");

    let bus_ready = Arc::new(AtomicBool::new(false));
    let mut bus = vic.bus();
    let cycle_limit = (args.cycles > 0).then_some(args.cycles);
    let bus_thread = {
        let ready = Arc::clone(&bus_ready);
        let spawned = thread::Builder::new().name("bus-driver".into()).spawn(move || {
            let mut driver = DemoDriver::new();
            ready.store(true, Ordering::Release);
            drive_loop(&mut driver, &mut bus, cycle_limit);
        });
        match spawned {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("failed to spawn bus thread: {e}");
                clock.request_stop();
                process::exit(1);
            }
        }
    };
    while !bus_ready.load(Ordering::Acquire) {
        std::hint::spin_loop();
    }
    log::info!("bus thread running");

    // Presentation role, on the main thread (SDL requires it): poll the
    // memory image at frame rate, forward key events to the matrix,
    // never block the other roles.
    let sdl_context = sdl2::init().unwrap_or_else(|e| {
        log::error!("failed to initialize SDL2: {e}");
        clock.request_stop();
        process::exit(1);
    });
    let sdl_video = sdl_context.video().unwrap_or_else(|e| {
        log::error!("failed to init SDL video: {e}");
        clock.request_stop();
        process::exit(1);
    });
    let mut video = Video::new(&sdl_video, "cathode", args.scale);
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    let keyboard = vic.keyboard();
    let mem = vic.mem();

    'main: while clock.is_running() && !shutdown::requested() {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => {
                    shutdown::request();
                    break 'main;
                }

                Event::KeyDown {
                    keycode: Some(kc),
                    repeat: false,
                    ..
                } => {
                    if let Some(code) = input::matrix_code(kc) {
                        keyboard.press(code);
                    }
                }

                Event::KeyUp {
                    keycode: Some(kc), ..
                } => {
                    if let Some(code) = input::matrix_code(kc) {
                        keyboard.release(code);
                    }
                }

                _ => {}
            }
        }

        video.render(&mem);
        thread::sleep(Duration::from_millis(16));
    }

    // Shutdown: clear the run flag, unstick any role parked on a tick
    // wait, then join everything before the process exits.
    log::info!("shutting down");
    clock.request_stop();
    clock.unstick();
    if bus_thread.join().is_err() {
        log::error!("bus thread panicked");
    }
    if io_thread.join().is_err() {
        log::error!("io thread panicked");
    }
    log::info!("all roles joined");
}
