use std::sync::atomic::{AtomicBool, Ordering};

static QUIT_REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn requested() -> bool {
    QUIT_REQUESTED.load(Ordering::SeqCst)
}

pub fn request() {
    QUIT_REQUESTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
pub fn install() {
    use std::os::raw::c_int;
    const SIGINT: c_int = 2;
    const SIGTERM: c_int = 15;

    extern "C" fn handler(_sig: c_int) {
        // First request: set the flag and let the roles wind down.
        // Second request: the cooperative path is stuck, terminate now.
        if QUIT_REQUESTED.swap(true, Ordering::SeqCst) {
            std::process::exit(2);
        }
    }

    unsafe extern "C" {
        fn signal(sig: c_int, handler: extern "C" fn(c_int)) -> usize;
    }

    unsafe {
        // Best-effort; ignore returns
        let _ = signal(SIGINT, handler);
        let _ = signal(SIGTERM, handler);
    }
}

#[cfg(not(unix))]
pub fn install() {
    // No signal hook; the window close event is the shutdown path.
}
